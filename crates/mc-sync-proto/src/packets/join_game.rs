//! JoinGame (0x01): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_bool, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGame {
    pub entity_id: i32,
    /// Bit 3 set means hardcore.
    pub game_mode: u8,
    /// -1 nether, 0 overworld, 1 end.
    pub dimension: i8,
    pub difficulty: u8,
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl ProtoEncode for JoinGame {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.entity_id);
        buf.put_u8(self.game_mode);
        buf.put_i8(self.dimension);
        buf.put_u8(self.difficulty);
        buf.put_u8(self.max_players);
        write_string(buf, &self.level_type);
        buf.put_u8(self.reduced_debug_info as u8);
    }
}

impl ProtoDecode for JoinGame {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        let entity_id = buf.get_i32();
        let game_mode = buf.get_u8();
        let dimension = buf.get_i8();
        let difficulty = buf.get_u8();
        let max_players = buf.get_u8();
        let level_type = read_string(buf)?;
        let reduced_debug_info = read_bool(buf)?;
        Ok(Self {
            entity_id,
            game_mode,
            dimension,
            difficulty,
            max_players,
            level_type,
            reduced_debug_info,
        })
    }
}
