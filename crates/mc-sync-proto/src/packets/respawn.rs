//! Respawn (0x07): server to client.
//!
//! Sent on death and on dimension change; the client discards its world replica.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Respawn {
    pub dimension: i32,
    pub difficulty: u8,
    pub game_mode: u8,
    pub level_type: String,
}

impl ProtoEncode for Respawn {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.dimension);
        buf.put_u8(self.difficulty);
        buf.put_u8(self.game_mode);
        write_string(buf, &self.level_type);
    }
}

impl ProtoDecode for Respawn {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 6)?;
        let dimension = buf.get_i32();
        let difficulty = buf.get_u8();
        let game_mode = buf.get_u8();
        Ok(Self {
            dimension,
            difficulty,
            game_mode,
            level_type: read_string(buf)?,
        })
    }
}
