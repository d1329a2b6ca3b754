//! SpawnPainting (0x10): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{BlockPos, VarInt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPainting {
    pub entity_id: i32,
    /// Motive name, e.g. `Kebab`.
    pub title: String,
    /// Block the painting hangs on.
    pub location: BlockPos,
    /// 0 south, 1 west, 2 north, 3 east.
    pub direction: u8,
}

impl ProtoEncode for SpawnPainting {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        write_string(buf, &self.title);
        self.location.proto_encode(buf);
        buf.put_u8(self.direction);
    }
}

impl ProtoDecode for SpawnPainting {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let title = read_string(buf)?;
        let location = BlockPos::proto_decode(buf)?;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            entity_id,
            title,
            location,
            direction: buf.get_u8(),
        })
    }
}
