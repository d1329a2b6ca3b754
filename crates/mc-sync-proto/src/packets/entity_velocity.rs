//! EntityVelocity (0x12): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityVelocity {
    pub entity_id: i32,
    /// 1/8000 of a block per tick.
    pub velocity: [i16; 3],
}

impl ProtoEncode for EntityVelocity {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        for v in self.velocity {
            buf.put_i16(v);
        }
    }
}

impl ProtoDecode for EntityVelocity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 6)?;
        Ok(Self {
            entity_id,
            velocity: [buf.get_i16(), buf.get_i16(), buf.get_i16()],
        })
    }
}
