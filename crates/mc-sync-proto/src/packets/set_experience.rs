//! SetExperience (0x1F): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetExperience {
    /// Progress through the current level, 0.0 to 1.0.
    pub bar: f32,
    pub level: i32,
    pub total: i32,
}

impl ProtoEncode for SetExperience {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f32(self.bar);
        VarInt(self.level).proto_encode(buf);
        VarInt(self.total).proto_encode(buf);
    }
}

impl ProtoDecode for SetExperience {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 4)?;
        Ok(Self {
            bar: buf.get_f32(),
            level: VarInt::proto_decode(buf)?.0,
            total: VarInt::proto_decode(buf)?.0,
        })
    }
}
