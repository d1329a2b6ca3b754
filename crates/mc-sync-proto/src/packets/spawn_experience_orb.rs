//! SpawnExperienceOrb (0x11): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnExperienceOrb {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub count: i16,
}

impl ProtoEncode for SpawnExperienceOrb {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
        buf.put_i16(self.count);
    }
}

impl ProtoDecode for SpawnExperienceOrb {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 14)?;
        Ok(Self {
            entity_id,
            x: buf.get_i32(),
            y: buf.get_i32(),
            z: buf.get_i32(),
            count: buf.get_i16(),
        })
    }
}
