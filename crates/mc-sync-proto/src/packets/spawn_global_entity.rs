//! SpawnGlobalEntity (0x2C): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

/// The only global entity type in this protocol.
pub const LIGHTNING: i8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnGlobalEntity {
    pub entity_id: i32,
    pub kind: i8,
    /// Fixed-point (1/32 block) position.
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ProtoEncode for SpawnGlobalEntity {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.kind);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
    }
}

impl ProtoDecode for SpawnGlobalEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 13)?;
        Ok(Self {
            entity_id,
            kind: buf.get_i8(),
            x: buf.get_i32(),
            y: buf.get_i32(),
            z: buf.get_i32(),
        })
    }
}
