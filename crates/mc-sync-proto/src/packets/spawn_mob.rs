//! SpawnMob (0x0F): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::metadata::EntityMetadata;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnMob {
    pub entity_id: i32,
    pub kind: u8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub head_pitch: i8,
    pub velocity: [i16; 3],
    pub metadata: EntityMetadata,
}

impl ProtoEncode for SpawnMob {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_u8(self.kind);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
        buf.put_i8(self.yaw);
        buf.put_i8(self.pitch);
        buf.put_i8(self.head_pitch);
        for v in self.velocity {
            buf.put_i16(v);
        }
        self.metadata.proto_encode(buf);
    }
}

impl ProtoDecode for SpawnMob {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 22)?;
        let kind = buf.get_u8();
        let x = buf.get_i32();
        let y = buf.get_i32();
        let z = buf.get_i32();
        let yaw = buf.get_i8();
        let pitch = buf.get_i8();
        let head_pitch = buf.get_i8();
        let velocity = [buf.get_i16(), buf.get_i16(), buf.get_i16()];
        Ok(Self {
            entity_id,
            kind,
            x,
            y,
            z,
            yaw,
            pitch,
            head_pitch,
            velocity,
            metadata: EntityMetadata::proto_decode(buf)?,
        })
    }
}
