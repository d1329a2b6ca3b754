//! SpawnObject (0x0E): server to client.
//!
//! Vehicles, projectiles, items, falling blocks and other non-living objects.
//! The velocity triple is present on the wire only when `data > 0`.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnObject {
    pub entity_id: i32,
    /// Object type code.
    pub kind: i8,
    /// Fixed-point position (1/32).
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Angle bytes (1/256 turn).
    pub pitch: i8,
    pub yaw: i8,
    /// Type-specific: owner id for projectiles, block state for falling blocks, etc.
    pub data: i32,
    /// Velocity (1/8000), meaningful only when `data > 0`.
    pub velocity: [i16; 3],
}

impl SpawnObject {
    pub fn has_velocity(&self) -> bool {
        self.data > 0
    }
}

impl ProtoEncode for SpawnObject {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.kind);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
        buf.put_i8(self.pitch);
        buf.put_i8(self.yaw);
        buf.put_i32(self.data);
        if self.has_velocity() {
            for v in self.velocity {
                buf.put_i16(v);
            }
        }
    }
}

impl ProtoDecode for SpawnObject {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 19)?;
        let kind = buf.get_i8();
        let x = buf.get_i32();
        let y = buf.get_i32();
        let z = buf.get_i32();
        let pitch = buf.get_i8();
        let yaw = buf.get_i8();
        let data = buf.get_i32();
        let mut velocity = [0i16; 3];
        if data > 0 {
            ensure_remaining(buf, 6)?;
            for v in &mut velocity {
                *v = buf.get_i16();
            }
        }
        Ok(Self {
            entity_id,
            kind,
            x,
            y,
            z,
            pitch,
            yaw,
            data,
            velocity,
        })
    }
}
