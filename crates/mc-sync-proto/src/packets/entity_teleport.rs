//! EntityTeleport (0x18): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTeleport {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub on_ground: bool,
}

impl ProtoEncode for EntityTeleport {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
        buf.put_i8(self.yaw);
        buf.put_i8(self.pitch);
        buf.put_u8(self.on_ground as u8);
    }
}

impl ProtoDecode for EntityTeleport {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 15)?;
        Ok(Self {
            entity_id,
            x: buf.get_i32(),
            y: buf.get_i32(),
            z: buf.get_i32(),
            yaw: buf.get_i8(),
            pitch: buf.get_i8(),
            on_ground: buf.get_u8() != 0,
        })
    }
}
