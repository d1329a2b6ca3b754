//! SpawnPlayer (0x0C): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::metadata::EntityMetadata;
use crate::types::{Uuid, VarInt};

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPlayer {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    /// Item id in hand, 0 for none.
    pub current_item: i16,
    pub metadata: EntityMetadata,
}

impl ProtoEncode for SpawnPlayer {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        self.uuid.proto_encode(buf);
        buf.put_i32(self.x);
        buf.put_i32(self.y);
        buf.put_i32(self.z);
        buf.put_i8(self.yaw);
        buf.put_i8(self.pitch);
        buf.put_i16(self.current_item);
        self.metadata.proto_encode(buf);
    }
}

impl ProtoDecode for SpawnPlayer {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let uuid = Uuid::proto_decode(buf)?;
        ensure_remaining(buf, 16)?;
        Ok(Self {
            entity_id,
            uuid,
            x: buf.get_i32(),
            y: buf.get_i32(),
            z: buf.get_i32(),
            yaw: buf.get_i8(),
            pitch: buf.get_i8(),
            current_item: buf.get_i16(),
            metadata: EntityMetadata::proto_decode(buf)?,
        })
    }
}
