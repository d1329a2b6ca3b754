//! EntityHeadLook (0x19): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityHeadLook {
    pub entity_id: i32,
    pub head_yaw: i8,
}

impl ProtoEncode for EntityHeadLook {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.head_yaw);
    }
}

impl ProtoDecode for EntityHeadLook {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            entity_id,
            head_yaw: buf.get_i8(),
        })
    }
}
