//! EntityStatus (0x1A): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityStatus {
    /// Plain int here, unlike most entity packets.
    pub entity_id: i32,
    pub status: i8,
}

impl ProtoEncode for EntityStatus {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.entity_id);
        buf.put_i8(self.status);
    }
}

impl ProtoDecode for EntityStatus {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 5)?;
        Ok(Self {
            entity_id: buf.get_i32(),
            status: buf.get_i8(),
        })
    }
}
