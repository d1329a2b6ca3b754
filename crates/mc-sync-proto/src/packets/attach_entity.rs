//! AttachEntity (0x1B): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_bool, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachEntity {
    pub entity_id: i32,
    /// -1 detaches.
    pub vehicle_id: i32,
    /// Leash rather than riding.
    pub leash: bool,
}

impl ProtoEncode for AttachEntity {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.entity_id);
        buf.put_i32(self.vehicle_id);
        buf.put_u8(self.leash as u8);
    }
}

impl ProtoDecode for AttachEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        Ok(Self {
            entity_id: buf.get_i32(),
            vehicle_id: buf.get_i32(),
            leash: read_bool(buf)?,
        })
    }
}
