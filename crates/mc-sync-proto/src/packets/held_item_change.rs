//! HeldItemChange (0x09): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldItemChange {
    /// Hotbar index, 0..=8.
    pub slot: i8,
}

impl ProtoEncode for HeldItemChange {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i8(self.slot);
    }
}

impl ProtoDecode for HeldItemChange {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        Ok(Self { slot: buf.get_i8() })
    }
}
