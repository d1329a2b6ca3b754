//! WindowProperty (0x31): server to client.
//!
//! Furnace progress, enchantment seeds and similar per-window counters.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProperty {
    pub window_id: u8,
    pub property: i16,
    pub value: i16,
}

impl ProtoEncode for WindowProperty {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.window_id);
        buf.put_i16(self.property);
        buf.put_i16(self.value);
    }
}

impl ProtoDecode for WindowProperty {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 5)?;
        Ok(Self {
            window_id: buf.get_u8(),
            property: buf.get_i16(),
            value: buf.get_i16(),
        })
    }
}
