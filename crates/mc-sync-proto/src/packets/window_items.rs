//! WindowItems (0x30): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::Slot;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowItems {
    pub window_id: u8,
    pub items: Vec<Slot>,
}

impl ProtoEncode for WindowItems {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.window_id);
        buf.put_i16(self.items.len() as i16);
        for item in &self.items {
            item.proto_encode(buf);
        }
    }
}

impl ProtoDecode for WindowItems {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 3)?;
        let window_id = buf.get_u8();
        let count = buf.get_i16();
        if count < 0 {
            return Err(ProtoError::InvalidData(format!("negative slot count {count}")));
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(Slot::proto_decode(buf)?);
        }
        Ok(Self { window_id, items })
    }
}
