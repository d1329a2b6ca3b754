//! SetSlot (0x2F): server to client.
//!
//! Window -1 with slot -1 addresses the stack held on the cursor.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::Slot;

#[derive(Debug, Clone, PartialEq)]
pub struct SetSlot {
    pub window_id: i8,
    pub slot: i16,
    pub item: Slot,
}

impl ProtoEncode for SetSlot {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i8(self.window_id);
        buf.put_i16(self.slot);
        self.item.proto_encode(buf);
    }
}

impl ProtoDecode for SetSlot {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 3)?;
        Ok(Self {
            window_id: buf.get_i8(),
            slot: buf.get_i16(),
            item: Slot::proto_decode(buf)?,
        })
    }
}
