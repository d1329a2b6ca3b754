//! ConfirmTransaction: server to client (0x32) and client to server (0x0F).
//!
//! Same layout both ways. A clientbound `accepted == false` must be answered with a
//! serverbound confirmation for the same window and action number.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmTransaction {
    pub window_id: i8,
    pub action: i16,
    pub accepted: bool,
}

impl ProtoEncode for ConfirmTransaction {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i8(self.window_id);
        buf.put_i16(self.action);
        buf.put_u8(self.accepted as u8);
    }
}

impl ProtoDecode for ConfirmTransaction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 4)?;
        Ok(Self {
            window_id: buf.get_i8(),
            action: buf.get_i16(),
            accepted: buf.get_u8() != 0,
        })
    }
}
