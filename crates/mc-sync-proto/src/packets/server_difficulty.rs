//! ServerDifficulty (0x41): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDifficulty {
    /// 0 peaceful to 3 hard.
    pub difficulty: u8,
}

impl ProtoEncode for ServerDifficulty {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.difficulty);
    }
}

impl ProtoDecode for ServerDifficulty {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        Ok(Self {
            difficulty: buf.get_u8(),
        })
    }
}
