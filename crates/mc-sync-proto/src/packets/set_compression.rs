//! SetCompression (0x46): server to client.
//!
//! Takes effect for every frame after this one, in both directions.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompression {
    /// Negative disables compression.
    pub threshold: i32,
}

impl ProtoEncode for SetCompression {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.threshold).proto_encode(buf);
    }
}

impl ProtoDecode for SetCompression {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            threshold: VarInt::proto_decode(buf)?.0,
        })
    }
}
