//! UpdateSign (0x33): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::BlockPos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSign {
    pub location: BlockPos,
    /// JSON chat components, top line first.
    pub lines: [String; 4],
}

impl ProtoEncode for UpdateSign {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
        for line in &self.lines {
            write_string(buf, line);
        }
    }
}

impl ProtoDecode for UpdateSign {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            location: BlockPos::proto_decode(buf)?,
            lines: [
                read_string(buf)?,
                read_string(buf)?,
                read_string(buf)?,
                read_string(buf)?,
            ],
        })
    }
}
