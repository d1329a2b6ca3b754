//! SpawnPosition (0x05): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::BlockPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPosition {
    pub location: BlockPos,
}

impl ProtoEncode for SpawnPosition {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
    }
}

impl ProtoDecode for SpawnPosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            location: BlockPos::proto_decode(buf)?,
        })
    }
}
