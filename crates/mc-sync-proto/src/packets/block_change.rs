//! BlockChange (0x23): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{BlockPos, VarInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChange {
    pub location: BlockPos,
    /// `block_id << 4 | meta`.
    pub block_state: i32,
}

impl ProtoEncode for BlockChange {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
        VarInt(self.block_state).proto_encode(buf);
    }
}

impl ProtoDecode for BlockChange {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            location: BlockPos::proto_decode(buf)?,
            block_state: VarInt::proto_decode(buf)?.0,
        })
    }
}
