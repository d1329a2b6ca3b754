//! BlockAction (0x24): server to client.
//!
//! Note blocks, pistons and chests. The two data bytes mean different things per block.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{BlockPos, VarInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAction {
    pub location: BlockPos,
    pub action_id: u8,
    pub action_param: u8,
    /// Block id without metadata.
    pub block_type: i32,
}

impl ProtoEncode for BlockAction {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
        buf.put_u8(self.action_id);
        buf.put_u8(self.action_param);
        VarInt(self.block_type).proto_encode(buf);
    }
}

impl ProtoDecode for BlockAction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let location = BlockPos::proto_decode(buf)?;
        ensure_remaining(buf, 2)?;
        Ok(Self {
            location,
            action_id: buf.get_u8(),
            action_param: buf.get_u8(),
            block_type: VarInt::proto_decode(buf)?.0,
        })
    }
}
