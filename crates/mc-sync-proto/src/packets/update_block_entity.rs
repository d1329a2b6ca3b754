//! UpdateBlockEntity (0x35): server to client.

use bytes::{Buf, BufMut};
use mc_sync_nbt::NbtRoot;

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::BlockPos;

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBlockEntity {
    pub location: BlockPos,
    /// 1 spawner, 2 command block, 3 beacon, 4 skull, 5 flower pot, 6 banner.
    pub action: u8,
    /// `None` removes the block entity's data.
    pub nbt: Option<NbtRoot>,
}

impl ProtoEncode for UpdateBlockEntity {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
        buf.put_u8(self.action);
        mc_sync_nbt::write_optional_nbt(buf, self.nbt.as_ref());
    }
}

impl ProtoDecode for UpdateBlockEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let location = BlockPos::proto_decode(buf)?;
        ensure_remaining(buf, 1)?;
        let action = buf.get_u8();
        Ok(Self {
            location,
            action,
            nbt: mc_sync_nbt::read_optional_nbt(buf)?,
        })
    }
}
