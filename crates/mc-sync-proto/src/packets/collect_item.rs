//! CollectItem (0x0D): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectItem {
    pub collected_id: i32,
    pub collector_id: i32,
}

impl ProtoEncode for CollectItem {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.collected_id).proto_encode(buf);
        VarInt(self.collector_id).proto_encode(buf);
    }
}

impl ProtoDecode for CollectItem {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            collected_id: VarInt::proto_decode(buf)?.0,
            collector_id: VarInt::proto_decode(buf)?.0,
        })
    }
}
