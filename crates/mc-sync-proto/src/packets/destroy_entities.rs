//! DestroyEntities (0x13): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{read_count, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyEntities {
    pub entity_ids: Vec<i32>,
}

impl ProtoEncode for DestroyEntities {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_ids.len() as i32).proto_encode(buf);
        for &id in &self.entity_ids {
            VarInt(id).proto_encode(buf);
        }
    }
}

impl ProtoDecode for DestroyEntities {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let count = read_count(buf)?;
        let mut entity_ids = Vec::with_capacity(count.min(buf.remaining()));
        for _ in 0..count {
            entity_ids.push(VarInt::proto_decode(buf)?.0);
        }
        Ok(Self { entity_ids })
    }
}
