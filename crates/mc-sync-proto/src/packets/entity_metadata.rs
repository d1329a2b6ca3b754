//! EntityMetadata (0x1C): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::metadata::EntityMetadata;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityMetadata {
    pub entity_id: i32,
    pub metadata: EntityMetadata,
}

impl ProtoEncode for SetEntityMetadata {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        self.metadata.proto_encode(buf);
    }
}

impl ProtoDecode for SetEntityMetadata {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            entity_id: VarInt::proto_decode(buf)?.0,
            metadata: EntityMetadata::proto_decode(buf)?,
        })
    }
}
