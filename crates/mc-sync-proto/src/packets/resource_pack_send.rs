//! ResourcePackSend (0x48): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePackSend {
    pub url: String,
    /// SHA-1 hex digest, echoed back in every status reply.
    pub hash: String,
}

impl ProtoEncode for ResourcePackSend {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.url);
        write_string(buf, &self.hash);
    }
}

impl ProtoDecode for ResourcePackSend {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            url: read_string(buf)?,
            hash: read_string(buf)?,
        })
    }
}
