//! CustomPayload (0x3F): server to client.
//!
//! A named channel with an opaque body that runs to the end of the packet.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Channel the server announces its brand on.
pub const BRAND_CHANNEL: &str = "MC|Brand";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPayload {
    pub channel: String,
    pub data: Bytes,
}

impl CustomPayload {
    pub fn brand(name: &str) -> Self {
        let mut data = BytesMut::new();
        write_string(&mut data, name);
        Self {
            channel: BRAND_CHANNEL.into(),
            data: data.freeze(),
        }
    }

    /// The server brand, if this is a well-formed brand payload.
    pub fn read_brand(&self) -> Option<String> {
        if self.channel != BRAND_CHANNEL {
            return None;
        }
        let mut data = self.data.clone();
        read_string(&mut data).ok()
    }
}

impl ProtoEncode for CustomPayload {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}

impl ProtoDecode for CustomPayload {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let channel = read_string(buf)?;
        Ok(Self {
            channel,
            data: buf.copy_to_bytes(buf.remaining()),
        })
    }
}
