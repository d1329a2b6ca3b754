//! Chat (0x02): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// JSON chat component.
    pub message: String,
    /// 0 chat box, 1 system message, 2 action bar.
    pub position: i8,
}

impl Chat {
    /// Plain text as a system message.
    pub fn system(text: &str) -> Self {
        Self {
            message: serde_json::json!({ "text": text }).to_string(),
            position: 1,
        }
    }
}

impl ProtoEncode for Chat {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.message);
        buf.put_i8(self.position);
    }
}

impl ProtoDecode for Chat {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let message = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            message,
            position: buf.get_i8(),
        })
    }
}
