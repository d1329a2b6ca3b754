//! UpdateScore (0x3C): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScore {
    /// Player name or other score holder.
    pub entry: String,
    pub objective: String,
    /// `None` removes the score.
    pub value: Option<i32>,
}

impl ProtoEncode for UpdateScore {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.entry);
        buf.put_i8(if self.value.is_some() { 0 } else { 1 });
        write_string(buf, &self.objective);
        if let Some(v) = self.value {
            VarInt(v).proto_encode(buf);
        }
    }
}

impl ProtoDecode for UpdateScore {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entry = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        let remove = buf.get_i8() == 1;
        let objective = read_string(buf)?;
        let value = if remove {
            None
        } else {
            Some(VarInt::proto_decode(buf)?.0)
        };
        Ok(Self {
            entry,
            objective,
            value,
        })
    }
}
