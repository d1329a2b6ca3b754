//! DisplayScoreboard (0x3D): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayScoreboard {
    /// 0 list, 1 sidebar, 2 below name, 3..=18 team-colored sidebars.
    pub position: i8,
    /// Empty clears the slot.
    pub objective: String,
}

impl ProtoEncode for DisplayScoreboard {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i8(self.position);
        write_string(buf, &self.objective);
    }
}

impl ProtoDecode for DisplayScoreboard {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        Ok(Self {
            position: buf.get_i8(),
            objective: read_string(buf)?,
        })
    }
}
