//! TimeUpdate (0x03): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUpdate {
    pub world_age: i64,
    /// Negative freezes the daylight cycle at `|time_of_day|`.
    pub time_of_day: i64,
}

impl ProtoEncode for TimeUpdate {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i64(self.world_age);
        buf.put_i64(self.time_of_day);
    }
}

impl ProtoDecode for TimeUpdate {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 16)?;
        Ok(Self {
            world_age: buf.get_i64(),
            time_of_day: buf.get_i64(),
        })
    }
}
