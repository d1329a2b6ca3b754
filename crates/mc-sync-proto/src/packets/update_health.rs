//! UpdateHealth (0x06): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateHealth {
    pub health: f32,
    pub food: i32,
    pub saturation: f32,
}

impl ProtoEncode for UpdateHealth {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f32(self.health);
        VarInt(self.food).proto_encode(buf);
        buf.put_f32(self.saturation);
    }
}

impl ProtoDecode for UpdateHealth {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 4)?;
        let health = buf.get_f32();
        let food = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 4)?;
        Ok(Self {
            health,
            food,
            saturation: buf.get_f32(),
        })
    }
}
