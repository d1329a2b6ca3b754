//! PlayerAbilities (0x39): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Bits of [`PlayerAbilities::flags`].
pub mod flag {
    pub const INVULNERABLE: i8 = 0x01;
    pub const FLYING: i8 = 0x02;
    pub const ALLOW_FLYING: i8 = 0x04;
    pub const CREATIVE: i8 = 0x08;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAbilities {
    pub flags: i8,
    pub flying_speed: f32,
    /// Walking speed, which also drives the field of view modifier.
    pub walking_speed: f32,
}

impl PlayerAbilities {
    pub fn has(&self, bit: i8) -> bool {
        self.flags & bit != 0
    }
}

impl ProtoEncode for PlayerAbilities {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i8(self.flags);
        buf.put_f32(self.flying_speed);
        buf.put_f32(self.walking_speed);
    }
}

impl ProtoDecode for PlayerAbilities {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 9)?;
        Ok(Self {
            flags: buf.get_i8(),
            flying_speed: buf.get_f32(),
            walking_speed: buf.get_f32(),
        })
    }
}
