//! ChangeGameState (0x2B): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Reason codes the replica reacts to.
pub mod reason {
    pub const INVALID_BED: u8 = 0;
    pub const BEGIN_RAINING: u8 = 1;
    pub const END_RAINING: u8 = 2;
    pub const CHANGE_GAME_MODE: u8 = 3;
    pub const RAIN_STRENGTH: u8 = 7;
    pub const THUNDER_STRENGTH: u8 = 8;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeGameState {
    pub reason: u8,
    pub value: f32,
}

impl ProtoEncode for ChangeGameState {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.reason);
        buf.put_f32(self.value);
    }
}

impl ProtoDecode for ChangeGameState {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 5)?;
        Ok(Self {
            reason: buf.get_u8(),
            value: buf.get_f32(),
        })
    }
}
