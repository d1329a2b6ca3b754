//! EntityEffect (0x1D) and RemoveEntityEffect (0x1E): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_bool, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEffect {
    pub entity_id: i32,
    pub effect_id: i8,
    pub amplifier: i8,
    /// Ticks remaining.
    pub duration: i32,
    pub hide_particles: bool,
}

impl ProtoEncode for EntityEffect {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.effect_id);
        buf.put_i8(self.amplifier);
        VarInt(self.duration).proto_encode(buf);
        buf.put_u8(self.hide_particles as u8);
    }
}

impl ProtoDecode for EntityEffect {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 2)?;
        let effect_id = buf.get_i8();
        let amplifier = buf.get_i8();
        Ok(Self {
            entity_id,
            effect_id,
            amplifier,
            duration: VarInt::proto_decode(buf)?.0,
            hide_particles: read_bool(buf)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveEntityEffect {
    pub entity_id: i32,
    pub effect_id: i8,
}

impl ProtoEncode for RemoveEntityEffect {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.effect_id);
    }
}

impl ProtoDecode for RemoveEntityEffect {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            entity_id,
            effect_id: buf.get_i8(),
        })
    }
}
