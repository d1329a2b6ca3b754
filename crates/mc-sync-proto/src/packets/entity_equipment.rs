//! EntityEquipment (0x04): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::Slot;
use crate::types::VarInt;

/// Equipment slot numbers: held item, then armor from boots up.
pub mod slot {
    pub const HELD: i16 = 0;
    pub const BOOTS: i16 = 1;
    pub const LEGGINGS: i16 = 2;
    pub const CHESTPLATE: i16 = 3;
    pub const HELMET: i16 = 4;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityEquipment {
    pub entity_id: i32,
    pub slot: i16,
    pub item: Slot,
}

impl ProtoEncode for EntityEquipment {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i16(self.slot);
        self.item.proto_encode(buf);
    }
}

impl ProtoDecode for EntityEquipment {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        ensure_remaining(buf, 2)?;
        let slot = buf.get_i16();
        Ok(Self {
            entity_id,
            slot,
            item: Slot::proto_decode(buf)?,
        })
    }
}
