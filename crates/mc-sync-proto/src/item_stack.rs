//! Item stack (slot) serialization.
//!
//! Wire format:
//! ```text
//! i16 item_id        -1 = empty, nothing follows
//! i8  count
//! i16 damage
//! NBT root compound, or 0x00 for none
//! ```

use bytes::{Buf, BufMut};
use mc_sync_nbt::NbtRoot;

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// A single item stack. `None` at the slot level means empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStack {
    pub item_id: i16,
    pub count: i8,
    pub damage: i16,
    pub nbt: Option<NbtRoot>,
}

impl ItemStack {
    pub fn new(item_id: i16, count: i8, damage: i16) -> Self {
        Self {
            item_id,
            count,
            damage,
            nbt: None,
        }
    }
}

/// A possibly empty slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot(pub Option<ItemStack>);

impl Slot {
    pub const EMPTY: Slot = Slot(None);

    pub fn of(stack: ItemStack) -> Self {
        Slot(Some(stack))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl ProtoEncode for Slot {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        match &self.0 {
            None => buf.put_i16(-1),
            Some(stack) => {
                buf.put_i16(stack.item_id);
                buf.put_i8(stack.count);
                buf.put_i16(stack.damage);
                mc_sync_nbt::write_optional_nbt(buf, stack.nbt.as_ref());
            }
        }
    }
}

impl ProtoDecode for Slot {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 2)?;
        let item_id = buf.get_i16();
        if item_id < 0 {
            return Ok(Slot(None));
        }
        ensure_remaining(buf, 3)?;
        let count = buf.get_i8();
        let damage = buf.get_i16();
        let nbt = mc_sync_nbt::read_optional_nbt(buf)?;
        Ok(Slot(Some(ItemStack {
            item_id,
            count,
            damage,
            nbt,
        })))
    }
}
