//! Window-scoped container state.

use std::collections::HashMap;

use mc_sync_proto::item_stack::Slot;

/// Window id of the player's own inventory.
pub const PLAYER_WINDOW: u8 = 0;
/// Window id that addresses the cursor stack.
pub const CURSOR_WINDOW: i8 = -1;
/// Slots in the player inventory view: crafting (5), armor (4), main (27), hotbar (9).
pub const PLAYER_SLOTS: usize = 45;
/// Hotbar slots within the player inventory view.
pub const HOTBAR: std::ops::RangeInclusive<i16> = 36..=44;
/// Player inventory slots shown after the own slots of every other window.
const PLAYER_APPENDED: usize = 36;
/// First main-inventory slot of the player view; appended window slots start here.
const MAIN_INVENTORY: usize = 9;
/// Frames a freshly filled hotbar slot animates for.
pub const PICKUP_ANIMATION: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub window_id: u8,
    pub window_type: String,
    pub title: String,
    pub slots: Vec<Slot>,
    pub properties: HashMap<i16, i16>,
    pub entity_id: Option<i32>,
}

impl Container {
    pub fn player_inventory() -> Self {
        Self {
            window_id: PLAYER_WINDOW,
            window_type: "minecraft:inventory".into(),
            title: String::new(),
            slots: vec![Slot::EMPTY; PLAYER_SLOTS],
            properties: HashMap::new(),
            entity_id: None,
        }
    }

    pub fn open(
        window_id: u8,
        window_type: String,
        title: String,
        slot_count: u8,
        entity_id: Option<i32>,
    ) -> Self {
        Self {
            window_id,
            window_type,
            title,
            slots: vec![Slot::EMPTY; slot_count as usize],
            properties: HashMap::new(),
            entity_id,
        }
    }

    /// Write one slot. Returns false if the index is outside the view.
    pub fn put(&mut self, slot: i16, item: Slot) -> bool {
        match usize::try_from(slot).ok().and_then(|i| self.slots.get_mut(i)) {
            Some(s) => {
                *s = item;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: i16) -> Option<&Slot> {
        usize::try_from(slot).ok().and_then(|i| self.slots.get(i))
    }

    /// Player inventory slot shown at window index `index`, for indices past
    /// this window's own slots.
    pub fn mirrored_slot(&self, index: usize) -> Option<usize> {
        let offset = index.checked_sub(self.slots.len())?;
        (offset < PLAYER_APPENDED).then_some(MAIN_INVENTORY + offset)
    }
}

/// Result of applying a slot write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
    Cursor,
    Inventory,
    Window,
    /// Window id matched nothing open; nothing changed.
    Dropped,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Containers {
    pub inventory: Container,
    pub open: Option<Container>,
    pub cursor: Slot,
    /// Hotbar slot index to remaining pickup animation frames.
    pub animations: HashMap<i16, u8>,
}

impl Default for Containers {
    fn default() -> Self {
        Self::new()
    }
}

impl Containers {
    pub fn new() -> Self {
        Self {
            inventory: Container::player_inventory(),
            open: None,
            cursor: Slot::EMPTY,
            animations: HashMap::new(),
        }
    }

    /// Id of the view currently in front: the open window or the inventory.
    pub fn active_window(&self) -> u8 {
        self.open.as_ref().map_or(PLAYER_WINDOW, |c| c.window_id)
    }

    /// Container addressed by `window_id`, if that window is currently valid.
    pub fn window(&self, window_id: u8) -> Option<&Container> {
        if window_id == PLAYER_WINDOW {
            return Some(&self.inventory);
        }
        self.open.as_ref().filter(|c| c.window_id == window_id)
    }

    /// Slot at `index` as seen through `window_id`. Indices past an open
    /// window's own slots read the player inventory.
    pub fn slot(&self, window_id: u8, index: i16) -> Option<&Slot> {
        let index = usize::try_from(index).ok()?;
        let window = self.window(window_id)?;
        if window_id == PLAYER_WINDOW || index < window.slots.len() {
            return window.slots.get(index);
        }
        self.inventory.slots.get(window.mirrored_slot(index)?)
    }

    fn slot_mut(&mut self, window_id: u8, index: i16) -> Option<&mut Slot> {
        let index = usize::try_from(index).ok()?;
        if window_id == PLAYER_WINDOW {
            return self.inventory.slots.get_mut(index);
        }
        let Self {
            inventory, open, ..
        } = self;
        let open = open.as_mut().filter(|c| c.window_id == window_id)?;
        if index < open.slots.len() {
            return open.slots.get_mut(index);
        }
        let mirrored = open.mirrored_slot(index)?;
        inventory.slots.get_mut(mirrored)
    }

    /// Replace the leading slots of a window with `items`, following the same
    /// index mapping as [`Containers::set_slot`]. Items past the view are
    /// ignored. Returns false if the window is not valid.
    pub fn put_all(&mut self, window_id: u8, items: &[Slot]) -> bool {
        if self.window(window_id).is_none() {
            return false;
        }
        for (index, item) in (0..=i16::MAX).zip(items) {
            match self.slot_mut(window_id, index) {
                Some(slot) => *slot = item.clone(),
                None => break,
            }
        }
        true
    }

    /// Apply a slot write according to the window rules.
    pub fn set_slot(&mut self, window_id: i8, slot: i16, item: Slot) -> SlotWrite {
        if window_id == CURSOR_WINDOW {
            self.cursor = item;
            return SlotWrite::Cursor;
        }
        let Ok(window_id) = u8::try_from(window_id) else {
            return SlotWrite::Dropped;
        };
        if window_id == PLAYER_WINDOW {
            if HOTBAR.contains(&slot) {
                let grows = match (&item.0, self.inventory.get(slot).and_then(|s| s.0.as_ref())) {
                    (Some(new), Some(old)) => old.count < new.count,
                    (Some(_), None) => true,
                    _ => false,
                };
                if grows {
                    self.animations.insert(slot, PICKUP_ANIMATION);
                }
            }
            return if self.inventory.put(slot, item) {
                SlotWrite::Inventory
            } else {
                SlotWrite::OutOfRange
            };
        }
        if self.window(window_id).is_none() {
            return SlotWrite::Dropped;
        }
        match self.slot_mut(window_id, slot) {
            Some(target) => {
                *target = item;
                SlotWrite::Window
            }
            None => SlotWrite::OutOfRange,
        }
    }

    /// Close whatever is open and drop the cursor stack.
    pub fn close(&mut self) -> Option<Container> {
        self.cursor = Slot::EMPTY;
        self.open.take()
    }

    /// Advance pickup animations by one frame.
    pub fn tick(&mut self) {
        self.animations.retain(|_, frames| {
            *frames = frames.saturating_sub(1);
            *frames > 0
        });
    }
}
