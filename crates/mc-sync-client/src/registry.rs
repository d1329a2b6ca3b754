//! Network id to local entity mapping.
//!
//! A multi-part entity of `N` ids occupies `P ..= P+N-1`: the primary at `P`
//! and its parts after it. A remap moves the whole range in one step.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::entity::{EntityKind, LocalEntity};
use crate::error::RegistryError;

/// Log target for authority/replica disagreements.
pub const DESYNC_TARGET: &str = "mc_sync::desync";

/// First id handed out for locally constructed entities, before the server id is known.
const PLACEHOLDER_BASE: i32 = -0x4000_0000;

#[derive(Debug)]
pub struct EntityRegistry {
    entities: HashMap<i32, LocalEntity>,
    /// Primary id to its part ids, in part order.
    parts: HashMap<i32, Vec<i32>>,
    next_placeholder: i32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            parts: HashMap::new(),
            next_placeholder: PLACEHOLDER_BASE,
        }
    }

    /// Reserve a contiguous block of `len` local ids and return the first.
    pub fn allocate_placeholder(&mut self, len: usize) -> i32 {
        let first = self.next_placeholder;
        self.next_placeholder = self.next_placeholder.wrapping_add(len.max(1) as i32);
        first
    }

    /// Insert an entity under `id`. A live entry is replaced and returned.
    pub fn register(&mut self, id: i32, mut entity: LocalEntity) -> Option<LocalEntity> {
        entity.id = id;
        let previous = self.remove(id);
        if let Some(old) = &previous {
            warn!(
                target: DESYNC_TARGET,
                "Entity id {id} registered twice, replacing {:?}", old.kind
            );
        }
        self.entities.insert(id, entity);
        previous
    }

    /// Insert a group of `len` ids starting at `id`: the primary first, then
    /// `len - 1` parts in declaration order.
    pub fn register_multipart(&mut self, id: i32, primary: LocalEntity, len: usize) {
        self.register(id, primary);
        let part_count = len.saturating_sub(1);
        let mut part_ids = Vec::with_capacity(part_count);
        for index in 0..part_count {
            let part_id = id.wrapping_add(index as i32 + 1);
            let mut part = LocalEntity::new(
                part_id,
                EntityKind::Part { primary: id, index },
                [0, 0, 0],
            );
            if let Some(p) = self.entities.get(&id) {
                part.server_pos = p.server_pos;
                part.pos = p.pos;
                part.prev_pos = p.pos;
            }
            self.register(part_id, part);
            part_ids.push(part_id);
        }
        self.parts.insert(id, part_ids);
    }

    pub fn lookup(&self, id: i32) -> Option<&LocalEntity> {
        self.entities.get(&id)
    }

    pub fn lookup_mut(&mut self, id: i32) -> Option<&mut LocalEntity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.entities.contains_key(&id)
    }

    /// Remove an entity and, for a primary, all of its parts. Removing an
    /// unknown id is a no-op.
    pub fn remove(&mut self, id: i32) -> Option<LocalEntity> {
        let removed = self.entities.remove(&id)?;
        if let Some(part_ids) = self.parts.remove(&id) {
            for part_id in part_ids {
                self.entities.remove(&part_id);
            }
        }
        if let EntityKind::Part { primary, .. } = removed.kind {
            if let Some(siblings) = self.parts.get_mut(&primary) {
                siblings.retain(|p| *p != id);
            }
        }
        Some(removed)
    }

    /// Part ids of a primary, empty for single-part entities.
    pub fn parts_of(&self, id: i32) -> &[i32] {
        self.parts.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move a primary and its parts from `from` to `to`, keeping offsets.
    ///
    /// Nothing changes unless the primary is present. Entries already at the
    /// destination ids are replaced.
    pub fn remap(&mut self, from: i32, to: i32) -> Result<(), RegistryError> {
        if from == to {
            return Ok(());
        }
        if !self.entities.contains_key(&from) {
            return Err(RegistryError::NotFound(from));
        }
        let offset = to.wrapping_sub(from);

        let part_ids = self.parts.remove(&from).unwrap_or_default();
        let mut moved = Vec::with_capacity(part_ids.len() + 1);
        if let Some(primary) = self.entities.remove(&from) {
            moved.push(primary);
        }
        for part_id in &part_ids {
            if let Some(part) = self.entities.remove(part_id) {
                moved.push(part);
            }
        }

        let mut new_part_ids = Vec::with_capacity(part_ids.len());
        for mut entity in moved {
            let new_id = entity.id.wrapping_add(offset);
            if let EntityKind::Part { primary, .. } = &mut entity.kind {
                *primary = to;
                new_part_ids.push(new_id);
            }
            self.register(new_id, entity);
        }
        if !new_part_ids.is_empty() {
            self.parts.insert(to, new_part_ids);
        }
        debug!("Remapped entity {from} -> {to} ({} parts)", part_ids.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.entities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LocalEntity> {
        self.entities.values_mut()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.parts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ObjectKind;

    fn boat(id: i32) -> LocalEntity {
        LocalEntity::new(id, EntityKind::Object(ObjectKind::Boat), [0, 0, 0])
    }

    fn dragon(id: i32) -> LocalEntity {
        LocalEntity::new(id, EntityKind::Mob { mob_type: 63 }, [32, 64, 96])
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = EntityRegistry::new();
        assert!(reg.register(5, boat(0)).is_none());
        assert_eq!(reg.lookup(5).map(|e| e.id), Some(5));
        assert!(reg.lookup(6).is_none());
    }

    #[test]
    fn duplicate_register_replaces() {
        let mut reg = EntityRegistry::new();
        reg.register(5, boat(5));
        let old = reg.register(5, dragon(5));
        assert!(matches!(old.map(|e| e.kind), Some(EntityKind::Object(_))));
        assert!(matches!(
            reg.lookup(5).map(|e| &e.kind),
            Some(EntityKind::Mob { .. })
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = EntityRegistry::new();
        reg.register(5, boat(5));
        assert!(reg.remove(5).is_some());
        assert!(reg.remove(5).is_none());
        assert!(reg.remove(99).is_none());
        assert!(reg.is_empty());
    }

    fn sorted_ids(reg: &EntityRegistry) -> Vec<i32> {
        let mut ids: Vec<i32> = reg.ids().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn group_of_three_occupies_exactly_three_ids() {
        let mut reg = EntityRegistry::new();
        reg.register_multipart(10, dragon(10), 3);
        assert_eq!(sorted_ids(&reg), vec![10, 11, 12]);
        assert_eq!(reg.parts_of(10), &[11, 12]);
        assert!(matches!(
            reg.lookup(12).map(|e| &e.kind),
            Some(EntityKind::Part {
                primary: 10,
                index: 1
            })
        ));
    }

    #[test]
    fn group_of_one_has_no_parts() {
        let mut reg = EntityRegistry::new();
        reg.register_multipart(10, dragon(10), 1);
        assert_eq!(sorted_ids(&reg), vec![10]);
        assert!(reg.parts_of(10).is_empty());
    }

    #[test]
    fn remap_moves_whole_range() {
        let mut reg = EntityRegistry::new();
        let placeholder = reg.allocate_placeholder(3);
        reg.register_multipart(placeholder, dragon(placeholder), 3);
        reg.remap(placeholder, 100).unwrap();

        assert_eq!(sorted_ids(&reg), vec![100, 101, 102]);
        assert_eq!(reg.parts_of(100), &[101, 102]);
        assert!(matches!(
            reg.lookup(102).map(|e| &e.kind),
            Some(EntityKind::Part {
                primary: 100,
                index: 1
            })
        ));
        assert_eq!(reg.lookup(100).map(|e| e.id), Some(100));
    }

    #[test]
    fn remap_unknown_changes_nothing() {
        let mut reg = EntityRegistry::new();
        reg.register(1, boat(1));
        assert_eq!(reg.remap(7, 8), Err(RegistryError::NotFound(7)));
        assert!(reg.contains(1));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn removing_primary_removes_parts() {
        let mut reg = EntityRegistry::new();
        reg.register_multipart(10, dragon(10), 3);
        reg.remove(10);
        assert!(reg.is_empty());
    }

    #[test]
    fn placeholders_do_not_overlap() {
        let mut reg = EntityRegistry::new();
        let a = reg.allocate_placeholder(8);
        let b = reg.allocate_placeholder(1);
        assert_eq!(b, a + 8);
    }
}
