//! State changes applied to a [`WorldReplica`] in response to server messages.
//!
//! Every operation here runs on the simulation thread. Inconsistencies with
//! the replica are reported as [`ReplicaError`] and never abort the session.

use mc_sync_proto::item_stack::Slot;
use mc_sync_proto::packets::change_game_state::reason;
use mc_sync_proto::packets::open_window::HORSE_WINDOW;
use mc_sync_proto::packets::player_pos_look::relative;
use mc_sync_proto::packets::spawn_global_entity::LIGHTNING;
use mc_sync_proto::packets::{
    AttachEntity, BlockAction, BlockChange, ChangeGameState, ChunkData, ClientPosLook,
    CollectItem, ConfirmTransaction, DestroyEntities, EntityEffect, EntityEquipment,
    EntityHeadLook, EntityMove, EntityStatus, EntityTeleport, EntityVelocity, Explosion,
    MapChunkBulk, MultiBlockChange, OpenWindow, PlayerAbilities, PlayerPosLook,
    RemoveEntityEffect, ServerDifficulty, SetEntityMetadata, SetExperience, SetSlot,
    SpawnExperienceOrb, SpawnGlobalEntity, SpawnMob, SpawnObject, SpawnPainting, SpawnPlayer,
    UpdateBlockEntity, UpdateSign, WindowItems, WindowProperty,
};
use mc_sync_proto::types::{angle_to_degrees, BlockPos, ChunkPos, Vec3};
use std::collections::HashMap;
use tracing::debug;

use crate::entity::{
    part_count, EntityKind, LocalEntity, ObjectKind, StatusEffect, VelocityRule, EQUIPMENT_SLOTS,
};
use crate::error::ReplicaError;
use crate::replica::container::{Container, SlotWrite};
use crate::replica::{Abilities, ChunkColumn, Experience, WorldReplica};

/// Per-axis distance below which an absolute position update keeps the
/// current rendered position.
pub const TELEPORT_TOLERANCE: Vec3 = Vec3 {
    x: 1.0 / 32.0,
    y: 1.0 / 64.0,
    z: 1.0 / 32.0,
};

/// Mob type code of the horse, the only entity-backed window.
const HORSE: u8 = 100;

/// Number of hotbar slots a held-item change may select.
const HOTBAR_SIZE: i8 = 9;

/// How an absolute position update was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportOutcome {
    /// Within tolerance: rotation only.
    Continuous,
    /// Snapped to the authoritative position.
    Snapped,
    UnknownEntity,
}

/// Game mode change requested by the server, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStateEffect {
    None,
    GameMode(u8),
}

impl WorldReplica {
    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    pub fn spawn_object(&mut self, msg: &SpawnObject) -> Result<(), ReplicaError> {
        let kind = ObjectKind::from_spawn(msg.kind, msg.data)
            .ok_or(ReplicaError::UnknownObjectType(msg.kind))?;

        if let ObjectKind::FishingHook { angler } = kind {
            if !self.is_player(angler) {
                debug!("Dropping fishing hook {} without angler {angler}", msg.entity_id);
                return Ok(());
            }
        }

        let mut entity = LocalEntity::new(
            msg.entity_id,
            EntityKind::Object(kind),
            [msg.x, msg.y, msg.z],
        );
        entity.yaw = angle_to_degrees(msg.yaw);
        entity.pitch = angle_to_degrees(msg.pitch);

        let velocity = Vec3::from_velocity(msg.velocity[0], msg.velocity[1], msg.velocity[2]);
        let data = if kind.consumes_data() { 0 } else { msg.data };
        match kind {
            ObjectKind::FishingHook { angler } => entity.owner = Some(angler),
            ObjectKind::Arrow if data > 0 && self.is_living(data) => entity.owner = Some(data),
            _ => {}
        }
        match kind.velocity_rule() {
            VelocityRule::Acceleration => entity.acceleration = velocity,
            VelocityRule::Motion if data > 0 => entity.velocity = velocity,
            _ => {}
        }

        self.entities.register(msg.entity_id, entity);
        Ok(())
    }

    /// Mobs are built under a placeholder id and then moved to the network
    /// id, parts included.
    pub fn spawn_mob(&mut self, msg: &SpawnMob) -> Result<(), ReplicaError> {
        let group = part_count(msg.kind) + 1;
        let placeholder = self.entities.allocate_placeholder(group);

        let mut entity = LocalEntity::new(
            placeholder,
            EntityKind::Mob { mob_type: msg.kind },
            [msg.x, msg.y, msg.z],
        );
        entity.yaw = angle_to_degrees(msg.yaw);
        entity.pitch = angle_to_degrees(msg.pitch);
        entity.head_yaw = angle_to_degrees(msg.head_pitch);
        entity.velocity = Vec3::from_velocity(msg.velocity[0], msg.velocity[1], msg.velocity[2]);
        entity.apply_metadata(&msg.metadata);

        self.entities.register_multipart(placeholder, entity, group);
        self.entities.remap(placeholder, msg.entity_id)?;
        Ok(())
    }

    pub fn spawn_player(&mut self, msg: &SpawnPlayer) {
        let name = self.player_list.get(&msg.uuid).map(|p| p.name.clone());
        let mut entity = LocalEntity::new(
            msg.entity_id,
            EntityKind::Player {
                uuid: msg.uuid,
                name,
            },
            [msg.x, msg.y, msg.z],
        );
        entity.yaw = angle_to_degrees(msg.yaw);
        entity.pitch = angle_to_degrees(msg.pitch);
        entity.held_item = msg.current_item;
        entity.apply_metadata(&msg.metadata);
        self.entities.register(msg.entity_id, entity);
    }

    pub fn spawn_experience_orb(&mut self, msg: &SpawnExperienceOrb) {
        let entity = LocalEntity::new(
            msg.entity_id,
            EntityKind::ExperienceOrb { count: msg.count },
            [msg.x, msg.y, msg.z],
        );
        self.entities.register(msg.entity_id, entity);
    }

    pub fn set_velocity(&mut self, msg: &EntityVelocity) {
        let velocity = Vec3::from_velocity(msg.velocity[0], msg.velocity[1], msg.velocity[2]);
        if msg.entity_id == self.player.entity_id {
            self.player.velocity = velocity;
        } else if let Some(e) = self.entities.lookup_mut(msg.entity_id) {
            e.velocity = velocity;
        }
    }

    /// Deltas accumulate on the fixed-point reference, never on the rendered position.
    pub fn move_entity(&mut self, msg: &EntityMove) {
        let Some(e) = self.entities.lookup_mut(msg.entity_id) else {
            return;
        };
        if let Some([dx, dy, dz]) = msg.delta {
            e.server_pos[0] = e.server_pos[0].wrapping_add(dx as i32);
            e.server_pos[1] = e.server_pos[1].wrapping_add(dy as i32);
            e.server_pos[2] = e.server_pos[2].wrapping_add(dz as i32);
        }
        let (yaw, pitch) = match msg.rotation {
            Some((yaw, pitch)) => (angle_to_degrees(yaw), angle_to_degrees(pitch)),
            None => (e.yaw, e.pitch),
        };
        let target = e.server_vec();
        e.move_to(target, yaw, pitch);
        e.on_ground = msg.on_ground;
    }

    pub fn teleport_entity(&mut self, msg: &EntityTeleport) -> TeleportOutcome {
        let Some(e) = self.entities.lookup_mut(msg.entity_id) else {
            return TeleportOutcome::UnknownEntity;
        };
        e.server_pos = [msg.x, msg.y, msg.z];
        let target = e.server_vec();
        let yaw = angle_to_degrees(msg.yaw);
        let pitch = angle_to_degrees(msg.pitch);
        e.on_ground = msg.on_ground;

        let d = target - e.pos;
        if d.x.abs() < TELEPORT_TOLERANCE.x
            && d.y.abs() < TELEPORT_TOLERANCE.y
            && d.z.abs() < TELEPORT_TOLERANCE.z
        {
            e.yaw = yaw;
            e.pitch = pitch;
            e.interpolation = None;
            TeleportOutcome::Continuous
        } else {
            e.snap_to(target, yaw, pitch);
            TeleportOutcome::Snapped
        }
    }

    pub fn set_head_look(&mut self, msg: &EntityHeadLook) {
        if let Some(e) = self.entities.lookup_mut(msg.entity_id) {
            e.head_yaw = angle_to_degrees(msg.head_yaw);
        }
    }

    pub fn update_metadata(&mut self, msg: &SetEntityMetadata) {
        if let Some(e) = self.entities.lookup_mut(msg.entity_id) {
            e.apply_metadata(&msg.metadata);
        }
    }

    pub fn entity_status(&mut self, msg: &EntityStatus) {
        if let Some(e) = self.entities.lookup_mut(msg.entity_id) {
            e.last_status = Some(msg.status);
        }
    }

    pub fn destroy_entities(&mut self, msg: &DestroyEntities) {
        for id in &msg.entity_ids {
            self.entities.remove(*id);
        }
    }

    pub fn collect_item(&mut self, msg: &CollectItem) {
        if self.entities.remove(msg.collected_id).is_some() {
            debug!("Entity {} collected {}", msg.collector_id, msg.collected_id);
        }
    }

    /// Equipment slots past the helmet are ignored.
    pub fn set_equipment(&mut self, msg: &EntityEquipment) -> bool {
        let Some(slot) = usize::try_from(msg.slot)
            .ok()
            .filter(|s| *s < EQUIPMENT_SLOTS)
        else {
            return false;
        };
        match self.entities.lookup_mut(msg.entity_id) {
            Some(e) => {
                e.equipment[slot] = msg.item.clone();
                true
            }
            None => false,
        }
    }

    /// Paintings sit at the center of the block they hang on.
    pub fn spawn_painting(&mut self, msg: &SpawnPainting) {
        let at = msg.location;
        let center = [at.x * 32 + 16, at.y * 32 + 16, at.z * 32 + 16];
        let kind = EntityKind::Painting {
            title: msg.title.clone(),
            location: at,
            direction: msg.direction,
        };
        self.entities
            .register(msg.entity_id, LocalEntity::new(msg.entity_id, kind, center));
    }

    /// Lightning is the only global entity; other kinds are ignored.
    pub fn spawn_global_entity(&mut self, msg: &SpawnGlobalEntity) -> bool {
        if msg.kind != LIGHTNING {
            debug!("Ignoring global entity {} of kind {}", msg.entity_id, msg.kind);
            return false;
        }
        let bolt = LocalEntity::new(msg.entity_id, EntityKind::Lightning, [msg.x, msg.y, msg.z]);
        self.entities.register(msg.entity_id, bolt);
        true
    }

    /// Start or stop riding, or set a leash. An unknown vehicle id detaches.
    pub fn attach_entity(&mut self, msg: &AttachEntity) -> bool {
        let target = self.is_known(msg.vehicle_id).then_some(msg.vehicle_id);
        if msg.entity_id == self.player.entity_id {
            if !msg.leash {
                self.player.vehicle = target;
            }
            return true;
        }
        let Some(e) = self.entities.lookup_mut(msg.entity_id) else {
            return false;
        };
        if !msg.leash {
            e.vehicle = target;
        } else if e.kind.is_living() {
            e.leash_holder = target;
        }
        true
    }

    pub fn add_effect(&mut self, msg: &EntityEffect) -> bool {
        let effect = StatusEffect {
            amplifier: msg.amplifier,
            duration: msg.duration,
            hide_particles: msg.hide_particles,
        };
        match self.effects_mut(msg.entity_id) {
            Some(effects) => {
                effects.insert(msg.effect_id, effect);
                true
            }
            None => false,
        }
    }

    pub fn remove_effect(&mut self, msg: &RemoveEntityEffect) -> bool {
        self.effects_mut(msg.entity_id)
            .is_some_and(|effects| effects.remove(&msg.effect_id).is_some())
    }

    /// Effects only apply to the local player and living entities.
    fn effects_mut(&mut self, id: i32) -> Option<&mut HashMap<i8, StatusEffect>> {
        if id == self.player.entity_id {
            return Some(&mut self.player.effects);
        }
        self.entities
            .lookup_mut(id)
            .filter(|e| e.kind.is_living())
            .map(|e| &mut e.effects)
    }

    fn is_known(&self, id: i32) -> bool {
        id == self.player.entity_id || self.entities.contains(id)
    }

    fn is_player(&self, id: i32) -> bool {
        id == self.player.entity_id
            || matches!(
                self.entities.lookup(id).map(|e| &e.kind),
                Some(EntityKind::Player { .. })
            )
    }

    fn is_living(&self, id: i32) -> bool {
        id == self.player.entity_id
            || self.entities.lookup(id).is_some_and(|e| e.kind.is_living())
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Write one block and mark its column dirty. Unloaded columns are ignored.
    pub fn set_block(&mut self, pos: BlockPos, state: u16) -> bool {
        let chunk = pos.chunk_pos();
        let has_sky = self.has_sky;
        let Some(column) = self.chunks.get_mut(&chunk) else {
            return false;
        };
        let previous = column.set_block(
            (pos.x & 15) as usize,
            pos.y,
            (pos.z & 15) as usize,
            state,
            has_sky,
        );
        // Tile data belongs to the block id, not its metadata.
        if previous >> 4 != state >> 4 {
            self.signs.remove(&pos);
            self.block_entities.remove(&pos);
        }
        self.dirty.insert(chunk);
        true
    }

    pub fn apply_block_change(&mut self, msg: &BlockChange) -> bool {
        self.set_block(msg.location, msg.block_state as u16)
    }

    pub fn apply_multi_block_change(&mut self, msg: &MultiBlockChange) -> usize {
        let chunk = msg.chunk();
        msg.records
            .iter()
            .filter(|r| self.set_block(r.world_pos(chunk), r.block_state as u16))
            .count()
    }

    /// Replace column storage. A ground-up payload with no data unloads the column.
    pub fn apply_chunk_data(&mut self, msg: &ChunkData) -> Result<(), ReplicaError> {
        let pos = msg.pos();
        if msg.is_unload() {
            self.chunks.remove(&pos);
            self.forget_tile_data(pos);
            self.dirty.insert(pos);
            return Ok(());
        }
        if msg.ground_up {
            self.chunks.insert(pos, ChunkColumn::new());
            self.forget_tile_data(pos);
        }
        let has_sky = self.has_sky;
        let Some(column) = self.chunks.get_mut(&pos) else {
            debug!("Section update for unloaded column {pos:?}");
            return Ok(());
        };
        column.fill(&msg.data, msg.section_mask, msg.ground_up, has_sky)?;
        self.dirty.insert(pos);
        Ok(())
    }

    /// Load several ground-up columns. The payload length is checked for the
    /// whole packet before any column changes.
    pub fn apply_map_chunk_bulk(&mut self, msg: &MapChunkBulk) -> Result<usize, ReplicaError> {
        let lens: Vec<usize> = msg
            .columns
            .iter()
            .map(|c| ChunkColumn::expected_len(c.section_mask, msg.sky_light, true))
            .collect();
        let expected = lens.iter().sum();
        if msg.data.len() != expected {
            return Err(ReplicaError::ChunkLength {
                expected,
                actual: msg.data.len(),
            });
        }

        let mut offset = 0;
        for (column, len) in msg.columns.iter().zip(lens) {
            let mut storage = ChunkColumn::new();
            storage.fill(
                &msg.data[offset..offset + len],
                column.section_mask,
                true,
                msg.sky_light,
            )?;
            offset += len;
            let pos = column.pos();
            self.chunks.insert(pos, storage);
            self.forget_tile_data(pos);
            self.dirty.insert(pos);
        }
        Ok(msg.columns.len())
    }

    /// Clear the destroyed blocks and push the local player.
    pub fn apply_explosion(&mut self, msg: &Explosion) -> usize {
        let cleared = msg
            .affected_blocks()
            .filter(|pos| self.set_block(*pos, 0))
            .count();
        let [x, y, z] = msg.player_motion;
        self.player.velocity = self.player.velocity + Vec3::new(x as f64, y as f64, z as f64);
        cleared
    }

    /// Queue a block action for presentation. Unloaded columns drop it.
    pub fn block_action(&mut self, msg: &BlockAction) -> bool {
        if !self.is_loaded(msg.location.chunk_pos()) {
            return false;
        }
        self.block_actions.push(*msg);
        true
    }

    pub fn update_sign(&mut self, msg: &UpdateSign) -> bool {
        if !self.is_loaded(msg.location.chunk_pos()) {
            debug!("Sign update in unloaded column at {:?}", msg.location);
            return false;
        }
        self.signs.insert(msg.location, msg.lines.clone());
        true
    }

    /// Store or clear tile data. Unloaded columns drop the update.
    pub fn update_block_entity(&mut self, msg: &UpdateBlockEntity) -> bool {
        if !self.is_loaded(msg.location.chunk_pos()) {
            return false;
        }
        match &msg.nbt {
            Some(nbt) => {
                self.block_entities.insert(msg.location, nbt.clone());
            }
            None => {
                self.block_entities.remove(&msg.location);
            }
        }
        true
    }

    fn forget_tile_data(&mut self, chunk: ChunkPos) {
        self.signs.retain(|pos, _| pos.chunk_pos() != chunk);
        self.block_entities.retain(|pos, _| pos.chunk_pos() != chunk);
    }

    // -----------------------------------------------------------------------
    // Containers
    // -----------------------------------------------------------------------

    pub fn open_window(&mut self, msg: &OpenWindow) {
        if msg.window_type == HORSE_WINDOW {
            let is_horse = msg.entity_id.and_then(|id| self.entities.lookup(id)).is_some_and(
                |e| matches!(e.kind, EntityKind::Mob { mob_type } if mob_type == HORSE),
            );
            if !is_horse {
                debug!("Horse window {} without a horse", msg.window_id);
                return;
            }
        }
        self.containers.open = Some(Container::open(
            msg.window_id,
            msg.window_type.clone(),
            msg.title.clone(),
            msg.slot_count,
            msg.entity_id,
        ));
    }

    pub fn close_window(&mut self) {
        self.containers.close();
    }

    /// Writes addressed to a window that is not open are dropped.
    pub fn set_slot(&mut self, msg: &SetSlot) -> Result<SlotWrite, ReplicaError> {
        let outcome = self
            .containers
            .set_slot(msg.window_id, msg.slot, msg.item.clone());
        match outcome {
            SlotWrite::Dropped => {
                debug!("Dropping slot write for closed window {}", msg.window_id);
                Ok(outcome)
            }
            SlotWrite::OutOfRange => Err(ReplicaError::SlotOutOfRange {
                window_id: msg.window_id,
                slot: msg.slot,
            }),
            _ => Ok(outcome),
        }
    }

    pub fn set_window_items(&mut self, msg: &WindowItems) -> bool {
        self.containers.put_all(msg.window_id, &msg.items)
    }

    /// Properties only apply to a non-inventory open window.
    pub fn set_window_property(&mut self, msg: &WindowProperty) -> bool {
        match self
            .containers
            .open
            .as_mut()
            .filter(|c| c.window_id == msg.window_id)
        {
            Some(container) => {
                container.properties.insert(msg.property, msg.value);
                true
            }
            None => false,
        }
    }

    /// The reply the server expects when it rejected a client action.
    pub fn confirm_transaction(&self, msg: &ConfirmTransaction) -> Option<ConfirmTransaction> {
        let window = u8::try_from(msg.window_id).ok()?;
        self.containers.window(window)?;
        (!msg.accepted).then_some(ConfirmTransaction {
            window_id: msg.window_id,
            action: msg.action,
            accepted: true,
        })
    }

    pub fn cursor(&self) -> &Slot {
        &self.containers.cursor
    }

    // -----------------------------------------------------------------------
    // Local player and world state
    // -----------------------------------------------------------------------

    /// Apply a server position correction and build the acknowledgement.
    pub fn apply_player_pos_look(&mut self, msg: &PlayerPosLook) -> ClientPosLook {
        let p = &mut self.player;
        let mut pos = Vec3::new(msg.x, msg.y, msg.z);
        if msg.is_relative(relative::X) {
            pos.x += p.pos.x;
        } else {
            p.velocity.x = 0.0;
        }
        if msg.is_relative(relative::Y) {
            pos.y += p.pos.y;
        } else {
            p.velocity.y = 0.0;
        }
        if msg.is_relative(relative::Z) {
            pos.z += p.pos.z;
        } else {
            p.velocity.z = 0.0;
        }
        let mut yaw = msg.yaw;
        let mut pitch = msg.pitch;
        if msg.is_relative(relative::X_ROT) {
            pitch += p.pitch;
        }
        if msg.is_relative(relative::Y_ROT) {
            yaw += p.yaw;
        }
        p.pos = pos;
        p.yaw = yaw;
        p.pitch = pitch;

        ClientPosLook {
            x: p.pos.x,
            y: p.pos.y,
            z: p.pos.z,
            yaw: p.yaw,
            pitch: p.pitch,
            on_ground: false,
        }
    }

    pub fn set_health(&mut self, health: f32, food: i32, saturation: f32) {
        self.player.health = health;
        self.player.food = food;
        self.player.saturation = saturation;
    }

    /// Out-of-range hotbar indices are ignored.
    pub fn set_held_slot(&mut self, slot: i8) -> bool {
        if (0..HOTBAR_SIZE).contains(&slot) {
            self.player.held_slot = slot as u8;
            true
        } else {
            false
        }
    }

    pub fn set_experience(&mut self, msg: &SetExperience) {
        self.player.experience = Experience {
            bar: msg.bar,
            level: msg.level,
            total: msg.total,
        };
    }

    pub fn set_abilities(&mut self, msg: &PlayerAbilities) {
        self.player.abilities = Abilities::from(msg);
    }

    pub fn set_difficulty(&mut self, msg: &ServerDifficulty) {
        self.difficulty = msg.difficulty;
    }

    pub fn set_time(&mut self, world_age: i64, time_of_day: i64) {
        self.world_age = world_age;
        self.time_of_day = time_of_day;
    }

    pub fn change_game_state(&mut self, msg: &ChangeGameState) -> GameStateEffect {
        match msg.reason {
            reason::BEGIN_RAINING => {
                self.weather.raining = true;
                self.weather.rain_strength = 0.0;
            }
            reason::END_RAINING => {
                self.weather.raining = false;
                self.weather.rain_strength = 1.0;
            }
            reason::CHANGE_GAME_MODE => {
                let mode = (msg.value + 0.5).floor() as u8;
                self.player.game_mode = mode;
                return GameStateEffect::GameMode(mode);
            }
            reason::RAIN_STRENGTH => self.weather.rain_strength = msg.value,
            reason::THUNDER_STRENGTH => self.weather.thunder_strength = msg.value,
            _ => {}
        }
        GameStateEffect::None
    }
}
