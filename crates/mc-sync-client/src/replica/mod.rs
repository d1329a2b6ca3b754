//! Client-side mirror of one authoritative world.
//!
//! State lives here; the operations that change it in response to network
//! messages are in [`crate::mutator`].

pub mod chunk;
pub mod container;
pub mod player_list;
pub mod scoreboard;

use std::collections::{BTreeSet, HashMap};

use mc_sync_nbt::NbtRoot;
use mc_sync_proto::packets::player_abilities::flag;
use mc_sync_proto::packets::{BlockAction, PlayerAbilities};
use mc_sync_proto::types::{BlockPos, ChunkPos, Vec3};

use crate::entity::{tick_effects, StatusEffect};
use crate::registry::EntityRegistry;

pub use chunk::ChunkColumn;
pub use container::{Container, Containers, SlotWrite};
pub use player_list::{PlayerInfo, PlayerList};
pub use scoreboard::Scoreboard;

/// Overworld dimension id; the only one with a sky.
pub const OVERWORLD: i32 = 0;

/// What the local player is allowed to do, as last granted by the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Abilities {
    pub invulnerable: bool,
    pub flying: bool,
    pub allow_flying: bool,
    pub creative: bool,
    pub flying_speed: f32,
    pub walking_speed: f32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            invulnerable: false,
            flying: false,
            allow_flying: false,
            creative: false,
            flying_speed: 0.05,
            walking_speed: 0.1,
        }
    }
}

impl From<&PlayerAbilities> for Abilities {
    fn from(msg: &PlayerAbilities) -> Self {
        Self {
            invulnerable: msg.has(flag::INVULNERABLE),
            flying: msg.has(flag::FLYING),
            allow_flying: msg.has(flag::ALLOW_FLYING),
            creative: msg.has(flag::CREATIVE),
            flying_speed: msg.flying_speed,
            walking_speed: msg.walking_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Experience {
    pub bar: f32,
    pub level: i32,
    pub total: i32,
}

/// The controlling player. Not stored in the entity registry.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayer {
    pub entity_id: i32,
    pub game_mode: u8,
    pub pos: Vec3,
    pub prev_pos: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
    pub health: f32,
    pub food: i32,
    pub saturation: f32,
    pub held_slot: u8,
    pub reduced_debug_info: bool,
    pub abilities: Abilities,
    pub experience: Experience,
    pub effects: HashMap<i8, StatusEffect>,
    pub vehicle: Option<i32>,
}

impl LocalPlayer {
    pub fn new(entity_id: i32, game_mode: u8) -> Self {
        Self {
            entity_id,
            game_mode,
            pos: Vec3::ZERO,
            prev_pos: Vec3::ZERO,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
            health: 20.0,
            food: 20,
            saturation: 5.0,
            held_slot: 0,
            reduced_debug_info: false,
            abilities: Abilities::default(),
            experience: Experience::default(),
            effects: HashMap::new(),
            vehicle: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Weather {
    pub raining: bool,
    pub rain_strength: f32,
    pub thunder_strength: f32,
}

#[derive(Debug)]
pub struct WorldReplica {
    pub dimension: i32,
    pub difficulty: u8,
    pub level_type: String,
    pub has_sky: bool,
    pub(crate) chunks: HashMap<ChunkPos, ChunkColumn>,
    pub(crate) dirty: BTreeSet<ChunkPos>,
    pub entities: EntityRegistry,
    pub scoreboard: Scoreboard,
    pub player_list: PlayerList,
    pub containers: Containers,
    pub player: LocalPlayer,
    pub weather: Weather,
    pub world_age: i64,
    pub time_of_day: i64,
    pub spawn: BlockPos,
    /// Sign text by position, top line first.
    pub signs: HashMap<BlockPos, [String; 4]>,
    /// Server-sent tile data (spawners, skulls, banners) by position.
    pub block_entities: HashMap<BlockPos, NbtRoot>,
    /// Block actions not yet played by the presentation layer.
    pub(crate) block_actions: Vec<BlockAction>,
}

impl WorldReplica {
    pub fn new(dimension: i32, difficulty: u8, level_type: String, player: LocalPlayer) -> Self {
        Self {
            dimension,
            difficulty,
            level_type,
            has_sky: dimension == OVERWORLD,
            chunks: HashMap::new(),
            dirty: BTreeSet::new(),
            entities: EntityRegistry::new(),
            scoreboard: Scoreboard::new(),
            player_list: PlayerList::new(),
            containers: Containers::new(),
            player,
            weather: Weather::default(),
            world_age: 0,
            time_of_day: 0,
            spawn: BlockPos::default(),
            signs: HashMap::new(),
            block_entities: HashMap::new(),
            block_actions: Vec::new(),
        }
    }

    /// Build the replacement for a dimension change. The scoreboard and the
    /// player list survive; everything else starts over.
    pub fn replace(self, dimension: i32, difficulty: u8, level_type: String, game_mode: u8) -> Self {
        let mut player = LocalPlayer::new(self.player.entity_id, game_mode);
        player.reduced_debug_info = self.player.reduced_debug_info;
        let mut next = Self::new(dimension, difficulty, level_type, player);
        next.scoreboard = self.scoreboard;
        next.player_list = self.player_list;
        next
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ChunkColumn> {
        self.chunks.get(&pos)
    }

    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Block state at a world position; unloaded columns read as air.
    pub fn block(&self, pos: BlockPos) -> u16 {
        self.chunks
            .get(&pos.chunk_pos())
            .map(|c| c.block((pos.x & 15) as usize, pos.y, (pos.z & 15) as usize))
            .unwrap_or(0)
    }

    pub fn is_dirty(&self, pos: ChunkPos) -> bool {
        self.dirty.contains(&pos)
    }

    /// Columns changed since the last call, for the presentation layer.
    pub fn take_dirty(&mut self) -> Vec<ChunkPos> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    /// Block actions received since the last call, in arrival order.
    pub fn take_block_actions(&mut self) -> Vec<BlockAction> {
        std::mem::take(&mut self.block_actions)
    }

    /// Advance the per-frame state: entity interpolation and pickup animations.
    pub fn tick(&mut self) {
        self.player.prev_pos = self.player.pos;
        tick_effects(&mut self.player.effects);
        for entity in self.entities.iter_mut() {
            entity.tick();
        }
        self.containers.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_sync_proto::packets::scoreboard_objective::{ObjectiveAction, ScoreboardObjective};

    #[test]
    fn replacement_keeps_scoreboard_only() {
        let mut world = WorldReplica::new(0, 1, "default".into(), LocalPlayer::new(7, 0));
        world
            .scoreboard
            .apply_objective(&ScoreboardObjective {
                name: "deaths".into(),
                action: ObjectiveAction::Create {
                    display_name: "Deaths".into(),
                    render_type: "integer".into(),
                },
            })
            .unwrap();
        world.chunks.insert(ChunkPos::new(0, 0), ChunkColumn::new());
        world.player.health = 3.0;

        let nether = world.replace(-1, 2, "default".into(), 1);
        assert!(nether.scoreboard.objective("deaths").is_some());
        assert_eq!(nether.loaded_chunks(), 0);
        assert!(!nether.has_sky);
        assert_eq!(nether.player.entity_id, 7);
        assert_eq!(nether.player.game_mode, 1);
        assert_eq!(nether.player.health, 20.0);
    }
}
