//! Dimensions hosted by the server, and the flat demo world.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use mc_sync_proto::packets::{
    BlockChange, ChunkData, ClientboundPacket, JoinGame, PlayerPosLook, ServerboundPacket,
    SpawnPosition, TimeUpdate,
};
use mc_sync_proto::types::{BlockPos, ChunkPos, Uuid, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::SimulationError;
use crate::network::{ConnId, Outbox};
use crate::persistence::{EntitySnapshot, WorldSnapshot};
use crate::tracker::{EntityTracker, TrackedEntity, TrackedKind, Viewer};

pub const DAY_LENGTH: i64 = 24_000;

/// Shared source of network entity ids, unique across all dimensions.
#[derive(Debug, Clone)]
pub struct EntityIds(Arc<AtomicI32>);

impl Default for EntityIds {
    fn default() -> Self {
        Self(Arc::new(AtomicI32::new(1)))
    }
}

impl EntityIds {
    pub fn next(&self) -> i32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// One simulated dimension. Every method runs on the simulation thread.
pub trait Dimension: Send {
    fn id(&self) -> i32;
    fn name(&self) -> &str;

    /// Advance time and run scheduled block updates.
    fn tick(&mut self, tick: u64, outbox: &mut Outbox) -> Result<(), SimulationError>;

    fn update_entities(&mut self, outbox: &mut Outbox) -> Result<(), SimulationError>;

    /// Reconcile what each client sees with current entity state.
    fn track(&mut self, outbox: &mut Outbox);

    /// `(world_age, time_of_day)`.
    fn time(&self) -> (i64, i64);

    fn snapshot(&self, tick: u64) -> WorldSnapshot;

    fn players(&self) -> Vec<ConnId> {
        Vec::new()
    }

    /// True only when at least one player is present and all of them sleep.
    fn all_players_asleep(&self) -> bool {
        false
    }

    fn add_player(&mut self, _conn: ConnId, _entity_id: i32, _outbox: &mut Outbox) {}

    fn remove_player(&mut self, _conn: ConnId) {}

    fn handle_packet(&mut self, _conn: ConnId, _packet: &ServerboundPacket, _outbox: &mut Outbox) {}

    /// Returns false if the player is not in this dimension.
    fn set_sleeping(&mut self, _conn: ConnId, _sleeping: bool) -> bool {
        false
    }

    /// Queue a block change to apply `delay` ticks from now.
    fn schedule_block(&mut self, _pos: BlockPos, _block_state: i32, _delay: u64) -> bool {
        false
    }
}

const BEDROCK: u16 = 7 << 4;
const DIRT: u16 = 3 << 4;
const GRASS: u16 = 2 << 4;
const PLAINS: u8 = 1;
const SURFACE_Y: usize = 3;

/// Column payload for a flat chunk: one section of bedrock, dirt and grass.
fn flat_chunk(has_sky: bool) -> Bytes {
    let mut data = BytesMut::with_capacity(4096 * 2 + 2048 * 2 + 256);
    for y in 0..16usize {
        let state = match y {
            0 => BEDROCK,
            1..SURFACE_Y => DIRT,
            SURFACE_Y => GRASS,
            _ => 0,
        };
        for _ in 0..256 {
            data.put_u16_le(state);
        }
    }
    data.put_bytes(0, 2048);
    if has_sky {
        data.put_bytes(0xFF, 2048);
    }
    data.put_bytes(PLAINS, 256);
    data.freeze()
}

#[derive(Debug)]
struct Player {
    entity_id: i32,
    uuid: Uuid,
    pos: Vec3,
    yaw: f32,
    pitch: f32,
    on_ground: bool,
    sleeping: bool,
    chunks: HashSet<ChunkPos>,
}

#[derive(Debug)]
struct Mob {
    entity_id: i32,
    kind: u8,
    pos: Vec3,
    yaw: f32,
    target: Vec3,
}

/// Blocks per tick a wandering mob covers.
const MOB_SPEED: f64 = 0.1;
const WANDER_RADIUS: f64 = 12.0;
const INITIAL_MOBS: usize = 4;
/// Pig, sheep, cow, chicken.
const MOB_KINDS: [u8; 4] = [90, 91, 92, 93];

pub struct FlatWorld {
    id: i32,
    name: String,
    spawn: BlockPos,
    view_distance: i32,
    world_age: i64,
    time_of_day: i64,
    players: HashMap<ConnId, Player>,
    mobs: Vec<Mob>,
    scheduled: BTreeMap<u64, Vec<(BlockPos, i32)>>,
    current_tick: u64,
    tracker: EntityTracker,
    chunk: Bytes,
    rng: StdRng,
    ids: EntityIds,
}

impl FlatWorld {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        spawn: BlockPos,
        view_distance: i32,
        seed: u64,
        ids: EntityIds,
    ) -> Self {
        let mut world = Self {
            id,
            name: name.into(),
            spawn,
            view_distance: view_distance.max(1),
            world_age: 0,
            time_of_day: 0,
            players: HashMap::new(),
            mobs: Vec::new(),
            scheduled: BTreeMap::new(),
            current_tick: 0,
            tracker: EntityTracker::default(),
            chunk: flat_chunk(id == 0),
            rng: StdRng::seed_from_u64(seed),
            ids,
        };
        for i in 0..INITIAL_MOBS {
            let pos = world.random_near_spawn();
            world.spawn_mob(MOB_KINDS[i % MOB_KINDS.len()], pos, 0.0);
        }
        world
    }

    /// Adopt time and mobs from a saved snapshot. Mobs get fresh entity ids.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) {
        self.world_age = snapshot.world_age;
        self.time_of_day = snapshot.time_of_day;
        self.spawn = snapshot.spawn;
        self.mobs.clear();
        for entity in &snapshot.entities {
            self.spawn_mob(entity.kind, entity.position, entity.yaw);
        }
        info!(
            "Restored {} at age {} with {} mob(s)",
            self.name,
            self.world_age,
            self.mobs.len()
        );
    }

    pub fn mob_count(&self) -> usize {
        self.mobs.len()
    }

    pub fn player_position(&self, conn: ConnId) -> Option<Vec3> {
        self.players.get(&conn).map(|p| p.pos)
    }

    fn spawn_mob(&mut self, kind: u8, pos: Vec3, yaw: f32) {
        self.mobs.push(Mob {
            entity_id: self.ids.next(),
            kind,
            pos,
            yaw,
            target: pos,
        });
    }

    fn random_near_spawn(&mut self) -> Vec3 {
        Vec3::new(
            self.spawn.x as f64 + self.rng.gen_range(-WANDER_RADIUS..WANDER_RADIUS),
            (SURFACE_Y + 1) as f64,
            self.spawn.z as f64 + self.rng.gen_range(-WANDER_RADIUS..WANDER_RADIUS),
        )
    }

    fn spawn_point(&self) -> Vec3 {
        Vec3::new(
            self.spawn.x as f64 + 0.5,
            self.spawn.y as f64,
            self.spawn.z as f64 + 0.5,
        )
    }

    /// Send columns that came into view and unload those that left it.
    fn refresh_chunks(&mut self, conn: ConnId, outbox: &mut Outbox) {
        let Some(player) = self.players.get_mut(&conn) else {
            return;
        };
        let center = BlockPos::from_vec3(&player.pos).chunk_pos();
        let r = self.view_distance;
        let wanted: HashSet<ChunkPos> = (-r..=r)
            .flat_map(|dx| (-r..=r).map(move |dz| ChunkPos::new(center.x + dx, center.z + dz)))
            .collect();

        let mut stale: Vec<ChunkPos> = player.chunks.difference(&wanted).copied().collect();
        stale.sort();
        for pos in stale {
            player.chunks.remove(&pos);
            outbox.push(conn, ClientboundPacket::ChunkData(ChunkData::unload(pos)));
        }
        let mut fresh: Vec<ChunkPos> = wanted.difference(&player.chunks).copied().collect();
        fresh.sort();
        for pos in fresh {
            player.chunks.insert(pos);
            outbox.push(
                conn,
                ClientboundPacket::ChunkData(ChunkData {
                    chunk_x: pos.x,
                    chunk_z: pos.z,
                    ground_up: true,
                    section_mask: 1,
                    data: self.chunk.clone(),
                }),
            );
        }
    }

    fn viewers_of(&self, chunk: ChunkPos) -> impl Iterator<Item = ConnId> + '_ {
        self.players
            .iter()
            .filter(move |(_, p)| p.chunks.contains(&chunk))
            .map(|(conn, _)| *conn)
    }
}

impl Dimension for FlatWorld {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, tick: u64, outbox: &mut Outbox) -> Result<(), SimulationError> {
        self.current_tick = tick;
        if self.all_players_asleep() {
            let morning = (self.time_of_day / DAY_LENGTH + 1) * DAY_LENGTH;
            info!("Everyone in {} is asleep, skipping to morning", self.name);
            self.time_of_day = morning;
            for player in self.players.values_mut() {
                player.sleeping = false;
            }
        }
        self.world_age += 1;
        self.time_of_day += 1;

        let due: Vec<u64> = self.scheduled.range(..=tick).map(|(t, _)| *t).collect();
        for at in due {
            for (pos, block_state) in self.scheduled.remove(&at).unwrap_or_default() {
                if !(0..256).contains(&pos.y) {
                    return Err(SimulationError::new(format!(
                        "scheduled update outside the world at {pos:?}"
                    )));
                }
                let packet = ClientboundPacket::BlockChange(BlockChange {
                    location: pos,
                    block_state,
                });
                let conns: Vec<ConnId> = self.viewers_of(pos.chunk_pos()).collect();
                outbox.broadcast(conns, &packet);
            }
        }
        Ok(())
    }

    fn update_entities(&mut self, _outbox: &mut Outbox) -> Result<(), SimulationError> {
        for i in 0..self.mobs.len() {
            let (pos, target) = (self.mobs[i].pos, self.mobs[i].target);
            let (dx, dz) = (target.x - pos.x, target.z - pos.z);
            let dist = (dx * dx + dz * dz).sqrt();
            if dist < MOB_SPEED {
                if self.rng.gen_ratio(1, 20) {
                    let next = self.random_near_spawn();
                    self.mobs[i].target = next;
                }
                continue;
            }
            let mob = &mut self.mobs[i];
            mob.pos = Vec3::new(
                pos.x + dx / dist * MOB_SPEED,
                pos.y,
                pos.z + dz / dist * MOB_SPEED,
            );
            mob.yaw = (-dx.atan2(dz).to_degrees()) as f32;
            if !(mob.pos.x.is_finite() && mob.pos.z.is_finite()) {
                return Err(SimulationError::new(format!(
                    "mob {} left the world",
                    mob.entity_id
                )));
            }
        }
        Ok(())
    }

    fn track(&mut self, outbox: &mut Outbox) {
        let mut entities: Vec<TrackedEntity> = self
            .players
            .values()
            .map(|p| TrackedEntity {
                entity_id: p.entity_id,
                kind: TrackedKind::Player { uuid: p.uuid },
                pos: p.pos,
                yaw: p.yaw,
                pitch: p.pitch,
                head_yaw: p.yaw,
                on_ground: p.on_ground,
            })
            .collect();
        entities.extend(self.mobs.iter().map(|m| TrackedEntity {
            entity_id: m.entity_id,
            kind: TrackedKind::Mob { kind: m.kind },
            pos: m.pos,
            yaw: m.yaw,
            pitch: 0.0,
            head_yaw: m.yaw,
            on_ground: true,
        }));
        let viewers: Vec<Viewer> = self
            .players
            .iter()
            .map(|(conn, p)| Viewer {
                conn: *conn,
                entity_id: p.entity_id,
                pos: p.pos,
            })
            .collect();
        self.tracker.update(&entities, &viewers, outbox);
    }

    fn time(&self) -> (i64, i64) {
        (self.world_age, self.time_of_day)
    }

    fn snapshot(&self, tick: u64) -> WorldSnapshot {
        WorldSnapshot {
            name: self.name.clone(),
            dimension: self.id,
            tick,
            world_age: self.world_age,
            time_of_day: self.time_of_day,
            spawn: self.spawn,
            entities: self
                .mobs
                .iter()
                .map(|m| EntitySnapshot {
                    kind: m.kind,
                    position: m.pos,
                    yaw: m.yaw,
                })
                .collect(),
        }
    }

    fn players(&self) -> Vec<ConnId> {
        let mut conns: Vec<ConnId> = self.players.keys().copied().collect();
        conns.sort_unstable();
        conns
    }

    fn all_players_asleep(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.sleeping)
    }

    fn add_player(&mut self, conn: ConnId, entity_id: i32, outbox: &mut Outbox) {
        let pos = self.spawn_point();
        self.players.insert(
            conn,
            Player {
                entity_id,
                uuid: Uuid::new(self.rng.gen(), self.rng.gen()),
                pos,
                yaw: 0.0,
                pitch: 0.0,
                on_ground: true,
                sleeping: false,
                chunks: HashSet::new(),
            },
        );
        outbox.push(
            conn,
            ClientboundPacket::JoinGame(JoinGame {
                entity_id,
                game_mode: 1,
                dimension: self.id as i8,
                difficulty: 1,
                max_players: 20,
                level_type: "flat".into(),
                reduced_debug_info: false,
            }),
        );
        outbox.push(
            conn,
            ClientboundPacket::SpawnPosition(SpawnPosition {
                location: self.spawn,
            }),
        );
        outbox.push(
            conn,
            ClientboundPacket::TimeUpdate(TimeUpdate {
                world_age: self.world_age,
                time_of_day: self.time_of_day,
            }),
        );
        self.refresh_chunks(conn, outbox);
        outbox.push(
            conn,
            ClientboundPacket::PlayerPosLook(PlayerPosLook {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                yaw: 0.0,
                pitch: 0.0,
                flags: 0,
            }),
        );
        info!("Player {conn} joined {} as entity {entity_id}", self.name);
    }

    fn remove_player(&mut self, conn: ConnId) {
        if self.players.remove(&conn).is_some() {
            self.tracker.remove_viewer(conn);
            info!("Player {conn} left {}", self.name);
        }
    }

    fn handle_packet(&mut self, conn: ConnId, packet: &ServerboundPacket, outbox: &mut Outbox) {
        let ServerboundPacket::PlayerPosLook(look) = packet else {
            return;
        };
        let Some(player) = self.players.get_mut(&conn) else {
            return;
        };
        let old_chunk = BlockPos::from_vec3(&player.pos).chunk_pos();
        player.pos = Vec3::new(look.x, look.y, look.z);
        player.yaw = look.yaw;
        player.pitch = look.pitch;
        player.on_ground = look.on_ground;
        if BlockPos::from_vec3(&player.pos).chunk_pos() != old_chunk {
            debug!("Player {conn} crossed into a new chunk");
            self.refresh_chunks(conn, outbox);
        }
    }

    fn set_sleeping(&mut self, conn: ConnId, sleeping: bool) -> bool {
        match self.players.get_mut(&conn) {
            Some(player) => {
                player.sleeping = sleeping;
                true
            }
            None => false,
        }
    }

    fn schedule_block(&mut self, pos: BlockPos, block_state: i32, delay: u64) -> bool {
        let at = self.current_tick + delay.max(1);
        self.scheduled.entry(at).or_default().push((pos, block_state));
        true
    }
}
