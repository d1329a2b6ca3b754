//! Per-dimension entity tracker: decides which clients see which entities
//! and turns state changes into spawn, move, teleport and destroy packets.

use std::collections::{HashMap, HashSet};

use mc_sync_proto::metadata::EntityMetadata;
use mc_sync_proto::packets::{
    ClientboundPacket, DestroyEntities, EntityHeadLook, EntityMove, EntityTeleport, SpawnMob,
    SpawnPlayer,
};
use mc_sync_proto::types::{degrees_to_angle, f64_to_fixed, Uuid, Vec3};

use crate::network::{ConnId, Outbox};

/// Horizontal distance (blocks) within which a client sees an entity.
pub const TRACKING_RANGE: f64 = 80.0;

/// An absolute position is sent at least this often, to bound drift.
pub const FORCE_TELEPORT_INTERVAL: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackedKind {
    Player { uuid: Uuid },
    Mob { kind: u8 },
}

/// Current state of one entity, as reported by its dimension each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    pub entity_id: i32,
    pub kind: TrackedKind,
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub conn: ConnId,
    /// The viewer's own entity, which it never receives spawns for.
    pub entity_id: i32,
    pub pos: Vec3,
}

#[derive(Debug)]
struct Entry {
    kind: TrackedKind,
    fixed: [i32; 3],
    yaw: i8,
    pitch: i8,
    head_yaw: i8,
    since_teleport: u64,
    viewers: HashSet<ConnId>,
}

fn fixed(pos: &Vec3) -> [i32; 3] {
    [f64_to_fixed(pos.x), f64_to_fixed(pos.y), f64_to_fixed(pos.z)]
}

impl Entry {
    fn new(entity: &TrackedEntity) -> Self {
        Self {
            kind: entity.kind,
            fixed: fixed(&entity.pos),
            yaw: degrees_to_angle(entity.yaw),
            pitch: degrees_to_angle(entity.pitch),
            head_yaw: degrees_to_angle(entity.head_yaw),
            since_teleport: 0,
            viewers: HashSet::new(),
        }
    }

    /// Packets that bring current viewers from the last sent state to `entity`.
    fn sync(&mut self, entity: &TrackedEntity) -> Vec<ClientboundPacket> {
        let mut packets = Vec::new();
        let target = fixed(&entity.pos);
        let yaw = degrees_to_angle(entity.yaw);
        let pitch = degrees_to_angle(entity.pitch);
        let head_yaw = degrees_to_angle(entity.head_yaw);

        let delta = [
            target[0] - self.fixed[0],
            target[1] - self.fixed[1],
            target[2] - self.fixed[2],
        ];
        let moved = delta != [0; 3];
        let rotated = yaw != self.yaw || pitch != self.pitch;
        let fits = delta.iter().all(|d| i8::try_from(*d).is_ok());
        self.since_teleport += 1;

        if self.since_teleport >= FORCE_TELEPORT_INTERVAL || (moved && !fits) {
            packets.push(ClientboundPacket::EntityTeleport(EntityTeleport {
                entity_id: entity.entity_id,
                x: target[0],
                y: target[1],
                z: target[2],
                yaw,
                pitch,
                on_ground: entity.on_ground,
            }));
            self.since_teleport = 0;
        } else if moved || rotated {
            packets.push(ClientboundPacket::EntityMove(EntityMove {
                entity_id: entity.entity_id,
                delta: moved.then(|| delta.map(|d| d as i8)),
                rotation: rotated.then_some((yaw, pitch)),
                on_ground: entity.on_ground,
            }));
        }
        if head_yaw != self.head_yaw {
            packets.push(ClientboundPacket::EntityHeadLook(EntityHeadLook {
                entity_id: entity.entity_id,
                head_yaw,
            }));
        }

        self.fixed = target;
        self.yaw = yaw;
        self.pitch = pitch;
        self.head_yaw = head_yaw;
        packets
    }

    fn spawn_packets(&self, entity_id: i32) -> Vec<ClientboundPacket> {
        let [x, y, z] = self.fixed;
        let spawn = match self.kind {
            TrackedKind::Player { uuid } => ClientboundPacket::SpawnPlayer(SpawnPlayer {
                entity_id,
                uuid,
                x,
                y,
                z,
                yaw: self.yaw,
                pitch: self.pitch,
                current_item: 0,
                metadata: EntityMetadata::new(),
            }),
            TrackedKind::Mob { kind } => ClientboundPacket::SpawnMob(SpawnMob {
                entity_id,
                kind,
                x,
                y,
                z,
                yaw: self.yaw,
                pitch: self.pitch,
                head_pitch: self.head_yaw,
                velocity: [0; 3],
                metadata: EntityMetadata::new(),
            }),
        };
        vec![
            spawn,
            ClientboundPacket::EntityHeadLook(EntityHeadLook {
                entity_id,
                head_yaw: self.head_yaw,
            }),
        ]
    }
}

fn destroy(entity_id: i32) -> ClientboundPacket {
    ClientboundPacket::DestroyEntities(DestroyEntities {
        entity_ids: vec![entity_id],
    })
}

#[derive(Debug)]
pub struct EntityTracker {
    range: f64,
    entries: HashMap<i32, Entry>,
}

impl Default for EntityTracker {
    fn default() -> Self {
        Self::new(TRACKING_RANGE)
    }
}

impl EntityTracker {
    pub fn new(range: f64) -> Self {
        Self {
            range,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `conn` currently has `entity_id` spawned.
    pub fn is_visible(&self, entity_id: i32, conn: ConnId) -> bool {
        self.entries
            .get(&entity_id)
            .is_some_and(|e| e.viewers.contains(&conn))
    }

    /// Forget a connection without sending it anything.
    pub fn remove_viewer(&mut self, conn: ConnId) {
        for entry in self.entries.values_mut() {
            entry.viewers.remove(&conn);
        }
    }

    /// Reconcile against the dimension's current entities and viewers.
    ///
    /// Entities no longer listed are destroyed for everyone who saw them.
    /// Movement goes out before visibility changes, so a client that just
    /// started tracking an entity gets only its spawn this tick.
    pub fn update(&mut self, entities: &[TrackedEntity], viewers: &[Viewer], outbox: &mut Outbox) {
        let live: HashSet<i32> = entities.iter().map(|e| e.entity_id).collect();
        let connected: HashSet<ConnId> = viewers.iter().map(|v| v.conn).collect();

        let gone: Vec<i32> = self
            .entries
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(entry) = self.entries.remove(&id) {
                let packet = destroy(id);
                outbox.broadcast(
                    entry.viewers.into_iter().filter(|c| connected.contains(c)),
                    &packet,
                );
            }
        }

        for entity in entities {
            let entry = self
                .entries
                .entry(entity.entity_id)
                .or_insert_with(|| Entry::new(entity));
            entry.viewers.retain(|c| connected.contains(c));

            for packet in entry.sync(entity) {
                outbox.broadcast(entry.viewers.iter().copied(), &packet);
            }

            for viewer in viewers {
                if viewer.entity_id == entity.entity_id {
                    continue;
                }
                let in_range = (viewer.pos.x - entity.pos.x).abs() <= self.range
                    && (viewer.pos.z - entity.pos.z).abs() <= self.range;
                let tracked = entry.viewers.contains(&viewer.conn);
                if in_range && !tracked {
                    entry.viewers.insert(viewer.conn);
                    for packet in entry.spawn_packets(entity.entity_id) {
                        outbox.push(viewer.conn, packet);
                    }
                } else if !in_range && tracked {
                    entry.viewers.remove(&viewer.conn);
                    outbox.push(viewer.conn, destroy(entity.entity_id));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mob(x: f64) -> TrackedEntity {
        TrackedEntity {
            entity_id: 10,
            kind: TrackedKind::Mob { kind: 90 },
            pos: Vec3::new(x, 4.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
            on_ground: true,
        }
    }

    fn viewer(x: f64) -> Viewer {
        Viewer {
            conn: 1,
            entity_id: 1,
            pos: Vec3::new(x, 4.0, 0.0),
        }
    }

    fn packets(outbox: &mut Outbox) -> Vec<ClientboundPacket> {
        outbox.take().into_iter().map(|o| o.packet).collect()
    }

    #[test]
    fn spawns_in_range_and_destroys_out_of_range() {
        let mut tracker = EntityTracker::new(16.0);
        let mut outbox = Outbox::new();

        tracker.update(&[mob(0.0)], &[viewer(40.0)], &mut outbox);
        assert!(outbox.is_empty());

        tracker.update(&[mob(0.0)], &[viewer(10.0)], &mut outbox);
        let sent = packets(&mut outbox);
        assert!(matches!(sent[0], ClientboundPacket::SpawnMob(ref m) if m.entity_id == 10 && m.kind == 90 && m.x == 0));
        assert!(tracker.is_visible(10, 1));

        tracker.update(&[mob(0.0)], &[viewer(40.0)], &mut outbox);
        assert_eq!(packets(&mut outbox), vec![destroy(10)]);
        assert!(!tracker.is_visible(10, 1));
    }

    #[test]
    fn small_moves_are_relative_large_moves_teleport() {
        let mut tracker = EntityTracker::new(64.0);
        let mut outbox = Outbox::new();
        tracker.update(&[mob(0.0)], &[viewer(0.0)], &mut outbox);
        outbox.take();

        tracker.update(&[mob(0.5)], &[viewer(0.0)], &mut outbox);
        assert_eq!(
            packets(&mut outbox),
            vec![ClientboundPacket::EntityMove(EntityMove {
                entity_id: 10,
                delta: Some([16, 0, 0]),
                rotation: None,
                on_ground: true,
            })]
        );

        // 4 blocks is 128 fixed units, one past what a byte holds.
        tracker.update(&[mob(4.5)], &[viewer(0.0)], &mut outbox);
        let sent = packets(&mut outbox);
        assert!(matches!(sent[0], ClientboundPacket::EntityTeleport(ref t) if t.x == 144));
    }

    #[test]
    fn periodic_teleport_and_head_look() {
        let mut tracker = EntityTracker::new(64.0);
        let mut outbox = Outbox::new();
        let mut entity = mob(0.0);
        tracker.update(&[entity.clone()], &[viewer(0.0)], &mut outbox);
        outbox.take();

        for _ in 2..FORCE_TELEPORT_INTERVAL {
            tracker.update(&[entity.clone()], &[viewer(0.0)], &mut outbox);
        }
        assert!(outbox.is_empty());
        tracker.update(&[entity.clone()], &[viewer(0.0)], &mut outbox);
        assert!(matches!(packets(&mut outbox)[..], [ClientboundPacket::EntityTeleport(_)]));

        entity.head_yaw = 90.0;
        tracker.update(&[entity], &[viewer(0.0)], &mut outbox);
        assert_eq!(
            packets(&mut outbox),
            vec![ClientboundPacket::EntityHeadLook(EntityHeadLook {
                entity_id: 10,
                head_yaw: degrees_to_angle(90.0),
            })]
        );
    }

    #[test]
    fn removed_entities_are_destroyed_and_viewers_skip_themselves() {
        let mut tracker = EntityTracker::new(64.0);
        let mut outbox = Outbox::new();
        let me = TrackedEntity {
            entity_id: 1,
            kind: TrackedKind::Player {
                uuid: Uuid::new(1, 2),
            },
            ..mob(0.0)
        };
        tracker.update(&[me.clone(), mob(1.0)], &[viewer(0.0)], &mut outbox);
        assert!(!tracker.is_visible(1, 1));
        assert!(tracker.is_visible(10, 1));
        outbox.take();

        tracker.update(&[me], &[viewer(0.0)], &mut outbox);
        assert_eq!(packets(&mut outbox), vec![destroy(10)]);
        assert_eq!(tracker.len(), 1);
    }
}
