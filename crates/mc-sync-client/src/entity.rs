//! Local mirrors of server entities.

use std::collections::HashMap;

use mc_sync_proto::item_stack::Slot;
use mc_sync_proto::metadata::{EntityMetadata, MetadataValue};
use mc_sync_proto::types::{fixed_to_f64, BlockPos, Uuid, Vec3};

/// Mob type code of the ender dragon, the one multi-part mob.
pub const ENDER_DRAGON: u8 = 63;

/// Number of interpolation steps for a smoothed position update.
pub const INTERPOLATION_STEPS: u32 = 3;

/// Held item plus four armor pieces.
pub const EQUIPMENT_SLOTS: usize = 5;

/// An active status effect. Durations count down once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEffect {
    pub amplifier: i8,
    pub duration: i32,
    pub hide_particles: bool,
}

/// Count every effect down by one frame and drop the expired ones.
pub fn tick_effects(effects: &mut HashMap<i8, StatusEffect>) {
    effects.retain(|_, effect| {
        effect.duration = effect.duration.saturating_sub(1);
        effect.duration > 0
    });
}

/// How velocity bytes on a spawned object are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityRule {
    /// Applied as motion when the spawn data is positive.
    Motion,
    /// Applied as constant acceleration and the spawn data is cleared.
    Acceleration,
    /// Ignored.
    None,
}

/// Non-living object variants carried by the spawn-object message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Boat,
    Item,
    Minecart { variant: i32 },
    PrimedTnt,
    EnderCrystal,
    Arrow,
    Snowball,
    Egg,
    LargeFireball,
    SmallFireball,
    EnderPearl,
    WitherSkull,
    FallingBlock { block_state: u16 },
    ItemFrame { facing: i32 },
    EyeOfEnder,
    Potion { damage: i32 },
    ExpBottle,
    Firework,
    LeashKnot,
    ArmorStand,
    FishingHook { angler: i32 },
}

impl ObjectKind {
    /// Map a type code and its data word to a variant. Unknown codes yield `None`.
    pub fn from_spawn(kind: i8, data: i32) -> Option<Self> {
        let kind = match kind {
            1 => ObjectKind::Boat,
            2 => ObjectKind::Item,
            10 => ObjectKind::Minecart { variant: data },
            50 => ObjectKind::PrimedTnt,
            51 => ObjectKind::EnderCrystal,
            60 => ObjectKind::Arrow,
            61 => ObjectKind::Snowball,
            62 => ObjectKind::Egg,
            63 => ObjectKind::LargeFireball,
            64 => ObjectKind::SmallFireball,
            65 => ObjectKind::EnderPearl,
            66 => ObjectKind::WitherSkull,
            70 => ObjectKind::FallingBlock {
                block_state: (data & 0xFFFF) as u16,
            },
            71 => ObjectKind::ItemFrame { facing: data },
            72 => ObjectKind::EyeOfEnder,
            73 => ObjectKind::Potion { damage: data },
            75 => ObjectKind::ExpBottle,
            76 => ObjectKind::Firework,
            77 => ObjectKind::LeashKnot,
            78 => ObjectKind::ArmorStand,
            90 => ObjectKind::FishingHook { angler: data },
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the data word is consumed by the variant itself and must not
    /// be read as "velocity follows".
    pub fn consumes_data(&self) -> bool {
        matches!(
            self,
            ObjectKind::FishingHook { .. }
                | ObjectKind::ItemFrame { .. }
                | ObjectKind::LeashKnot
                | ObjectKind::LargeFireball
                | ObjectKind::SmallFireball
                | ObjectKind::WitherSkull
                | ObjectKind::Potion { .. }
                | ObjectKind::ExpBottle
                | ObjectKind::FallingBlock { .. }
        )
    }

    pub fn velocity_rule(&self) -> VelocityRule {
        match self {
            ObjectKind::LargeFireball | ObjectKind::SmallFireball | ObjectKind::WitherSkull => {
                VelocityRule::Acceleration
            }
            ObjectKind::Arrow
            | ObjectKind::Snowball
            | ObjectKind::Egg
            | ObjectKind::EnderPearl
            | ObjectKind::EyeOfEnder
            | ObjectKind::Firework => VelocityRule::Motion,
            _ => VelocityRule::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player { uuid: Uuid, name: Option<String> },
    Mob { mob_type: u8 },
    Object(ObjectKind),
    ExperienceOrb { count: i16 },
    Painting {
        title: String,
        location: BlockPos,
        direction: u8,
    },
    Lightning,
    /// Sub-part of a multi-part entity.
    Part { primary: i32, index: usize },
}

impl EntityKind {
    /// Living entities smooth their movement over a few frames; others move at once.
    pub fn is_living(&self) -> bool {
        matches!(self, EntityKind::Player { .. } | EntityKind::Mob { .. })
    }
}

/// Pending smoothed move toward an authoritative position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntity {
    pub id: i32,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub prev_pos: Vec3,
    /// Last authoritative position in 1/32 fixed point. Relative moves accumulate here.
    pub server_pos: [i32; 3],
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
    pub on_ground: bool,
    pub owner: Option<i32>,
    pub held_item: i16,
    /// Held item, boots, leggings, chestplate, helmet.
    pub equipment: [Slot; EQUIPMENT_SLOTS],
    pub effects: HashMap<i8, StatusEffect>,
    /// Entity this one rides.
    pub vehicle: Option<i32>,
    pub leash_holder: Option<i32>,
    pub last_status: Option<i8>,
    pub attributes: HashMap<u8, MetadataValue>,
    pub interpolation: Option<Interpolation>,
}

impl LocalEntity {
    pub fn new(id: i32, kind: EntityKind, server_pos: [i32; 3]) -> Self {
        let pos = Vec3::from_fixed(server_pos[0], server_pos[1], server_pos[2]);
        Self {
            id,
            kind,
            pos,
            prev_pos: pos,
            server_pos,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
            on_ground: false,
            owner: None,
            held_item: 0,
            equipment: Default::default(),
            effects: HashMap::new(),
            vehicle: None,
            leash_holder: None,
            last_status: None,
            attributes: HashMap::new(),
            interpolation: None,
        }
    }

    /// Authoritative position decoded from the fixed-point reference.
    pub fn server_vec(&self) -> Vec3 {
        Vec3::new(
            fixed_to_f64(self.server_pos[0]),
            fixed_to_f64(self.server_pos[1]),
            fixed_to_f64(self.server_pos[2]),
        )
    }

    /// Place the entity immediately, dropping any pending interpolation.
    pub fn snap_to(&mut self, pos: Vec3, yaw: f32, pitch: f32) {
        self.pos = pos;
        self.prev_pos = pos;
        self.yaw = yaw;
        self.pitch = pitch;
        self.interpolation = None;
    }

    /// Move toward `target`: living entities interpolate, others jump.
    pub fn move_to(&mut self, target: Vec3, yaw: f32, pitch: f32) {
        if self.kind.is_living() {
            self.interpolation = Some(Interpolation {
                target,
                yaw,
                pitch,
                steps: INTERPOLATION_STEPS,
            });
        } else {
            self.pos = target;
            self.yaw = yaw;
            self.pitch = pitch;
        }
    }

    pub fn apply_metadata(&mut self, metadata: &EntityMetadata) {
        for entry in &metadata.0 {
            self.attributes.insert(entry.index, entry.value.clone());
        }
    }

    /// Advance one simulation frame.
    pub fn tick(&mut self) {
        self.prev_pos = self.pos;
        if let Some(interp) = self.interpolation.as_mut() {
            let steps = interp.steps.max(1) as f64;
            self.pos = self.pos + (interp.target - self.pos) * (1.0 / steps);
            self.yaw += (interp.yaw - self.yaw) / steps as f32;
            self.pitch += (interp.pitch - self.pitch) / steps as f32;
            interp.steps = interp.steps.saturating_sub(1);
            if interp.steps == 0 {
                self.pos = interp.target;
                self.interpolation = None;
            }
        }
        if self.acceleration != Vec3::ZERO {
            self.velocity = self.velocity + self.acceleration;
        }
        tick_effects(&mut self.effects);
    }
}

/// Number of sub-parts a mob type spawns with.
pub fn part_count(mob_type: u8) -> usize {
    match mob_type {
        ENDER_DRAGON => 7,
        _ => 0,
    }
}
