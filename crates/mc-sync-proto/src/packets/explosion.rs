//! Explosion (0x27): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::BlockPos;

#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    /// Destroyed blocks as offsets from the center, truncated to block coordinates.
    pub records: Vec<[i8; 3]>,
    /// Knockback added to the local player's velocity.
    pub player_motion: [f32; 3],
}

impl Explosion {
    /// Absolute positions of the destroyed blocks.
    pub fn affected_blocks(&self) -> impl Iterator<Item = BlockPos> + '_ {
        let (cx, cy, cz) = (self.x as i32, self.y as i32, self.z as i32);
        self.records.iter().map(move |[dx, dy, dz]| {
            BlockPos::new(cx + *dx as i32, cy + *dy as i32, cz + *dz as i32)
        })
    }
}

impl ProtoEncode for Explosion {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f32(self.x);
        buf.put_f32(self.y);
        buf.put_f32(self.z);
        buf.put_f32(self.radius);
        buf.put_i32(self.records.len() as i32);
        for record in &self.records {
            record.iter().for_each(|v| buf.put_i8(*v));
        }
        self.player_motion.iter().for_each(|v| buf.put_f32(*v));
    }
}

impl ProtoDecode for Explosion {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 20)?;
        let (x, y, z) = (buf.get_f32(), buf.get_f32(), buf.get_f32());
        let radius = buf.get_f32();
        let count = buf.get_i32();
        let count = usize::try_from(count)
            .map_err(|_| ProtoError::InvalidData(format!("negative record count {count}")))?;
        ensure_remaining(buf, count.saturating_mul(3))?;
        let records = (0..count)
            .map(|_| [buf.get_i8(), buf.get_i8(), buf.get_i8()])
            .collect();
        ensure_remaining(buf, 12)?;
        Ok(Self {
            x,
            y,
            z,
            radius,
            records,
            player_motion: [buf.get_f32(), buf.get_f32(), buf.get_f32()],
        })
    }
}
