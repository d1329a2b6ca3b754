//! Base data types and unit conversions used throughout the play protocol.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// VarInt (i32 as u32, LEB128, no ZigZag)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarInt(pub i32);

impl VarInt {
    /// A 32-bit value never needs more than five 7-bit groups.
    pub const MAX_BYTES: usize = 5;

    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        let mut value = self.0 as u32;
        let mut n = 1;
        while value & !0x7F != 0 {
            value >>= 7;
            n += 1;
        }
        n
    }

    /// Try to decode from the front of a slice without consuming it.
    ///
    /// `Ok(None)` means more bytes are needed.
    pub fn peek(buf: &[u8]) -> Result<Option<(Self, usize)>, ProtoError> {
        let mut acc: u32 = 0;
        for (shift, &group) in buf.iter().take(Self::MAX_BYTES).enumerate() {
            acc |= ((group & 0x7F) as u32) << (7 * shift);
            if group & 0x80 == 0 {
                return Ok(Some((VarInt(acc as i32), shift + 1)));
            }
        }
        if buf.len() >= Self::MAX_BYTES {
            return Err(ProtoError::VarIntTooLong);
        }
        Ok(None)
    }
}

impl ProtoEncode for VarInt {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let mut value = self.0 as u32;
        loop {
            if value & !0x7F == 0 {
                buf.put_u8(value as u8);
                return;
            }
            buf.put_u8((value & 0x7F | 0x80) as u8);
            value >>= 7;
        }
    }
}

impl ProtoDecode for VarInt {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut acc: u32 = 0;
        for shift in 0..Self::MAX_BYTES {
            ensure_remaining(buf, 1)?;
            let group = buf.get_u8();
            acc |= ((group & 0x7F) as u32) << (7 * shift);
            if group & 0x80 == 0 {
                return Ok(VarInt(acc as i32));
            }
        }
        Err(ProtoError::VarIntTooLong)
    }
}

impl From<i32> for VarInt {
    fn from(v: i32) -> Self {
        VarInt(v)
    }
}

impl From<VarInt> for i32 {
    fn from(v: VarInt) -> Self {
        v.0
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarInt({})", self.0)
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Wire units
// ---------------------------------------------------------------------------

/// Fixed-point position units per world unit.
pub const POSITION_SCALE: f64 = 32.0;

/// Velocity units per world unit per tick.
pub const VELOCITY_SCALE: f64 = 8000.0;

/// Largest speed a velocity short can carry.
pub const MAX_VELOCITY: f64 = 3.9;

/// Decode a 1/32 fixed-point coordinate.
pub fn fixed_to_f64(v: i32) -> f64 {
    v as f64 / POSITION_SCALE
}

/// Encode a coordinate as 1/32 fixed point, flooring.
pub fn f64_to_fixed(v: f64) -> i32 {
    (v * POSITION_SCALE).floor() as i32
}

/// Decode an angle byte (1/256 of a turn) into degrees.
pub fn angle_to_degrees(a: i8) -> f32 {
    a as f32 * 360.0 / 256.0
}

/// Encode degrees as an angle byte, wrapping.
pub fn degrees_to_angle(d: f32) -> i8 {
    (d * 256.0 / 360.0).floor() as i32 as i8
}

/// Decode a velocity short (1/8000 of a unit per tick).
pub fn velocity_to_f64(v: i16) -> f64 {
    v as f64 / VELOCITY_SCALE
}

/// Encode a velocity component, clamped to [`MAX_VELOCITY`].
pub fn f64_to_velocity(v: f64) -> i16 {
    (v.clamp(-MAX_VELOCITY, MAX_VELOCITY) * VELOCITY_SCALE) as i16
}

// ---------------------------------------------------------------------------
// Vec3 (f64 x, y, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_sq(&self, other: &Vec3) -> f64 {
        let d = *self - *other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Decode a fixed-point triple.
    pub fn from_fixed(x: i32, y: i32, z: i32) -> Self {
        Self::new(fixed_to_f64(x), fixed_to_f64(y), fixed_to_f64(z))
    }

    /// Decode a velocity triple.
    pub fn from_velocity(x: i16, y: i16, z: i16) -> Self {
        Self::new(velocity_to_f64(x), velocity_to_f64(y), velocity_to_f64(z))
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Uuid (two big-endian u64)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uuid {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl Uuid {
    pub const ZERO: Self = Self {
        most_significant: 0,
        least_significant: 0,
    };

    pub fn new(most: u64, least: u64) -> Self {
        Self {
            most_significant: most,
            least_significant: least,
        }
    }
}

impl ProtoEncode for Uuid {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.most_significant);
        buf.put_u64(self.least_significant);
    }
}

impl ProtoDecode for Uuid {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 16)?;
        Ok(Self {
            most_significant: buf.get_u64(),
            least_significant: buf.get_u64(),
        })
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.most_significant;
        let l = self.least_significant;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            m >> 32,
            (m >> 16) & 0xFFFF,
            m & 0xFFFF,
            l >> 48,
            l & 0xFFFF_FFFF_FFFF
        )
    }
}

// ---------------------------------------------------------------------------
// BlockPos (packed 26/12/26 bit long)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert to the chunk position that contains this block.
    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.x >> 4, self.z >> 4)
    }

    /// Floor a floating-point position.
    pub fn from_vec3(v: &Vec3) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    pub fn to_packed(&self) -> i64 {
        ((self.x as i64 & 0x3FF_FFFF) << 38)
            | ((self.y as i64 & 0xFFF) << 26)
            | (self.z as i64 & 0x3FF_FFFF)
    }

    pub fn from_packed(v: i64) -> Self {
        Self {
            x: (v >> 38) as i32,
            y: ((v << 26) >> 52) as i32,
            z: ((v << 38) >> 38) as i32,
        }
    }
}

/// Wire format: one big-endian i64, x:26 | y:12 | z:26.
impl ProtoEncode for BlockPos {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i64(self.to_packed());
    }
}

impl ProtoDecode for BlockPos {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        Ok(Self::from_packed(buf.get_i64()))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// ChunkPos (i32 x, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn varint_bytes(v: i32) -> Vec<u8> {
        let mut buf = BytesMut::new();
        VarInt(v).proto_encode(&mut buf);
        buf.to_vec()
    }

    // -- VarInt --

    #[test]
    fn varint_known_encodings() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(1), vec![0x01]);
        assert_eq!(varint_bytes(127), vec![0x7F]);
        assert_eq!(varint_bytes(128), vec![0x80, 0x01]);
        assert_eq!(varint_bytes(25565), vec![0xDD, 0xC7, 0x01]);
        assert_eq!(varint_bytes(-1), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(varint_bytes(i32::MIN), vec![0x80, 0x80, 0x80, 0x80, 0x08]);
    }

    #[test]
    fn varint_decode_negative() {
        let mut data = &[0xFFu8, 0xFF, 0xFF, 0xFF, 0x0F][..];
        assert_eq!(VarInt::proto_decode(&mut data).unwrap().0, -1);
    }

    #[test]
    fn varint_encoded_len_matches() {
        for v in [0, 127, 128, 16383, 16384, i32::MAX, -1] {
            assert_eq!(VarInt(v).encoded_len(), varint_bytes(v).len(), "{v}");
        }
    }

    #[test]
    fn varint_too_long() {
        let mut data = &[0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01][..];
        assert!(matches!(
            VarInt::proto_decode(&mut data),
            Err(ProtoError::VarIntTooLong)
        ));
        assert!(matches!(
            VarInt::peek(&[0x80, 0x80, 0x80, 0x80, 0x80]),
            Err(ProtoError::VarIntTooLong)
        ));
    }

    #[test]
    fn varint_peek_incomplete() {
        assert!(VarInt::peek(&[0x80]).unwrap().is_none());
        assert_eq!(
            VarInt::peek(&[0xAC, 0x02, 0xFF]).unwrap(),
            Some((VarInt(300), 2))
        );
    }

    // -- Units --

    #[test]
    fn fixed_point_within_one_unit() {
        for p in [0.0, 1.0, -1.0, 12.34, -56.789, 30_000_000.5, 0.015625] {
            let decoded = fixed_to_f64(f64_to_fixed(p));
            assert!((decoded - p).abs() < 1.0 / 32.0, "{p} -> {decoded}");
        }
    }

    #[test]
    fn exact_scale_factors() {
        assert_eq!(fixed_to_f64(32), 1.0);
        assert_eq!(fixed_to_f64(-16), -0.5);
        assert_eq!(velocity_to_f64(800), 0.1);
        assert_eq!(velocity_to_f64(8000), 1.0);
        assert_eq!(angle_to_degrees(64), 90.0);
        assert_eq!(angle_to_degrees(-128), -180.0);
    }

    #[test]
    fn angle_encoding_wraps() {
        assert_eq!(degrees_to_angle(90.0), 64);
        assert_eq!(degrees_to_angle(180.0), -128);
        assert_eq!(degrees_to_angle(360.0), 0);
        assert_eq!(degrees_to_angle(-90.0), -64);
    }

    #[test]
    fn velocity_is_clamped() {
        assert!((31199..=31200).contains(&f64_to_velocity(10.0)));
        assert!((-31200..=-31199).contains(&f64_to_velocity(-10.0)));
        assert_eq!(f64_to_velocity(0.1), 800);
    }

    // -- Uuid --

    #[test]
    fn uuid_roundtrip_and_display() {
        let u = Uuid::new(0x0123456789ABCDEF, 0xFEDCBA9876543210);
        let mut buf = BytesMut::new();
        u.proto_encode(&mut buf);
        assert_eq!(buf[0], 0x01);
        assert_eq!(Uuid::proto_decode(&mut buf.freeze()).unwrap(), u);
        assert_eq!(u.to_string(), "01234567-89ab-cdef-fedc-ba9876543210");
    }

    // -- BlockPos --

    #[test]
    fn block_pos_packing() {
        for pos in [
            BlockPos::new(0, 0, 0),
            BlockPos::new(100, 64, -200),
            BlockPos::new(-33_554_432, 4095 - 4096, 33_554_431),
            BlockPos::new(-1, 255, -1),
        ] {
            assert_eq!(BlockPos::from_packed(pos.to_packed()), pos);
        }
    }

    #[test]
    fn block_pos_known_packing() {
        assert_eq!(BlockPos::new(1, 0, 0).to_packed(), 1 << 38);
        assert_eq!(BlockPos::new(0, 1, 0).to_packed(), 1 << 26);
        assert_eq!(BlockPos::new(0, 0, 1).to_packed(), 1);
    }

    #[test]
    fn block_pos_chunk() {
        assert_eq!(BlockPos::new(15, 64, 15).chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(16, 64, -1).chunk_pos(), ChunkPos::new(1, -1));
        assert_eq!(
            BlockPos::new(-17, 64, -16).chunk_pos(),
            ChunkPos::new(-2, -1)
        );
    }
}
