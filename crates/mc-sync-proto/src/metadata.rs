//! Watched entity attributes (entity metadata).
//!
//! Each entry starts with a header byte `type << 5 | index`; the list ends with `0x7F`.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::Slot;
use crate::types::BlockPos;

const END_OF_METADATA: u8 = 0x7F;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
    Slot(Slot),
    /// Three plain ints, not the packed form.
    Position(BlockPos),
    Rotation(f32, f32, f32),
}

impl MetadataValue {
    pub fn type_id(&self) -> u8 {
        match self {
            MetadataValue::Byte(_) => 0,
            MetadataValue::Short(_) => 1,
            MetadataValue::Int(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
            MetadataValue::Slot(_) => 5,
            MetadataValue::Position(_) => 6,
            MetadataValue::Rotation(..) => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// 0..=31
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }
}

/// An ordered list of watched attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata(pub Vec<MetadataEntry>);

impl EntityMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, index: u8, value: MetadataValue) -> Self {
        self.0.push(MetadataEntry::new(index, value));
        self
    }

    pub fn get(&self, index: u8) -> Option<&MetadataValue> {
        self.0.iter().find(|e| e.index == index).map(|e| &e.value)
    }
}

impl ProtoEncode for EntityMetadata {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        for entry in &self.0 {
            buf.put_u8((entry.value.type_id() << 5) | (entry.index & 0x1F));
            match &entry.value {
                MetadataValue::Byte(v) => buf.put_i8(*v),
                MetadataValue::Short(v) => buf.put_i16(*v),
                MetadataValue::Int(v) => buf.put_i32(*v),
                MetadataValue::Float(v) => buf.put_f32(*v),
                MetadataValue::String(v) => write_string(buf, v),
                MetadataValue::Slot(v) => v.proto_encode(buf),
                MetadataValue::Position(p) => {
                    buf.put_i32(p.x);
                    buf.put_i32(p.y);
                    buf.put_i32(p.z);
                }
                MetadataValue::Rotation(x, y, z) => {
                    buf.put_f32(*x);
                    buf.put_f32(*y);
                    buf.put_f32(*z);
                }
            }
        }
        buf.put_u8(END_OF_METADATA);
    }
}

impl ProtoDecode for EntityMetadata {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut entries = Vec::new();
        loop {
            ensure_remaining(buf, 1)?;
            let header = buf.get_u8();
            if header == END_OF_METADATA {
                break;
            }
            let index = header & 0x1F;
            let value = match header >> 5 {
                0 => {
                    ensure_remaining(buf, 1)?;
                    MetadataValue::Byte(buf.get_i8())
                }
                1 => {
                    ensure_remaining(buf, 2)?;
                    MetadataValue::Short(buf.get_i16())
                }
                2 => {
                    ensure_remaining(buf, 4)?;
                    MetadataValue::Int(buf.get_i32())
                }
                3 => {
                    ensure_remaining(buf, 4)?;
                    MetadataValue::Float(buf.get_f32())
                }
                4 => MetadataValue::String(read_string(buf)?),
                5 => MetadataValue::Slot(Slot::proto_decode(buf)?),
                6 => {
                    ensure_remaining(buf, 12)?;
                    MetadataValue::Position(BlockPos::new(buf.get_i32(), buf.get_i32(), buf.get_i32()))
                }
                _ => {
                    // Only 7 is left in three bits.
                    ensure_remaining(buf, 12)?;
                    MetadataValue::Rotation(buf.get_f32(), buf.get_f32(), buf.get_f32())
                }
            };
            entries.push(MetadataEntry { index, value });
        }
        Ok(EntityMetadata(entries))
    }
}
