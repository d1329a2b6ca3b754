use std::collections::BTreeMap;

use crate::error::NbtError;

/// Named children of a compound. Ordered so a slot always encodes to the same bytes.
pub type NbtCompound = BTreeMap<String, NbtTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
}

impl TryFrom<u8> for TagType {
    type Error = NbtError;

    fn try_from(id: u8) -> Result<Self, NbtError> {
        Ok(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
}

impl NbtTag {
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::ByteArray(_) => TagType::ByteArray,
            Self::String(_) => TagType::String,
            Self::List(_) => TagType::List,
            Self::Compound(_) => TagType::Compound,
            Self::IntArray(_) => TagType::IntArray,
        }
    }

    /// Any integer tag widened to i32. Item tags are loose about byte vs short.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::Byte(v) => Some(v as i32),
            Self::Short(v) => Some(v as i32),
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Self::Compound(c) => Some(c),
            _ => None,
        }
    }
}

/// The compound carried by an item slot, with its (usually empty) root name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NbtRoot {
    pub name: String,
    pub compound: NbtCompound,
}

impl NbtRoot {
    pub fn new(name: impl Into<String>, compound: NbtCompound) -> Self {
        Self {
            name: name.into(),
            compound,
        }
    }

    pub fn get(&self, key: &str) -> Option<&NbtTag> {
        self.compound.get(key)
    }

    /// `display.Name`, if the item was renamed.
    pub fn display_name(&self) -> Option<&str> {
        self.get("display")?.as_compound()?.get("Name")?.as_str()
    }

    /// `(id, level)` pairs from the `ench` list. Malformed entries are skipped.
    pub fn enchantments(&self) -> Vec<(i32, i32)> {
        let Some(NbtTag::List(list)) = self.get("ench") else {
            return Vec::new();
        };
        list.iter()
            .filter_map(NbtTag::as_compound)
            .filter_map(|e| Some((e.get("id")?.as_i32()?, e.get("lvl")?.as_i32()?)))
            .collect()
    }
}
