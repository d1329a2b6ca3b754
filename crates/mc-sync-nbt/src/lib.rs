//! Big-endian NBT (Named Binary Tag) as carried inside item slots on the wire.
//!
//! Integers are big-endian, string lengths are `u16`, array and list lengths are `i32`.
//! A lone `TAG_End` byte stands for "no tag" where a tag is optional.

pub mod error;
mod io;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag, TagType};

use bytes::{Buf, BufMut};

pub fn read_nbt(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_root(buf)
}

pub fn write_nbt(buf: &mut impl BufMut, root: &NbtRoot) {
    io::write_root(buf, root)
}

/// Read a slot tag that may be absent (a single `0x00` byte).
pub fn read_optional_nbt(buf: &mut impl Buf) -> Result<Option<NbtRoot>, NbtError> {
    io::read_optional_root(buf)
}

/// Write a slot tag, or `0x00` when there is none.
pub fn write_optional_nbt(buf: &mut impl BufMut, root: Option<&NbtRoot>) {
    io::write_optional_root(buf, root)
}
