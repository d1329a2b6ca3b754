use bytes::{Buf, BufMut};

use crate::error::NbtError;
use crate::tag::{NbtCompound, NbtRoot, NbtTag, TagType};

const MAX_DEPTH: usize = 512;

fn need(buf: &impl Buf, needed: usize) -> Result<(), NbtError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(NbtError::Truncated { needed, remaining });
    }
    Ok(())
}

pub(crate) fn read_optional_root(buf: &mut impl Buf) -> Result<Option<NbtRoot>, NbtError> {
    need(buf, 1)?;
    match buf.get_u8() {
        0 => Ok(None),
        10 => {
            let name = read_string(buf)?;
            let compound = read_compound(buf, 0)?;
            Ok(Some(NbtRoot { name, compound }))
        }
        other => Err(NbtError::RootNotCompound(other)),
    }
}

pub(crate) fn read_root(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    match read_optional_root(buf)? {
        Some(root) => Ok(root),
        None => Err(NbtError::RootNotCompound(0)),
    }
}

fn read_len(buf: &mut impl Buf) -> Result<usize, NbtError> {
    need(buf, 4)?;
    let len = buf.get_i32();
    usize::try_from(len).map_err(|_| NbtError::NegativeLength(len))
}

fn read_string(buf: &mut impl Buf) -> Result<String, NbtError> {
    need(buf, 2)?;
    let len = buf.get_u16() as usize;
    need(buf, len)?;
    Ok(String::from_utf8(buf.copy_to_bytes(len).to_vec())?)
}

fn read_compound(buf: &mut impl Buf, depth: usize) -> Result<NbtCompound, NbtError> {
    let mut compound = NbtCompound::new();
    loop {
        need(buf, 1)?;
        let tag_type = TagType::try_from(buf.get_u8())?;
        if tag_type == TagType::End {
            return Ok(compound);
        }
        let name = read_string(buf)?;
        let value = read_payload(buf, tag_type, depth + 1)?;
        compound.insert(name, value);
    }
}

fn read_payload(buf: &mut impl Buf, tag_type: TagType, depth: usize) -> Result<NbtTag, NbtError> {
    if depth > MAX_DEPTH {
        return Err(NbtError::TooDeep(MAX_DEPTH));
    }
    let tag = match tag_type {
        TagType::End => return Err(NbtError::UnknownTagType(0)),
        TagType::Byte => {
            need(buf, 1)?;
            NbtTag::Byte(buf.get_i8())
        }
        TagType::Short => {
            need(buf, 2)?;
            NbtTag::Short(buf.get_i16())
        }
        TagType::Int => {
            need(buf, 4)?;
            NbtTag::Int(buf.get_i32())
        }
        TagType::Long => {
            need(buf, 8)?;
            NbtTag::Long(buf.get_i64())
        }
        TagType::Float => {
            need(buf, 4)?;
            NbtTag::Float(buf.get_f32())
        }
        TagType::Double => {
            need(buf, 8)?;
            NbtTag::Double(buf.get_f64())
        }
        TagType::ByteArray => {
            let len = read_len(buf)?;
            need(buf, len)?;
            NbtTag::ByteArray(buf.copy_to_bytes(len).iter().map(|b| *b as i8).collect())
        }
        TagType::String => NbtTag::String(read_string(buf)?),
        TagType::List => {
            need(buf, 1)?;
            let element = TagType::try_from(buf.get_u8())?;
            let len = read_len(buf)?;
            // An empty list may declare TAG_End as its element type.
            if len == 0 {
                return Ok(NbtTag::List(Vec::new()));
            }
            let items = (0..len)
                .map(|_| read_payload(buf, element, depth + 1))
                .collect::<Result<_, _>>()?;
            NbtTag::List(items)
        }
        TagType::Compound => NbtTag::Compound(read_compound(buf, depth)?),
        TagType::IntArray => {
            let len = read_len(buf)?;
            need(buf, len.saturating_mul(4))?;
            NbtTag::IntArray((0..len).map(|_| buf.get_i32()).collect())
        }
    };
    Ok(tag)
}

pub(crate) fn write_root(buf: &mut impl BufMut, root: &NbtRoot) {
    buf.put_u8(TagType::Compound as u8);
    write_string(buf, &root.name);
    write_compound(buf, &root.compound);
}

pub(crate) fn write_optional_root(buf: &mut impl BufMut, root: Option<&NbtRoot>) {
    match root {
        Some(root) => write_root(buf, root),
        None => buf.put_u8(TagType::End as u8),
    }
}

fn write_string(buf: &mut impl BufMut, s: &str) {
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

fn write_compound(buf: &mut impl BufMut, compound: &NbtCompound) {
    for (name, value) in compound {
        buf.put_u8(value.tag_type() as u8);
        write_string(buf, name);
        write_payload(buf, value);
    }
    buf.put_u8(TagType::End as u8);
}

fn write_payload(buf: &mut impl BufMut, tag: &NbtTag) {
    match tag {
        NbtTag::Byte(v) => buf.put_i8(*v),
        NbtTag::Short(v) => buf.put_i16(*v),
        NbtTag::Int(v) => buf.put_i32(*v),
        NbtTag::Long(v) => buf.put_i64(*v),
        NbtTag::Float(v) => buf.put_f32(*v),
        NbtTag::Double(v) => buf.put_f64(*v),
        NbtTag::ByteArray(bytes) => {
            buf.put_i32(bytes.len() as i32);
            bytes.iter().for_each(|b| buf.put_i8(*b));
        }
        NbtTag::String(s) => write_string(buf, s),
        NbtTag::List(items) => {
            let element = items.first().map_or(TagType::End, NbtTag::tag_type);
            buf.put_u8(element as u8);
            buf.put_i32(items.len() as i32);
            items.iter().for_each(|item| write_payload(buf, item));
        }
        NbtTag::Compound(compound) => write_compound(buf, compound),
        NbtTag::IntArray(ints) => {
            buf.put_i32(ints.len() as i32);
            ints.iter().for_each(|v| buf.put_i32(*v));
        }
    }
}
