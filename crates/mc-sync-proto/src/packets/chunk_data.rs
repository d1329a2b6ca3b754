//! ChunkData (0x21): server to client.
//!
//! A ground-up payload with an empty section mask and no data means "unload this column".

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{ensure_remaining, read_bool, read_count, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{ChunkPos, VarInt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    pub chunk_x: i32,
    pub chunk_z: i32,
    /// Whole column including biomes, as opposed to a section refresh.
    pub ground_up: bool,
    /// Bit `n` set means section `n` (blocks y = 16n..16n+15) is present.
    pub section_mask: u16,
    pub data: Bytes,
}

impl ChunkData {
    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }

    pub fn is_unload(&self) -> bool {
        self.ground_up && self.data.is_empty()
    }

    /// The unload form for a column.
    pub fn unload(pos: ChunkPos) -> Self {
        Self {
            chunk_x: pos.x,
            chunk_z: pos.z,
            ground_up: true,
            section_mask: 0,
            data: Bytes::new(),
        }
    }
}

impl ProtoEncode for ChunkData {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.chunk_x);
        buf.put_i32(self.chunk_z);
        buf.put_u8(self.ground_up as u8);
        buf.put_u16(self.section_mask);
        VarInt(self.data.len() as i32).proto_encode(buf);
        buf.put_slice(&self.data);
    }
}

impl ProtoDecode for ChunkData {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        let chunk_x = buf.get_i32();
        let chunk_z = buf.get_i32();
        let ground_up = read_bool(buf)?;
        ensure_remaining(buf, 2)?;
        let section_mask = buf.get_u16();
        let len = read_count(buf)?;
        ensure_remaining(buf, len)?;
        Ok(Self {
            chunk_x,
            chunk_z,
            ground_up,
            section_mask,
            data: buf.copy_to_bytes(len),
        })
    }
}
