//! MapChunkBulk (0x26): server to client.
//!
//! Several ground-up columns in one packet. The column headers come first,
//! then every column's payload back to back in header order. The packet
//! carries no per-column lengths; they follow from each section mask.

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{ensure_remaining, read_bool, read_count, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{ChunkPos, VarInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkColumn {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub section_mask: u16,
}

impl BulkColumn {
    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapChunkBulk {
    /// Whether sections carry sky light. Always true in the overworld.
    pub sky_light: bool,
    pub columns: Vec<BulkColumn>,
    pub data: Bytes,
}

impl ProtoEncode for MapChunkBulk {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.sky_light as u8);
        VarInt(self.columns.len() as i32).proto_encode(buf);
        for column in &self.columns {
            buf.put_i32(column.chunk_x);
            buf.put_i32(column.chunk_z);
            buf.put_u16(column.section_mask);
        }
        buf.put_slice(&self.data);
    }
}

impl ProtoDecode for MapChunkBulk {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let sky_light = read_bool(buf)?;
        let count = read_count(buf)?;
        ensure_remaining(buf, count.saturating_mul(10))?;
        let columns = (0..count)
            .map(|_| BulkColumn {
                chunk_x: buf.get_i32(),
                chunk_z: buf.get_i32(),
                section_mask: buf.get_u16(),
            })
            .collect();
        let data = buf.copy_to_bytes(buf.remaining());
        Ok(Self {
            sky_light,
            columns,
            data,
        })
    }
}
