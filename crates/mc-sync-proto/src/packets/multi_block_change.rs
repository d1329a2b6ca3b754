//! MultiBlockChange (0x22): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_count, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{BlockPos, ChunkPos, VarInt};

/// One changed block inside the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChangeRecord {
    /// 0..=15 within the column.
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// `block_id << 4 | meta`.
    pub block_state: i32,
}

impl BlockChangeRecord {
    pub fn world_pos(&self, chunk: ChunkPos) -> BlockPos {
        BlockPos::new(
            (chunk.x << 4) + self.x as i32,
            self.y as i32,
            (chunk.z << 4) + self.z as i32,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiBlockChange {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub records: Vec<BlockChangeRecord>,
}

impl MultiBlockChange {
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }
}

impl ProtoEncode for MultiBlockChange {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.chunk_x);
        buf.put_i32(self.chunk_z);
        VarInt(self.records.len() as i32).proto_encode(buf);
        for r in &self.records {
            buf.put_u8((r.x & 0x0F) << 4 | (r.z & 0x0F));
            buf.put_u8(r.y);
            VarInt(r.block_state).proto_encode(buf);
        }
    }
}

impl ProtoDecode for MultiBlockChange {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        let chunk_x = buf.get_i32();
        let chunk_z = buf.get_i32();
        let count = read_count(buf)?;
        let mut records = Vec::with_capacity(count.min(buf.remaining() / 3));
        for _ in 0..count {
            ensure_remaining(buf, 2)?;
            let horizontal = buf.get_u8();
            let y = buf.get_u8();
            records.push(BlockChangeRecord {
                x: horizontal >> 4,
                y,
                z: horizontal & 0x0F,
                block_state: VarInt::proto_decode(buf)?.0,
            });
        }
        Ok(Self {
            chunk_x,
            chunk_z,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn record_world_pos() {
        let r = BlockChangeRecord {
            x: 3,
            y: 70,
            z: 15,
            block_state: 1 << 4,
        };
        assert_eq!(r.world_pos(ChunkPos::new(-1, 2)), BlockPos::new(-13, 70, 47));
    }

    #[test]
    fn horizontal_byte_packing() {
        let m = MultiBlockChange {
            chunk_x: 0,
            chunk_z: 0,
            records: vec![BlockChangeRecord {
                x: 0xA,
                y: 1,
                z: 0x5,
                block_state: 2,
            }],
        };
        let mut buf = BytesMut::new();
        m.proto_encode(&mut buf);
        assert_eq!(&buf[8..], &[1, 0xA5, 1, 2]);
    }
}
