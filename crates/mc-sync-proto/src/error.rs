//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt runs past {} bytes", crate::types::VarInt::MAX_BYTES)]
    VarIntTooLong,

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("string too long: {len} bytes (max {max})")]
    StringTooLong { len: usize, max: usize },

    #[error("decompression error: {0}")]
    DecompressError(String),

    #[error("compression error: {0}")]
    CompressError(String),

    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("unknown packet id: 0x{0:02X}")]
    UnknownPacketId(u32),

    #[error("malformed packet 0x{id:02X}: {source}")]
    Malformed {
        id: u32,
        #[source]
        source: Box<ProtoError>,
    },

    #[error("{trailing} trailing bytes after packet 0x{id:02X}")]
    TrailingBytes { id: u32, trailing: usize },

    #[error("NBT error: {0}")]
    Nbt(#[from] mc_sync_nbt::NbtError),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ProtoError {
    /// Whether this error was raised because the tag itself is not in the catalog.
    pub fn is_unknown_packet(&self) -> bool {
        matches!(self, ProtoError::UnknownPacketId(_))
    }
}
