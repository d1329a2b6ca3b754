//! Zlib compression for play-state frames.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::ProtoError;

/// Compress `data` with zlib at the given level (0-9).
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, ProtoError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| ProtoError::CompressError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ProtoError::CompressError(e.to_string()))
}

/// Decompress zlib `data`, refusing to inflate past `limit` bytes.
pub fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, ProtoError> {
    let mut output = Vec::new();
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|e| ProtoError::DecompressError(e.to_string()))?;
    if output.len() > limit {
        return Err(ProtoError::FrameTooLarge {
            len: output.len(),
            max: limit,
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_roundtrip() {
        let data = b"chunk column chunk column chunk column chunk column";
        let compressed = compress(data, 6).unwrap();
        assert_eq!(compressed[0], 0x78); // zlib header
        assert_eq!(decompress(&compressed, 1024).unwrap(), data);
    }

    #[test]
    fn zlib_empty() {
        let compressed = compress(b"", 6).unwrap();
        assert!(decompress(&compressed, 16).unwrap().is_empty());
    }

    #[test]
    fn inflate_limit_enforced() {
        let compressed = compress(&[0u8; 4096], 6).unwrap();
        assert!(matches!(
            decompress(&compressed, 100),
            Err(ProtoError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(decompress(b"not zlib at all", 1024).is_err());
    }
}
