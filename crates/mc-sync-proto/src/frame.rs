//! Length-prefixed framing with optional threshold compression.
//!
//! Uncompressed: `VarInt(len) | VarInt(packet_id) | body`.
//! Compressed (after SetCompression): `VarInt(len) | VarInt(data_len) | zlib(packet_id | body)`,
//! where `data_len == 0` marks a body sent as-is because it was below the threshold.

use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::compression::{compress, decompress};
use crate::error::ProtoError;
use crate::types::VarInt;

/// Largest frame accepted from a peer (2 MiB, the vanilla ceiling).
pub const DEFAULT_MAX_FRAME_LEN: usize = 2 * 1024 * 1024;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Packets at least this long are compressed. `None` until SetCompression is seen.
    pub compression_threshold: Option<usize>,
    /// Compression level (0-9).
    pub compression_level: u32,
    /// Upper bound on a frame or inflated packet.
    pub max_frame_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            compression_threshold: None,
            compression_level: 6,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl FrameConfig {
    /// Apply a SetCompression threshold; negative disables compression.
    pub fn set_threshold(&mut self, threshold: i32) {
        self.compression_threshold = usize::try_from(threshold).ok();
    }
}

/// Wrap one packet (`VarInt(id) | body`) into a frame.
pub fn encode_frame(packet: &[u8], config: &FrameConfig) -> Result<Bytes, ProtoError> {
    let mut payload = BytesMut::with_capacity(packet.len() + 5);
    match config.compression_threshold {
        Some(threshold) if packet.len() >= threshold => {
            VarInt(packet.len() as i32).proto_encode(&mut payload);
            payload.put_slice(&compress(packet, config.compression_level)?);
        }
        Some(_) => {
            VarInt(0).proto_encode(&mut payload);
            payload.put_slice(packet);
        }
        None => payload.put_slice(packet),
    }

    let mut frame = BytesMut::with_capacity(payload.len() + 5);
    VarInt(payload.len() as i32).proto_encode(&mut frame);
    frame.put_slice(&payload);
    Ok(frame.freeze())
}

/// Pull one complete frame off the front of `src`.
///
/// Returns `Ok(None)` if the frame has not fully arrived yet; nothing is consumed in that case.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Bytes>, ProtoError> {
    let Some((len, header)) = VarInt::peek(src)? else {
        return Ok(None);
    };
    if len.0 < 0 || len.0 as usize > config.max_frame_len {
        return Err(ProtoError::FrameTooLarge {
            len: len.0.max(0) as usize,
            max: config.max_frame_len,
        });
    }
    let len = len.0 as usize;
    if src.len() < header + len {
        return Ok(None);
    }
    src.advance(header);
    let payload = src.split_to(len).freeze();

    if config.compression_threshold.is_none() {
        return Ok(Some(payload));
    }

    let mut cursor = Cursor::new(&payload[..]);
    let data_len = VarInt::proto_decode(&mut cursor)?.0;
    let offset = cursor.position() as usize;
    if data_len == 0 {
        return Ok(Some(payload.slice(offset..)));
    }
    if data_len < 0 || data_len as usize > config.max_frame_len {
        return Err(ProtoError::FrameTooLarge {
            len: data_len.max(0) as usize,
            max: config.max_frame_len,
        });
    }
    let inflated = decompress(&payload[offset..], data_len as usize)?;
    if inflated.len() != data_len as usize {
        return Err(ProtoError::InvalidData(format!(
            "declared {data_len} inflated bytes, got {}",
            inflated.len()
        )));
    }
    Ok(Some(Bytes::from(inflated)))
}

/// Split a packet into its id and body.
pub fn split_packet_id(mut packet: Bytes) -> Result<(u32, Bytes), ProtoError> {
    let id = VarInt::proto_decode(&mut packet)?.0 as u32;
    Ok((id, packet))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: i32, body: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        VarInt(id).proto_encode(&mut buf);
        buf.put_slice(body);
        buf.to_vec()
    }

    #[test]
    fn uncompressed_roundtrip() {
        let config = FrameConfig::default();
        let p = packet(0x00, &[0, 0, 0, 42]);
        let frame = encode_frame(&p, &config).unwrap();
        assert_eq!(frame[0] as usize, p.len());

        let mut src = BytesMut::from(&frame[..]);
        let decoded = decode_frame(&mut src, &config).unwrap().unwrap();
        assert_eq!(&decoded[..], &p[..]);
        assert!(src.is_empty());

        let (id, body) = split_packet_id(decoded).unwrap();
        assert_eq!(id, 0x00);
        assert_eq!(&body[..], &[0, 0, 0, 42]);
    }

    #[test]
    fn below_threshold_sent_raw() {
        let mut config = FrameConfig::default();
        config.set_threshold(256);
        let p = packet(0x03, &[1; 16]);
        let frame = encode_frame(&p, &config).unwrap();
        assert_eq!(frame[1], 0); // data_len == 0

        let mut src = BytesMut::from(&frame[..]);
        assert_eq!(&decode_frame(&mut src, &config).unwrap().unwrap()[..], &p[..]);
    }

    #[test]
    fn above_threshold_compressed() {
        let mut config = FrameConfig::default();
        config.set_threshold(64);
        let p = packet(0x21, &[7; 2048]);
        let frame = encode_frame(&p, &config).unwrap();
        assert!(frame.len() < p.len());

        let mut src = BytesMut::from(&frame[..]);
        assert_eq!(&decode_frame(&mut src, &config).unwrap().unwrap()[..], &p[..]);
    }

    #[test]
    fn partial_frame_waits() {
        let config = FrameConfig::default();
        let frame = encode_frame(&packet(0x02, b"hello"), &config).unwrap();
        let mut src = BytesMut::from(&frame[..3]);
        assert!(decode_frame(&mut src, &config).unwrap().is_none());
        assert_eq!(src.len(), 3);
        src.extend_from_slice(&frame[3..]);
        assert!(decode_frame(&mut src, &config).unwrap().is_some());
    }

    #[test]
    fn two_frames_back_to_back() {
        let config = FrameConfig::default();
        let mut src = BytesMut::new();
        src.extend_from_slice(&encode_frame(&packet(1, b"a"), &config).unwrap());
        src.extend_from_slice(&encode_frame(&packet(2, b"bc"), &config).unwrap());
        let a = decode_frame(&mut src, &config).unwrap().unwrap();
        let b = decode_frame(&mut src, &config).unwrap().unwrap();
        assert_eq!(split_packet_id(a).unwrap().0, 1);
        assert_eq!(split_packet_id(b).unwrap().0, 2);
    }

    #[test]
    fn oversized_frame_rejected() {
        let config = FrameConfig {
            max_frame_len: 8,
            ..FrameConfig::default()
        };
        let frame = encode_frame(&packet(1, &[0; 32]), &FrameConfig::default()).unwrap();
        let mut src = BytesMut::from(&frame[..]);
        assert!(matches!(
            decode_frame(&mut src, &config),
            Err(ProtoError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn negative_threshold_disables() {
        let mut config = FrameConfig::default();
        config.set_threshold(256);
        config.set_threshold(-1);
        assert!(config.compression_threshold.is_none());
    }
}
