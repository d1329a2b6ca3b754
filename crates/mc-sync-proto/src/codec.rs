//! Protocol encoding/decoding traits and helpers.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::types::VarInt;

/// Longest string the play protocol allows (in UTF-16 units; checked against bytes here).
pub const MAX_STRING_LEN: usize = 32767 * 4;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Fail with `BufferTooShort` unless `needed` bytes remain.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a protocol string (VarInt length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarInt(s.len() as i32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a protocol string (VarInt length + UTF-8).
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    let len = VarInt::proto_decode(buf)?.0;
    if len < 0 {
        return Err(ProtoError::InvalidData(format!("negative string length {len}")));
    }
    let len = len as usize;
    if len > MAX_STRING_LEN {
        return Err(ProtoError::StringTooLong {
            len,
            max: MAX_STRING_LEN,
        });
    }
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)
}

/// Read a VarInt element count, rejecting negatives.
pub fn read_count(buf: &mut impl Buf) -> Result<usize, ProtoError> {
    let n = VarInt::proto_decode(buf)?.0;
    if n < 0 {
        return Err(ProtoError::InvalidData(format!("negative count {n}")));
    }
    Ok(n as usize)
}

/// Read a single-byte boolean.
pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtoError> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn string_roundtrip() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "{\"text\":\"hi\"}");
        let result = read_string(&mut buf.freeze()).unwrap();
        assert_eq!(result, "{\"text\":\"hi\"}");
    }

    #[test]
    fn string_unicode() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Ünïcødé");
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "Ünïcødé");
    }

    #[test]
    fn string_buffer_too_short() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Hello");
        let truncated = buf.freeze().slice(..3);
        assert!(matches!(
            read_string(&mut truncated.clone()),
            Err(ProtoError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn negative_count_rejected() {
        let mut buf = BytesMut::new();
        VarInt(-1).proto_encode(&mut buf);
        assert!(read_count(&mut buf.freeze()).is_err());
    }
}
