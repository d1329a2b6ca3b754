//! OpenWindow (0x2D): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Window type that carries the horse's entity id.
pub const HORSE_WINDOW: &str = "EntityHorse";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWindow {
    pub window_id: u8,
    /// e.g. `minecraft:chest`.
    pub window_type: String,
    /// JSON chat component.
    pub title: String,
    pub slot_count: u8,
    /// Present only for [`HORSE_WINDOW`].
    pub entity_id: Option<i32>,
}

impl ProtoEncode for OpenWindow {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.window_id);
        write_string(buf, &self.window_type);
        write_string(buf, &self.title);
        buf.put_u8(self.slot_count);
        if self.window_type == HORSE_WINDOW {
            buf.put_i32(self.entity_id.unwrap_or_default());
        }
    }
}

impl ProtoDecode for OpenWindow {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        let window_id = buf.get_u8();
        let window_type = read_string(buf)?;
        let title = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        let slot_count = buf.get_u8();
        let entity_id = if window_type == HORSE_WINDOW {
            ensure_remaining(buf, 4)?;
            Some(buf.get_i32())
        } else {
            None
        };
        Ok(Self {
            window_id,
            window_type,
            title,
            slot_count,
            entity_id,
        })
    }
}
