//! Entity (0x14), EntityRelMove (0x15), EntityLook (0x16), EntityLookRelMove (0x17):
//! server to client.
//!
//! One struct covers the family; which id goes on the wire follows from the optional parts.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::packets::id;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMove {
    pub entity_id: i32,
    /// Fixed-point delta (1/32) added to the server reference position.
    pub delta: Option<[i8; 3]>,
    /// (yaw, pitch) angle bytes.
    pub rotation: Option<(i8, i8)>,
    /// Not present on the bare `Entity` form.
    pub on_ground: bool,
}

impl EntityMove {
    pub fn packet_id(&self) -> u32 {
        match (self.delta.is_some(), self.rotation.is_some()) {
            (false, false) => id::ENTITY,
            (true, false) => id::ENTITY_REL_MOVE,
            (false, true) => id::ENTITY_LOOK,
            (true, true) => id::ENTITY_LOOK_REL_MOVE,
        }
    }

    /// Decode the body of one of the four family ids.
    pub fn decode_as(packet_id: u32, buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let (has_delta, has_rotation) = match packet_id {
            id::ENTITY => (false, false),
            id::ENTITY_REL_MOVE => (true, false),
            id::ENTITY_LOOK => (false, true),
            id::ENTITY_LOOK_REL_MOVE => (true, true),
            other => return Err(ProtoError::UnknownPacketId(other)),
        };
        let entity_id = VarInt::proto_decode(buf)?.0;
        if !has_delta && !has_rotation {
            return Ok(Self {
                entity_id,
                delta: None,
                rotation: None,
                on_ground: false,
            });
        }
        let delta = if has_delta {
            ensure_remaining(buf, 3)?;
            Some([buf.get_i8(), buf.get_i8(), buf.get_i8()])
        } else {
            None
        };
        let rotation = if has_rotation {
            ensure_remaining(buf, 2)?;
            Some((buf.get_i8(), buf.get_i8()))
        } else {
            None
        };
        ensure_remaining(buf, 1)?;
        Ok(Self {
            entity_id,
            delta,
            rotation,
            on_ground: buf.get_u8() != 0,
        })
    }
}

impl ProtoEncode for EntityMove {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        if self.delta.is_none() && self.rotation.is_none() {
            return;
        }
        if let Some(d) = self.delta {
            for v in d {
                buf.put_i8(v);
            }
        }
        if let Some((yaw, pitch)) = self.rotation {
            buf.put_i8(yaw);
            buf.put_i8(pitch);
        }
        buf.put_u8(self.on_ground as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn id_follows_parts() {
        let mut m = EntityMove {
            entity_id: 1,
            delta: None,
            rotation: None,
            on_ground: false,
        };
        assert_eq!(m.packet_id(), id::ENTITY);
        m.delta = Some([1, 0, -1]);
        assert_eq!(m.packet_id(), id::ENTITY_REL_MOVE);
        m.rotation = Some((0, 0));
        assert_eq!(m.packet_id(), id::ENTITY_LOOK_REL_MOVE);
        m.delta = None;
        assert_eq!(m.packet_id(), id::ENTITY_LOOK);
    }

    #[test]
    fn look_rel_move_layout() {
        let m = EntityMove {
            entity_id: 5,
            delta: Some([4, -4, 0]),
            rotation: Some((64, -32)),
            on_ground: true,
        };
        let mut buf = BytesMut::new();
        m.proto_encode(&mut buf);
        assert_eq!(&buf[..], &[5, 4, 0xFC, 0, 64, 0xE0, 1]);
        let decoded = EntityMove::decode_as(m.packet_id(), &mut buf.freeze()).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn foreign_id_rejected() {
        let data = [1u8];
        assert!(EntityMove::decode_as(0x18, &mut &data[..]).is_err());
    }
}
