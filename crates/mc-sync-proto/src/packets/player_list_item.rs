//! PlayerListItem (0x38): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{read_bool, read_count, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{Uuid, VarInt};

/// A signed game-profile property such as `textures`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListAdd {
    pub uuid: Uuid,
    pub name: String,
    pub properties: Vec<ProfileProperty>,
    pub game_mode: i32,
    pub ping: i32,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerListItem {
    AddPlayer(Vec<PlayerListAdd>),
    UpdateGameMode(Vec<(Uuid, i32)>),
    UpdateLatency(Vec<(Uuid, i32)>),
    UpdateDisplayName(Vec<(Uuid, Option<String>)>),
    RemovePlayer(Vec<Uuid>),
}

impl PlayerListItem {
    fn action_id(&self) -> i32 {
        match self {
            PlayerListItem::AddPlayer(_) => 0,
            PlayerListItem::UpdateGameMode(_) => 1,
            PlayerListItem::UpdateLatency(_) => 2,
            PlayerListItem::UpdateDisplayName(_) => 3,
            PlayerListItem::RemovePlayer(_) => 4,
        }
    }

    fn len(&self) -> usize {
        match self {
            PlayerListItem::AddPlayer(v) => v.len(),
            PlayerListItem::UpdateGameMode(v) | PlayerListItem::UpdateLatency(v) => v.len(),
            PlayerListItem::UpdateDisplayName(v) => v.len(),
            PlayerListItem::RemovePlayer(v) => v.len(),
        }
    }
}

fn write_optional_string(buf: &mut impl BufMut, s: Option<&str>) {
    match s {
        Some(s) => {
            buf.put_u8(1);
            write_string(buf, s);
        }
        None => buf.put_u8(0),
    }
}

fn read_optional_string(buf: &mut impl Buf) -> Result<Option<String>, ProtoError> {
    if read_bool(buf)? {
        Ok(Some(read_string(buf)?))
    } else {
        Ok(None)
    }
}

impl ProtoEncode for PlayerListItem {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.action_id()).proto_encode(buf);
        VarInt(self.len() as i32).proto_encode(buf);
        match self {
            PlayerListItem::AddPlayer(entries) => {
                for e in entries {
                    e.uuid.proto_encode(buf);
                    write_string(buf, &e.name);
                    VarInt(e.properties.len() as i32).proto_encode(buf);
                    for p in &e.properties {
                        write_string(buf, &p.name);
                        write_string(buf, &p.value);
                        write_optional_string(buf, p.signature.as_deref());
                    }
                    VarInt(e.game_mode).proto_encode(buf);
                    VarInt(e.ping).proto_encode(buf);
                    write_optional_string(buf, e.display_name.as_deref());
                }
            }
            PlayerListItem::UpdateGameMode(entries) | PlayerListItem::UpdateLatency(entries) => {
                for (uuid, v) in entries {
                    uuid.proto_encode(buf);
                    VarInt(*v).proto_encode(buf);
                }
            }
            PlayerListItem::UpdateDisplayName(entries) => {
                for (uuid, name) in entries {
                    uuid.proto_encode(buf);
                    write_optional_string(buf, name.as_deref());
                }
            }
            PlayerListItem::RemovePlayer(uuids) => {
                for uuid in uuids {
                    uuid.proto_encode(buf);
                }
            }
        }
    }
}

impl ProtoDecode for PlayerListItem {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let action = VarInt::proto_decode(buf)?.0;
        let count = read_count(buf)?;
        let cap = count.min(buf.remaining() / 16);
        Ok(match action {
            0 => {
                let mut entries = Vec::with_capacity(cap);
                for _ in 0..count {
                    let uuid = Uuid::proto_decode(buf)?;
                    let name = read_string(buf)?;
                    let n_props = read_count(buf)?;
                    let mut properties = Vec::with_capacity(n_props.min(16));
                    for _ in 0..n_props {
                        properties.push(ProfileProperty {
                            name: read_string(buf)?,
                            value: read_string(buf)?,
                            signature: read_optional_string(buf)?,
                        });
                    }
                    entries.push(PlayerListAdd {
                        uuid,
                        name,
                        properties,
                        game_mode: VarInt::proto_decode(buf)?.0,
                        ping: VarInt::proto_decode(buf)?.0,
                        display_name: read_optional_string(buf)?,
                    });
                }
                PlayerListItem::AddPlayer(entries)
            }
            1 | 2 => {
                let mut entries = Vec::with_capacity(cap);
                for _ in 0..count {
                    entries.push((Uuid::proto_decode(buf)?, VarInt::proto_decode(buf)?.0));
                }
                if action == 1 {
                    PlayerListItem::UpdateGameMode(entries)
                } else {
                    PlayerListItem::UpdateLatency(entries)
                }
            }
            3 => {
                let mut entries = Vec::with_capacity(cap);
                for _ in 0..count {
                    entries.push((Uuid::proto_decode(buf)?, read_optional_string(buf)?));
                }
                PlayerListItem::UpdateDisplayName(entries)
            }
            4 => {
                let mut uuids = Vec::with_capacity(cap);
                for _ in 0..count {
                    uuids.push(Uuid::proto_decode(buf)?);
                }
                PlayerListItem::RemovePlayer(uuids)
            }
            other => {
                return Err(ProtoError::InvalidData(format!(
                    "unknown player list action {other}"
                )))
            }
        })
    }
}
