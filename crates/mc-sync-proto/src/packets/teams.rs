//! Teams (0x3E): server to client.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_count, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInfo {
    pub display_name: String,
    pub prefix: String,
    pub suffix: String,
    /// Bit 0 friendly fire, bit 1 see invisible teammates.
    pub friendly_flags: i8,
    pub name_tag_visibility: String,
    pub color: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamAction {
    Create { info: TeamInfo, players: Vec<String> },
    Remove,
    UpdateInfo(TeamInfo),
    AddPlayers(Vec<String>),
    RemovePlayers(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub name: String,
    pub action: TeamAction,
}

fn write_info(buf: &mut impl BufMut, info: &TeamInfo) {
    write_string(buf, &info.display_name);
    write_string(buf, &info.prefix);
    write_string(buf, &info.suffix);
    buf.put_i8(info.friendly_flags);
    write_string(buf, &info.name_tag_visibility);
    buf.put_i8(info.color);
}

fn read_info(buf: &mut impl Buf) -> Result<TeamInfo, ProtoError> {
    let display_name = read_string(buf)?;
    let prefix = read_string(buf)?;
    let suffix = read_string(buf)?;
    ensure_remaining(buf, 1)?;
    let friendly_flags = buf.get_i8();
    let name_tag_visibility = read_string(buf)?;
    ensure_remaining(buf, 1)?;
    Ok(TeamInfo {
        display_name,
        prefix,
        suffix,
        friendly_flags,
        name_tag_visibility,
        color: buf.get_i8(),
    })
}

fn write_players(buf: &mut impl BufMut, players: &[String]) {
    VarInt(players.len() as i32).proto_encode(buf);
    for p in players {
        write_string(buf, p);
    }
}

fn read_players(buf: &mut impl Buf) -> Result<Vec<String>, ProtoError> {
    let count = read_count(buf)?;
    let mut players = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        players.push(read_string(buf)?);
    }
    Ok(players)
}

impl ProtoEncode for Teams {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.name);
        match &self.action {
            TeamAction::Create { info, players } => {
                buf.put_i8(0);
                write_info(buf, info);
                write_players(buf, players);
            }
            TeamAction::Remove => buf.put_i8(1),
            TeamAction::UpdateInfo(info) => {
                buf.put_i8(2);
                write_info(buf, info);
            }
            TeamAction::AddPlayers(players) => {
                buf.put_i8(3);
                write_players(buf, players);
            }
            TeamAction::RemovePlayers(players) => {
                buf.put_i8(4);
                write_players(buf, players);
            }
        }
    }
}

impl ProtoDecode for Teams {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let name = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        let action = match buf.get_i8() {
            0 => TeamAction::Create {
                info: read_info(buf)?,
                players: read_players(buf)?,
            },
            1 => TeamAction::Remove,
            2 => TeamAction::UpdateInfo(read_info(buf)?),
            3 => TeamAction::AddPlayers(read_players(buf)?),
            4 => TeamAction::RemovePlayers(read_players(buf)?),
            other => {
                return Err(ProtoError::InvalidData(format!("unknown team mode {other}")))
            }
        };
        Ok(Self { name, action })
    }
}
