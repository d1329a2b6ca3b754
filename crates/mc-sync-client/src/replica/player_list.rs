//! Tab-list entries keyed by profile id.

use std::collections::HashMap;

use mc_sync_proto::packets::player_list_item::{PlayerListItem, ProfileProperty};
use mc_sync_proto::types::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub uuid: Uuid,
    pub name: String,
    pub properties: Vec<ProfileProperty>,
    pub game_mode: i32,
    pub ping: i32,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerList {
    players: HashMap<Uuid, PlayerInfo>,
}

impl PlayerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&PlayerInfo> {
        self.players.get(uuid)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Updates for unknown profiles are ignored.
    pub fn apply(&mut self, msg: &PlayerListItem) {
        match msg {
            PlayerListItem::AddPlayer(entries) => {
                for e in entries {
                    self.players.insert(
                        e.uuid,
                        PlayerInfo {
                            uuid: e.uuid,
                            name: e.name.clone(),
                            properties: e.properties.clone(),
                            game_mode: e.game_mode,
                            ping: e.ping,
                            display_name: e.display_name.clone(),
                        },
                    );
                }
            }
            PlayerListItem::UpdateGameMode(entries) => {
                for (uuid, mode) in entries {
                    if let Some(p) = self.players.get_mut(uuid) {
                        p.game_mode = *mode;
                    }
                }
            }
            PlayerListItem::UpdateLatency(entries) => {
                for (uuid, ping) in entries {
                    if let Some(p) = self.players.get_mut(uuid) {
                        p.ping = *ping;
                    }
                }
            }
            PlayerListItem::UpdateDisplayName(entries) => {
                for (uuid, name) in entries {
                    if let Some(p) = self.players.get_mut(uuid) {
                        p.display_name = name.clone();
                    }
                }
            }
            PlayerListItem::RemovePlayer(uuids) => {
                for uuid in uuids {
                    self.players.remove(uuid);
                }
            }
        }
    }
}
