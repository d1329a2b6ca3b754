//! Play-state packet catalog for protocol 47.
//!
//! Each direction is a closed enum. Decoding an id outside the catalog is
//! [`ProtoError::UnknownPacketId`]; a known id whose body does not parse is
//! [`ProtoError::Malformed`].

pub mod attach_entity;
pub mod block_action;
pub mod block_change;
pub mod change_game_state;
pub mod chat;
pub mod chunk_data;
pub mod close_window;
pub mod collect_item;
pub mod confirm_transaction;
pub mod custom_payload;
pub mod destroy_entities;
pub mod disconnect;
pub mod display_scoreboard;
pub mod entity_effect;
pub mod entity_equipment;
pub mod entity_head_look;
pub mod entity_metadata;
pub mod entity_move;
pub mod entity_status;
pub mod entity_teleport;
pub mod entity_velocity;
pub mod explosion;
pub mod held_item_change;
pub mod join_game;
pub mod keep_alive;
pub mod map_chunk_bulk;
pub mod multi_block_change;
pub mod open_window;
pub mod player_abilities;
pub mod player_list_item;
pub mod player_pos_look;
pub mod resource_pack_send;
pub mod resource_pack_status;
pub mod respawn;
pub mod scoreboard_objective;
pub mod server_difficulty;
pub mod set_compression;
pub mod set_experience;
pub mod set_slot;
pub mod spawn_experience_orb;
pub mod spawn_global_entity;
pub mod spawn_mob;
pub mod spawn_object;
pub mod spawn_painting;
pub mod spawn_player;
pub mod spawn_position;
pub mod teams;
pub mod time_update;
pub mod update_block_entity;
pub mod update_health;
pub mod update_score;
pub mod update_sign;
pub mod window_items;
pub mod window_property;

pub use attach_entity::AttachEntity;
pub use block_action::BlockAction;
pub use block_change::BlockChange;
pub use change_game_state::ChangeGameState;
pub use chat::Chat;
pub use chunk_data::ChunkData;
pub use close_window::CloseWindow;
pub use collect_item::CollectItem;
pub use confirm_transaction::ConfirmTransaction;
pub use custom_payload::CustomPayload;
pub use destroy_entities::DestroyEntities;
pub use disconnect::Disconnect;
pub use display_scoreboard::DisplayScoreboard;
pub use entity_effect::{EntityEffect, RemoveEntityEffect};
pub use entity_equipment::EntityEquipment;
pub use entity_head_look::EntityHeadLook;
pub use entity_metadata::SetEntityMetadata;
pub use entity_move::EntityMove;
pub use entity_status::EntityStatus;
pub use entity_teleport::EntityTeleport;
pub use entity_velocity::EntityVelocity;
pub use explosion::Explosion;
pub use held_item_change::HeldItemChange;
pub use join_game::JoinGame;
pub use keep_alive::KeepAlive;
pub use map_chunk_bulk::{BulkColumn, MapChunkBulk};
pub use multi_block_change::{BlockChangeRecord, MultiBlockChange};
pub use open_window::OpenWindow;
pub use player_abilities::PlayerAbilities;
pub use player_list_item::{PlayerListAdd, PlayerListItem, ProfileProperty};
pub use player_pos_look::{ClientPosLook, PlayerPosLook};
pub use resource_pack_send::ResourcePackSend;
pub use resource_pack_status::{ResourcePackResult, ResourcePackStatus};
pub use respawn::Respawn;
pub use scoreboard_objective::{ObjectiveAction, ScoreboardObjective};
pub use server_difficulty::ServerDifficulty;
pub use set_compression::SetCompression;
pub use set_experience::SetExperience;
pub use set_slot::SetSlot;
pub use spawn_experience_orb::SpawnExperienceOrb;
pub use spawn_global_entity::SpawnGlobalEntity;
pub use spawn_mob::SpawnMob;
pub use spawn_object::SpawnObject;
pub use spawn_painting::SpawnPainting;
pub use spawn_player::SpawnPlayer;
pub use spawn_position::SpawnPosition;
pub use teams::{TeamAction, TeamInfo, Teams};
pub use time_update::TimeUpdate;
pub use update_block_entity::UpdateBlockEntity;
pub use update_health::UpdateHealth;
pub use update_score::UpdateScore;
pub use update_sign::UpdateSign;
pub use window_items::WindowItems;
pub use window_property::WindowProperty;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

/// Clientbound play packet IDs.
pub mod id {
    pub const KEEP_ALIVE: u32 = 0x00;
    pub const JOIN_GAME: u32 = 0x01;
    pub const CHAT: u32 = 0x02;
    pub const TIME_UPDATE: u32 = 0x03;
    pub const ENTITY_EQUIPMENT: u32 = 0x04;
    pub const SPAWN_POSITION: u32 = 0x05;
    pub const UPDATE_HEALTH: u32 = 0x06;
    pub const RESPAWN: u32 = 0x07;
    pub const PLAYER_POS_LOOK: u32 = 0x08;
    pub const HELD_ITEM_CHANGE: u32 = 0x09;
    pub const SPAWN_PLAYER: u32 = 0x0C;
    pub const COLLECT_ITEM: u32 = 0x0D;
    pub const SPAWN_OBJECT: u32 = 0x0E;
    pub const SPAWN_MOB: u32 = 0x0F;
    pub const SPAWN_PAINTING: u32 = 0x10;
    pub const SPAWN_EXPERIENCE_ORB: u32 = 0x11;
    pub const ENTITY_VELOCITY: u32 = 0x12;
    pub const DESTROY_ENTITIES: u32 = 0x13;
    pub const ENTITY: u32 = 0x14;
    pub const ENTITY_REL_MOVE: u32 = 0x15;
    pub const ENTITY_LOOK: u32 = 0x16;
    pub const ENTITY_LOOK_REL_MOVE: u32 = 0x17;
    pub const ENTITY_TELEPORT: u32 = 0x18;
    pub const ENTITY_HEAD_LOOK: u32 = 0x19;
    pub const ENTITY_STATUS: u32 = 0x1A;
    pub const ATTACH_ENTITY: u32 = 0x1B;
    pub const ENTITY_METADATA: u32 = 0x1C;
    pub const ENTITY_EFFECT: u32 = 0x1D;
    pub const REMOVE_ENTITY_EFFECT: u32 = 0x1E;
    pub const SET_EXPERIENCE: u32 = 0x1F;
    pub const CHUNK_DATA: u32 = 0x21;
    pub const MULTI_BLOCK_CHANGE: u32 = 0x22;
    pub const BLOCK_CHANGE: u32 = 0x23;
    pub const BLOCK_ACTION: u32 = 0x24;
    pub const MAP_CHUNK_BULK: u32 = 0x26;
    pub const EXPLOSION: u32 = 0x27;
    pub const CHANGE_GAME_STATE: u32 = 0x2B;
    pub const SPAWN_GLOBAL_ENTITY: u32 = 0x2C;
    pub const OPEN_WINDOW: u32 = 0x2D;
    pub const CLOSE_WINDOW: u32 = 0x2E;
    pub const SET_SLOT: u32 = 0x2F;
    pub const WINDOW_ITEMS: u32 = 0x30;
    pub const WINDOW_PROPERTY: u32 = 0x31;
    pub const CONFIRM_TRANSACTION: u32 = 0x32;
    pub const UPDATE_SIGN: u32 = 0x33;
    pub const UPDATE_BLOCK_ENTITY: u32 = 0x35;
    pub const PLAYER_LIST_ITEM: u32 = 0x38;
    pub const PLAYER_ABILITIES: u32 = 0x39;
    pub const SCOREBOARD_OBJECTIVE: u32 = 0x3B;
    pub const UPDATE_SCORE: u32 = 0x3C;
    pub const DISPLAY_SCOREBOARD: u32 = 0x3D;
    pub const TEAMS: u32 = 0x3E;
    pub const CUSTOM_PAYLOAD: u32 = 0x3F;
    pub const DISCONNECT: u32 = 0x40;
    pub const SERVER_DIFFICULTY: u32 = 0x41;
    pub const SET_COMPRESSION: u32 = 0x46;
    pub const RESOURCE_PACK_SEND: u32 = 0x48;
}

/// Serverbound play packet IDs.
pub mod serverbound_id {
    pub const KEEP_ALIVE: u32 = 0x00;
    pub const PLAYER_POS_LOOK: u32 = 0x06;
    pub const CONFIRM_TRANSACTION: u32 = 0x0F;
    pub const RESOURCE_PACK_STATUS: u32 = 0x19;
}

/// Protocol version this catalog speaks (Minecraft 1.8.x).
pub const PROTOCOL_VERSION: i32 = 47;

/// Everything the server may send during play.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientboundPacket {
    KeepAlive(KeepAlive),
    JoinGame(JoinGame),
    Chat(Chat),
    TimeUpdate(TimeUpdate),
    EntityEquipment(EntityEquipment),
    SpawnPosition(SpawnPosition),
    UpdateHealth(UpdateHealth),
    Respawn(Respawn),
    PlayerPosLook(PlayerPosLook),
    HeldItemChange(HeldItemChange),
    SpawnPlayer(SpawnPlayer),
    CollectItem(CollectItem),
    SpawnObject(SpawnObject),
    SpawnMob(SpawnMob),
    SpawnPainting(SpawnPainting),
    SpawnExperienceOrb(SpawnExperienceOrb),
    EntityVelocity(EntityVelocity),
    DestroyEntities(DestroyEntities),
    EntityMove(EntityMove),
    EntityTeleport(EntityTeleport),
    EntityHeadLook(EntityHeadLook),
    EntityStatus(EntityStatus),
    AttachEntity(AttachEntity),
    EntityMetadata(SetEntityMetadata),
    EntityEffect(EntityEffect),
    RemoveEntityEffect(RemoveEntityEffect),
    SetExperience(SetExperience),
    ChunkData(ChunkData),
    MultiBlockChange(MultiBlockChange),
    BlockChange(BlockChange),
    BlockAction(BlockAction),
    MapChunkBulk(MapChunkBulk),
    Explosion(Explosion),
    ChangeGameState(ChangeGameState),
    SpawnGlobalEntity(SpawnGlobalEntity),
    OpenWindow(OpenWindow),
    CloseWindow(CloseWindow),
    SetSlot(SetSlot),
    WindowItems(WindowItems),
    WindowProperty(WindowProperty),
    ConfirmTransaction(ConfirmTransaction),
    UpdateSign(UpdateSign),
    UpdateBlockEntity(UpdateBlockEntity),
    PlayerListItem(PlayerListItem),
    PlayerAbilities(PlayerAbilities),
    ScoreboardObjective(ScoreboardObjective),
    UpdateScore(UpdateScore),
    DisplayScoreboard(DisplayScoreboard),
    Teams(Teams),
    CustomPayload(CustomPayload),
    Disconnect(Disconnect),
    ServerDifficulty(ServerDifficulty),
    SetCompression(SetCompression),
    ResourcePackSend(ResourcePackSend),
}

impl ClientboundPacket {
    pub fn packet_id(&self) -> u32 {
        match self {
            Self::KeepAlive(_) => id::KEEP_ALIVE,
            Self::JoinGame(_) => id::JOIN_GAME,
            Self::Chat(_) => id::CHAT,
            Self::TimeUpdate(_) => id::TIME_UPDATE,
            Self::EntityEquipment(_) => id::ENTITY_EQUIPMENT,
            Self::SpawnPosition(_) => id::SPAWN_POSITION,
            Self::UpdateHealth(_) => id::UPDATE_HEALTH,
            Self::Respawn(_) => id::RESPAWN,
            Self::PlayerPosLook(_) => id::PLAYER_POS_LOOK,
            Self::HeldItemChange(_) => id::HELD_ITEM_CHANGE,
            Self::SpawnPlayer(_) => id::SPAWN_PLAYER,
            Self::CollectItem(_) => id::COLLECT_ITEM,
            Self::SpawnObject(_) => id::SPAWN_OBJECT,
            Self::SpawnMob(_) => id::SPAWN_MOB,
            Self::SpawnPainting(_) => id::SPAWN_PAINTING,
            Self::SpawnExperienceOrb(_) => id::SPAWN_EXPERIENCE_ORB,
            Self::EntityVelocity(_) => id::ENTITY_VELOCITY,
            Self::DestroyEntities(_) => id::DESTROY_ENTITIES,
            Self::EntityMove(p) => p.packet_id(),
            Self::EntityTeleport(_) => id::ENTITY_TELEPORT,
            Self::EntityHeadLook(_) => id::ENTITY_HEAD_LOOK,
            Self::EntityStatus(_) => id::ENTITY_STATUS,
            Self::AttachEntity(_) => id::ATTACH_ENTITY,
            Self::EntityMetadata(_) => id::ENTITY_METADATA,
            Self::EntityEffect(_) => id::ENTITY_EFFECT,
            Self::RemoveEntityEffect(_) => id::REMOVE_ENTITY_EFFECT,
            Self::SetExperience(_) => id::SET_EXPERIENCE,
            Self::ChunkData(_) => id::CHUNK_DATA,
            Self::MultiBlockChange(_) => id::MULTI_BLOCK_CHANGE,
            Self::BlockChange(_) => id::BLOCK_CHANGE,
            Self::BlockAction(_) => id::BLOCK_ACTION,
            Self::MapChunkBulk(_) => id::MAP_CHUNK_BULK,
            Self::Explosion(_) => id::EXPLOSION,
            Self::ChangeGameState(_) => id::CHANGE_GAME_STATE,
            Self::SpawnGlobalEntity(_) => id::SPAWN_GLOBAL_ENTITY,
            Self::OpenWindow(_) => id::OPEN_WINDOW,
            Self::CloseWindow(_) => id::CLOSE_WINDOW,
            Self::SetSlot(_) => id::SET_SLOT,
            Self::WindowItems(_) => id::WINDOW_ITEMS,
            Self::WindowProperty(_) => id::WINDOW_PROPERTY,
            Self::ConfirmTransaction(_) => id::CONFIRM_TRANSACTION,
            Self::UpdateSign(_) => id::UPDATE_SIGN,
            Self::UpdateBlockEntity(_) => id::UPDATE_BLOCK_ENTITY,
            Self::PlayerListItem(_) => id::PLAYER_LIST_ITEM,
            Self::PlayerAbilities(_) => id::PLAYER_ABILITIES,
            Self::ScoreboardObjective(_) => id::SCOREBOARD_OBJECTIVE,
            Self::UpdateScore(_) => id::UPDATE_SCORE,
            Self::DisplayScoreboard(_) => id::DISPLAY_SCOREBOARD,
            Self::Teams(_) => id::TEAMS,
            Self::CustomPayload(_) => id::CUSTOM_PAYLOAD,
            Self::Disconnect(_) => id::DISCONNECT,
            Self::ServerDifficulty(_) => id::SERVER_DIFFICULTY,
            Self::SetCompression(_) => id::SET_COMPRESSION,
            Self::ResourcePackSend(_) => id::RESOURCE_PACK_SEND,
        }
    }

    /// Decode the body for `packet_id`. The whole of `buf` must be consumed.
    pub fn decode(packet_id: u32, buf: &mut impl Buf) -> Result<Self, ProtoError> {
        fn body<T: ProtoDecode>(buf: &mut impl Buf) -> Result<T, ProtoError> {
            T::proto_decode(buf)
        }

        let result = match packet_id {
            id::KEEP_ALIVE => body(buf).map(Self::KeepAlive),
            id::JOIN_GAME => body(buf).map(Self::JoinGame),
            id::CHAT => body(buf).map(Self::Chat),
            id::TIME_UPDATE => body(buf).map(Self::TimeUpdate),
            id::ENTITY_EQUIPMENT => body(buf).map(Self::EntityEquipment),
            id::SPAWN_POSITION => body(buf).map(Self::SpawnPosition),
            id::UPDATE_HEALTH => body(buf).map(Self::UpdateHealth),
            id::RESPAWN => body(buf).map(Self::Respawn),
            id::PLAYER_POS_LOOK => body(buf).map(Self::PlayerPosLook),
            id::HELD_ITEM_CHANGE => body(buf).map(Self::HeldItemChange),
            id::SPAWN_PLAYER => body(buf).map(Self::SpawnPlayer),
            id::COLLECT_ITEM => body(buf).map(Self::CollectItem),
            id::SPAWN_OBJECT => body(buf).map(Self::SpawnObject),
            id::SPAWN_MOB => body(buf).map(Self::SpawnMob),
            id::SPAWN_PAINTING => body(buf).map(Self::SpawnPainting),
            id::SPAWN_EXPERIENCE_ORB => body(buf).map(Self::SpawnExperienceOrb),
            id::ENTITY_VELOCITY => body(buf).map(Self::EntityVelocity),
            id::DESTROY_ENTITIES => body(buf).map(Self::DestroyEntities),
            id::ENTITY | id::ENTITY_REL_MOVE | id::ENTITY_LOOK | id::ENTITY_LOOK_REL_MOVE => {
                EntityMove::decode_as(packet_id, buf).map(Self::EntityMove)
            }
            id::ENTITY_TELEPORT => body(buf).map(Self::EntityTeleport),
            id::ENTITY_HEAD_LOOK => body(buf).map(Self::EntityHeadLook),
            id::ENTITY_STATUS => body(buf).map(Self::EntityStatus),
            id::ATTACH_ENTITY => body(buf).map(Self::AttachEntity),
            id::ENTITY_METADATA => body(buf).map(Self::EntityMetadata),
            id::ENTITY_EFFECT => body(buf).map(Self::EntityEffect),
            id::REMOVE_ENTITY_EFFECT => body(buf).map(Self::RemoveEntityEffect),
            id::SET_EXPERIENCE => body(buf).map(Self::SetExperience),
            id::CHUNK_DATA => body(buf).map(Self::ChunkData),
            id::MULTI_BLOCK_CHANGE => body(buf).map(Self::MultiBlockChange),
            id::BLOCK_CHANGE => body(buf).map(Self::BlockChange),
            id::BLOCK_ACTION => body(buf).map(Self::BlockAction),
            id::MAP_CHUNK_BULK => body(buf).map(Self::MapChunkBulk),
            id::EXPLOSION => body(buf).map(Self::Explosion),
            id::CHANGE_GAME_STATE => body(buf).map(Self::ChangeGameState),
            id::SPAWN_GLOBAL_ENTITY => body(buf).map(Self::SpawnGlobalEntity),
            id::OPEN_WINDOW => body(buf).map(Self::OpenWindow),
            id::CLOSE_WINDOW => body(buf).map(Self::CloseWindow),
            id::SET_SLOT => body(buf).map(Self::SetSlot),
            id::WINDOW_ITEMS => body(buf).map(Self::WindowItems),
            id::WINDOW_PROPERTY => body(buf).map(Self::WindowProperty),
            id::CONFIRM_TRANSACTION => body(buf).map(Self::ConfirmTransaction),
            id::UPDATE_SIGN => body(buf).map(Self::UpdateSign),
            id::UPDATE_BLOCK_ENTITY => body(buf).map(Self::UpdateBlockEntity),
            id::PLAYER_LIST_ITEM => body(buf).map(Self::PlayerListItem),
            id::PLAYER_ABILITIES => body(buf).map(Self::PlayerAbilities),
            id::SCOREBOARD_OBJECTIVE => body(buf).map(Self::ScoreboardObjective),
            id::UPDATE_SCORE => body(buf).map(Self::UpdateScore),
            id::DISPLAY_SCOREBOARD => body(buf).map(Self::DisplayScoreboard),
            id::TEAMS => body(buf).map(Self::Teams),
            id::CUSTOM_PAYLOAD => body(buf).map(Self::CustomPayload),
            id::DISCONNECT => body(buf).map(Self::Disconnect),
            id::SERVER_DIFFICULTY => body(buf).map(Self::ServerDifficulty),
            id::SET_COMPRESSION => body(buf).map(Self::SetCompression),
            id::RESOURCE_PACK_SEND => body(buf).map(Self::ResourcePackSend),
            other => return Err(ProtoError::UnknownPacketId(other)),
        };
        finish(packet_id, result, &*buf)
    }

    /// Encode `VarInt(id) | body`, ready for framing.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        VarInt(self.packet_id() as i32).proto_encode(&mut buf);
        self.proto_encode(&mut buf);
        buf.freeze()
    }
}

/// Encodes the body only.
impl ProtoEncode for ClientboundPacket {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        match self {
            Self::KeepAlive(p) => p.proto_encode(buf),
            Self::JoinGame(p) => p.proto_encode(buf),
            Self::Chat(p) => p.proto_encode(buf),
            Self::TimeUpdate(p) => p.proto_encode(buf),
            Self::EntityEquipment(p) => p.proto_encode(buf),
            Self::SpawnPosition(p) => p.proto_encode(buf),
            Self::UpdateHealth(p) => p.proto_encode(buf),
            Self::Respawn(p) => p.proto_encode(buf),
            Self::PlayerPosLook(p) => p.proto_encode(buf),
            Self::HeldItemChange(p) => p.proto_encode(buf),
            Self::SpawnPlayer(p) => p.proto_encode(buf),
            Self::CollectItem(p) => p.proto_encode(buf),
            Self::SpawnObject(p) => p.proto_encode(buf),
            Self::SpawnMob(p) => p.proto_encode(buf),
            Self::SpawnPainting(p) => p.proto_encode(buf),
            Self::SpawnExperienceOrb(p) => p.proto_encode(buf),
            Self::EntityVelocity(p) => p.proto_encode(buf),
            Self::DestroyEntities(p) => p.proto_encode(buf),
            Self::EntityMove(p) => p.proto_encode(buf),
            Self::EntityTeleport(p) => p.proto_encode(buf),
            Self::EntityHeadLook(p) => p.proto_encode(buf),
            Self::EntityStatus(p) => p.proto_encode(buf),
            Self::AttachEntity(p) => p.proto_encode(buf),
            Self::EntityMetadata(p) => p.proto_encode(buf),
            Self::EntityEffect(p) => p.proto_encode(buf),
            Self::RemoveEntityEffect(p) => p.proto_encode(buf),
            Self::SetExperience(p) => p.proto_encode(buf),
            Self::ChunkData(p) => p.proto_encode(buf),
            Self::MultiBlockChange(p) => p.proto_encode(buf),
            Self::BlockChange(p) => p.proto_encode(buf),
            Self::BlockAction(p) => p.proto_encode(buf),
            Self::MapChunkBulk(p) => p.proto_encode(buf),
            Self::Explosion(p) => p.proto_encode(buf),
            Self::ChangeGameState(p) => p.proto_encode(buf),
            Self::SpawnGlobalEntity(p) => p.proto_encode(buf),
            Self::OpenWindow(p) => p.proto_encode(buf),
            Self::CloseWindow(p) => p.proto_encode(buf),
            Self::SetSlot(p) => p.proto_encode(buf),
            Self::WindowItems(p) => p.proto_encode(buf),
            Self::WindowProperty(p) => p.proto_encode(buf),
            Self::ConfirmTransaction(p) => p.proto_encode(buf),
            Self::UpdateSign(p) => p.proto_encode(buf),
            Self::UpdateBlockEntity(p) => p.proto_encode(buf),
            Self::PlayerListItem(p) => p.proto_encode(buf),
            Self::PlayerAbilities(p) => p.proto_encode(buf),
            Self::ScoreboardObjective(p) => p.proto_encode(buf),
            Self::UpdateScore(p) => p.proto_encode(buf),
            Self::DisplayScoreboard(p) => p.proto_encode(buf),
            Self::Teams(p) => p.proto_encode(buf),
            Self::CustomPayload(p) => p.proto_encode(buf),
            Self::Disconnect(p) => p.proto_encode(buf),
            Self::ServerDifficulty(p) => p.proto_encode(buf),
            Self::SetCompression(p) => p.proto_encode(buf),
            Self::ResourcePackSend(p) => p.proto_encode(buf),
        }
    }
}

/// Everything the client sends during play.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerboundPacket {
    KeepAlive(KeepAlive),
    PlayerPosLook(ClientPosLook),
    ConfirmTransaction(ConfirmTransaction),
    ResourcePackStatus(ResourcePackStatus),
}

impl ServerboundPacket {
    pub fn packet_id(&self) -> u32 {
        match self {
            Self::KeepAlive(_) => serverbound_id::KEEP_ALIVE,
            Self::PlayerPosLook(_) => serverbound_id::PLAYER_POS_LOOK,
            Self::ConfirmTransaction(_) => serverbound_id::CONFIRM_TRANSACTION,
            Self::ResourcePackStatus(_) => serverbound_id::RESOURCE_PACK_STATUS,
        }
    }

    pub fn decode(packet_id: u32, buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let result = match packet_id {
            serverbound_id::KEEP_ALIVE => KeepAlive::proto_decode(buf).map(Self::KeepAlive),
            serverbound_id::PLAYER_POS_LOOK => {
                ClientPosLook::proto_decode(buf).map(Self::PlayerPosLook)
            }
            serverbound_id::CONFIRM_TRANSACTION => {
                ConfirmTransaction::proto_decode(buf).map(Self::ConfirmTransaction)
            }
            serverbound_id::RESOURCE_PACK_STATUS => {
                ResourcePackStatus::proto_decode(buf).map(Self::ResourcePackStatus)
            }
            other => return Err(ProtoError::UnknownPacketId(other)),
        };
        finish(packet_id, result, &*buf)
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        VarInt(self.packet_id() as i32).proto_encode(&mut buf);
        self.proto_encode(&mut buf);
        buf.freeze()
    }
}

impl ProtoEncode for ServerboundPacket {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        match self {
            Self::KeepAlive(p) => p.proto_encode(buf),
            Self::PlayerPosLook(p) => p.proto_encode(buf),
            Self::ConfirmTransaction(p) => p.proto_encode(buf),
            Self::ResourcePackStatus(p) => p.proto_encode(buf),
        }
    }
}

/// Wrap body errors as `Malformed` and reject leftovers.
fn finish<T>(
    packet_id: u32,
    result: Result<T, ProtoError>,
    buf: &impl Buf,
) -> Result<T, ProtoError> {
    let packet = result.map_err(|e| ProtoError::Malformed {
        id: packet_id,
        source: Box::new(e),
    })?;
    if buf.has_remaining() {
        return Err(ProtoError::Malformed {
            id: packet_id,
            source: Box::new(ProtoError::TrailingBytes {
                id: packet_id,
                trailing: buf.remaining(),
            }),
        });
    }
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_stack::{ItemStack, Slot};
    use crate::metadata::{EntityMetadata, MetadataValue};
    use crate::types::{BlockPos, Uuid};
    use mc_sync_nbt::{NbtCompound, NbtRoot, NbtTag};

    fn roundtrip(packet: ClientboundPacket) {
        let bytes = packet.to_bytes();
        let (packet_id, mut body) = crate::frame::split_packet_id(bytes).unwrap();
        assert_eq!(packet_id, packet.packet_id());
        let decoded = ClientboundPacket::decode(packet_id, &mut body).unwrap();
        assert_eq!(decoded, packet);
    }

    fn team_info() -> TeamInfo {
        TeamInfo {
            display_name: "Red".into(),
            prefix: "§c".into(),
            suffix: String::new(),
            friendly_flags: 3,
            name_tag_visibility: "always".into(),
            color: 12,
        }
    }

    #[test]
    fn protocol_version_constant() {
        assert_eq!(PROTOCOL_VERSION, 47);
    }

    #[test]
    fn catalog_roundtrip() {
        let meta = EntityMetadata::new()
            .with(0, MetadataValue::Byte(0))
            .with(6, MetadataValue::Float(20.0));
        let packets = vec![
            ClientboundPacket::KeepAlive(KeepAlive { id: 123_456 }),
            ClientboundPacket::JoinGame(JoinGame {
                entity_id: 42,
                game_mode: 1,
                dimension: -1,
                difficulty: 2,
                max_players: 20,
                level_type: "flat".into(),
                reduced_debug_info: false,
            }),
            ClientboundPacket::Chat(Chat::system("hello")),
            ClientboundPacket::TimeUpdate(TimeUpdate {
                world_age: 24_000,
                time_of_day: -6000,
            }),
            ClientboundPacket::SpawnPosition(SpawnPosition {
                location: BlockPos::new(8, 64, -8),
            }),
            ClientboundPacket::UpdateHealth(UpdateHealth {
                health: 19.5,
                food: 18,
                saturation: 2.0,
            }),
            ClientboundPacket::Respawn(Respawn {
                dimension: 1,
                difficulty: 3,
                game_mode: 0,
                level_type: "default".into(),
            }),
            ClientboundPacket::PlayerPosLook(PlayerPosLook {
                x: 0.5,
                y: 65.0,
                z: -0.5,
                yaw: 90.0,
                pitch: 0.0,
                flags: player_pos_look::relative::Y_ROT,
            }),
            ClientboundPacket::HeldItemChange(HeldItemChange { slot: 4 }),
            ClientboundPacket::SpawnPlayer(SpawnPlayer {
                entity_id: 9,
                uuid: Uuid::new(5, 6),
                x: 32,
                y: 2080,
                z: 0,
                yaw: 10,
                pitch: -3,
                current_item: 0,
                metadata: meta.clone(),
            }),
            ClientboundPacket::CollectItem(CollectItem {
                collected_id: 10,
                collector_id: 9,
            }),
            ClientboundPacket::SpawnObject(SpawnObject {
                entity_id: 11,
                kind: 70,
                x: 0,
                y: 2048,
                z: 0,
                pitch: 0,
                yaw: 0,
                data: 12,
                velocity: [0, -200, 0],
            }),
            ClientboundPacket::SpawnMob(SpawnMob {
                entity_id: 12,
                kind: 63,
                x: -320,
                y: 4000,
                z: 640,
                yaw: 1,
                pitch: 2,
                head_pitch: 3,
                velocity: [0, 0, 0],
                metadata: meta.clone(),
            }),
            ClientboundPacket::SpawnExperienceOrb(SpawnExperienceOrb {
                entity_id: 13,
                x: 1,
                y: 2,
                z: 3,
                count: 7,
            }),
            ClientboundPacket::EntityVelocity(EntityVelocity {
                entity_id: 12,
                velocity: [100, -800, 8000],
            }),
            ClientboundPacket::DestroyEntities(DestroyEntities {
                entity_ids: vec![1, 2, 300],
            }),
            ClientboundPacket::EntityMove(EntityMove {
                entity_id: 12,
                delta: None,
                rotation: None,
                on_ground: false,
            }),
            ClientboundPacket::EntityMove(EntityMove {
                entity_id: 12,
                delta: Some([1, 2, 3]),
                rotation: None,
                on_ground: true,
            }),
            ClientboundPacket::EntityMove(EntityMove {
                entity_id: 12,
                delta: None,
                rotation: Some((10, 20)),
                on_ground: false,
            }),
            ClientboundPacket::EntityMove(EntityMove {
                entity_id: 12,
                delta: Some([-1, -2, -3]),
                rotation: Some((-10, -20)),
                on_ground: true,
            }),
            ClientboundPacket::EntityTeleport(EntityTeleport {
                entity_id: 12,
                x: 100,
                y: 200,
                z: 300,
                yaw: 0,
                pitch: 0,
                on_ground: true,
            }),
            ClientboundPacket::EntityHeadLook(EntityHeadLook {
                entity_id: 12,
                head_yaw: -64,
            }),
            ClientboundPacket::EntityStatus(EntityStatus {
                entity_id: 12,
                status: 2,
            }),
            ClientboundPacket::EntityMetadata(SetEntityMetadata {
                entity_id: 12,
                metadata: meta,
            }),
            ClientboundPacket::ChunkData(ChunkData {
                chunk_x: -3,
                chunk_z: 7,
                ground_up: false,
                section_mask: 0b101,
                data: Bytes::from_static(&[1, 2, 3, 4]),
            }),
            ClientboundPacket::ChunkData(ChunkData::unload(crate::types::ChunkPos::new(1, 1))),
            ClientboundPacket::MultiBlockChange(MultiBlockChange {
                chunk_x: 2,
                chunk_z: -2,
                records: vec![
                    BlockChangeRecord {
                        x: 1,
                        y: 64,
                        z: 15,
                        block_state: 1 << 4,
                    },
                    BlockChangeRecord {
                        x: 15,
                        y: 0,
                        z: 0,
                        block_state: 0,
                    },
                ],
            }),
            ClientboundPacket::BlockChange(BlockChange {
                location: BlockPos::new(-1, 70, 1),
                block_state: (35 << 4) | 14,
            }),
            ClientboundPacket::ChangeGameState(ChangeGameState {
                reason: change_game_state::reason::RAIN_STRENGTH,
                value: 0.5,
            }),
            ClientboundPacket::OpenWindow(OpenWindow {
                window_id: 3,
                window_type: "minecraft:chest".into(),
                title: "{\"text\":\"Chest\"}".into(),
                slot_count: 27,
                entity_id: None,
            }),
            ClientboundPacket::OpenWindow(OpenWindow {
                window_id: 4,
                window_type: open_window::HORSE_WINDOW.into(),
                title: "{\"text\":\"Horse\"}".into(),
                slot_count: 2,
                entity_id: Some(77),
            }),
            ClientboundPacket::CloseWindow(CloseWindow { window_id: 3 }),
            ClientboundPacket::SetSlot(SetSlot {
                window_id: 0,
                slot: 36,
                item: Slot::of(ItemStack::new(1, 64, 0)),
            }),
            ClientboundPacket::WindowItems(WindowItems {
                window_id: 0,
                items: vec![Slot::EMPTY, Slot::of(ItemStack::new(276, 1, 3))],
            }),
            ClientboundPacket::WindowProperty(WindowProperty {
                window_id: 2,
                property: 0,
                value: 150,
            }),
            ClientboundPacket::ConfirmTransaction(ConfirmTransaction {
                window_id: 1,
                action: 12,
                accepted: false,
            }),
            ClientboundPacket::PlayerListItem(PlayerListItem::UpdateLatency(vec![(
                Uuid::new(1, 1),
                150,
            )])),
            ClientboundPacket::PlayerListItem(PlayerListItem::UpdateDisplayName(vec![(
                Uuid::new(1, 1),
                Some("{\"text\":\"Bob\"}".into()),
            )])),
            ClientboundPacket::PlayerListItem(PlayerListItem::RemovePlayer(vec![Uuid::ZERO])),
            ClientboundPacket::ScoreboardObjective(ScoreboardObjective {
                name: "kills".into(),
                action: ObjectiveAction::Create {
                    display_name: "Kills".into(),
                    render_type: "integer".into(),
                },
            }),
            ClientboundPacket::ScoreboardObjective(ScoreboardObjective {
                name: "kills".into(),
                action: ObjectiveAction::Remove,
            }),
            ClientboundPacket::UpdateScore(UpdateScore {
                entry: "Steve".into(),
                objective: "kills".into(),
                value: Some(3),
            }),
            ClientboundPacket::UpdateScore(UpdateScore {
                entry: "Steve".into(),
                objective: "kills".into(),
                value: None,
            }),
            ClientboundPacket::DisplayScoreboard(DisplayScoreboard {
                position: 1,
                objective: "kills".into(),
            }),
            ClientboundPacket::Teams(Teams {
                name: "red".into(),
                action: TeamAction::Create {
                    info: team_info(),
                    players: vec!["Steve".into(), "Alex".into()],
                },
            }),
            ClientboundPacket::Teams(Teams {
                name: "red".into(),
                action: TeamAction::UpdateInfo(team_info()),
            }),
            ClientboundPacket::Teams(Teams {
                name: "red".into(),
                action: TeamAction::RemovePlayers(vec!["Alex".into()]),
            }),
            ClientboundPacket::Teams(Teams {
                name: "red".into(),
                action: TeamAction::Remove,
            }),
            ClientboundPacket::EntityEquipment(EntityEquipment {
                entity_id: 9,
                slot: entity_equipment::slot::HELMET,
                item: Slot::of(ItemStack::new(310, 1, 0)),
            }),
            ClientboundPacket::SpawnPainting(SpawnPainting {
                entity_id: 20,
                title: "Kebab".into(),
                location: BlockPos::new(4, 65, -2),
                direction: 2,
            }),
            ClientboundPacket::AttachEntity(AttachEntity {
                entity_id: 9,
                vehicle_id: -1,
                leash: false,
            }),
            ClientboundPacket::EntityEffect(EntityEffect {
                entity_id: 9,
                effect_id: 1,
                amplifier: 2,
                duration: 600,
                hide_particles: true,
            }),
            ClientboundPacket::RemoveEntityEffect(RemoveEntityEffect {
                entity_id: 9,
                effect_id: 1,
            }),
            ClientboundPacket::SetExperience(SetExperience {
                bar: 0.25,
                level: 30,
                total: 1395,
            }),
            ClientboundPacket::BlockAction(BlockAction {
                location: BlockPos::new(0, 64, 0),
                action_id: 1,
                action_param: 1,
                block_type: 54,
            }),
            ClientboundPacket::MapChunkBulk(MapChunkBulk {
                sky_light: true,
                columns: vec![
                    BulkColumn {
                        chunk_x: 0,
                        chunk_z: 0,
                        section_mask: 1,
                    },
                    BulkColumn {
                        chunk_x: -1,
                        chunk_z: 4,
                        section_mask: 0,
                    },
                ],
                data: Bytes::from_static(&[9, 8, 7]),
            }),
            ClientboundPacket::Explosion(Explosion {
                x: 10.5,
                y: 64.0,
                z: -3.5,
                radius: 4.0,
                records: vec![[0, 0, 0], [-1, 2, 1]],
                player_motion: [0.1, 0.4, -0.2],
            }),
            ClientboundPacket::SpawnGlobalEntity(SpawnGlobalEntity {
                entity_id: 21,
                kind: spawn_global_entity::LIGHTNING,
                x: 320,
                y: 2048,
                z: -32,
            }),
            ClientboundPacket::UpdateSign(UpdateSign {
                location: BlockPos::new(1, 65, 1),
                lines: [
                    "{\"text\":\"Welcome\"}".into(),
                    String::new(),
                    String::new(),
                    "{\"text\":\"spawn\"}".into(),
                ],
            }),
            ClientboundPacket::UpdateBlockEntity(UpdateBlockEntity {
                location: BlockPos::new(2, 64, 2),
                action: 1,
                nbt: Some(NbtRoot::new(
                    "",
                    NbtCompound::from([(
                        "EntityId".to_string(),
                        NbtTag::String("Zombie".into()),
                    )]),
                )),
            }),
            ClientboundPacket::UpdateBlockEntity(UpdateBlockEntity {
                location: BlockPos::new(2, 64, 2),
                action: 4,
                nbt: None,
            }),
            ClientboundPacket::PlayerAbilities(PlayerAbilities {
                flags: player_abilities::flag::ALLOW_FLYING | player_abilities::flag::CREATIVE,
                flying_speed: 0.05,
                walking_speed: 0.1,
            }),
            ClientboundPacket::CustomPayload(CustomPayload::brand("vanilla")),
            ClientboundPacket::ServerDifficulty(ServerDifficulty { difficulty: 3 }),
            ClientboundPacket::Disconnect(Disconnect::with_text("bye")),
            ClientboundPacket::SetCompression(SetCompression { threshold: 256 }),
            ClientboundPacket::ResourcePackSend(ResourcePackSend {
                url: "http://example.com/pack.zip".into(),
                hash: "0123abcd".into(),
            }),
        ];
        for packet in packets {
            roundtrip(packet);
        }
    }

    #[test]
    fn explosion_offsets_are_relative_to_center() {
        let explosion = Explosion {
            x: 10.5,
            y: 64.9,
            z: -3.5,
            radius: 2.0,
            records: vec![[0, 0, 0], [-1, 2, 1]],
            player_motion: [0.0; 3],
        };
        let blocks: Vec<_> = explosion.affected_blocks().collect();
        assert_eq!(blocks, vec![BlockPos::new(10, 64, -3), BlockPos::new(9, 66, -2)]);
    }

    #[test]
    fn brand_payload() {
        assert_eq!(CustomPayload::brand("vanilla").read_brand().as_deref(), Some("vanilla"));
        let other = CustomPayload {
            channel: "MC|TrList".into(),
            data: Bytes::from_static(&[7, b'v']),
        };
        assert_eq!(other.read_brand(), None);
    }

    #[test]
    fn explosion_rejects_negative_record_count() {
        let mut buf = BytesMut::new();
        (0..4).for_each(|_| buf.put_f32(0.0));
        buf.put_i32(-1);
        let err = ClientboundPacket::decode(id::EXPLOSION, &mut buf.freeze()).unwrap_err();
        assert!(matches!(err, ProtoError::Malformed { id: id::EXPLOSION, .. }));
    }

    #[test]
    fn serverbound_roundtrip() {
        let packets = vec![
            ServerboundPacket::KeepAlive(KeepAlive { id: -5 }),
            ServerboundPacket::PlayerPosLook(ClientPosLook {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                yaw: 4.0,
                pitch: 5.0,
                on_ground: false,
            }),
            ServerboundPacket::ConfirmTransaction(ConfirmTransaction {
                window_id: 2,
                action: -7,
                accepted: true,
            }),
            ServerboundPacket::ResourcePackStatus(ResourcePackStatus {
                hash: "abc".into(),
                result: ResourcePackResult::Accepted,
            }),
        ];
        for packet in packets {
            let (packet_id, mut body) = crate::frame::split_packet_id(packet.to_bytes()).unwrap();
            assert_eq!(ServerboundPacket::decode(packet_id, &mut body).unwrap(), packet);
        }
    }

    #[test]
    fn unknown_id_is_distinct_from_malformed() {
        let mut empty = Bytes::new();
        let err = ClientboundPacket::decode(0x7E, &mut empty).unwrap_err();
        assert!(matches!(err, ProtoError::UnknownPacketId(0x7E)));
        assert!(err.is_unknown_packet());

        let mut short = Bytes::from_static(&[0x01]);
        let err = ClientboundPacket::decode(id::TIME_UPDATE, &mut short).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::Malformed {
                id: id::TIME_UPDATE,
                ..
            }
        ));
        assert!(!err.is_unknown_packet());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut buf = BytesMut::new();
        KeepAlive { id: 1 }.proto_encode(&mut buf);
        buf.put_u8(0xAA);
        let err = ClientboundPacket::decode(id::KEEP_ALIVE, &mut buf.freeze()).unwrap_err();
        assert!(matches!(err, ProtoError::Malformed { .. }));
    }

    #[test]
    fn serverbound_unknown_id() {
        let mut empty = Bytes::new();
        assert!(matches!(
            ServerboundPacket::decode(0x42, &mut empty),
            Err(ProtoError::UnknownPacketId(0x42))
        ));
    }
}
