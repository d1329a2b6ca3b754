//! Play-state packet handler. Owns the replica and runs on the simulation thread.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use mc_sync_proto::packets::{
    Chat, ClientboundPacket, CustomPayload, Disconnect, JoinGame, ResourcePackResult,
    ResourcePackSend, ResourcePackStatus, Respawn, ServerboundPacket,
};
use mc_sync_tasks::TaskQueue;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::error::ReplicaError;
use crate::mutator::GameStateEffect;
use crate::outbound::Outbound;
use crate::registry::DESYNC_TARGET;
use crate::replica::{Containers, LocalPlayer, WorldReplica};
use crate::resource::{FetchError, PackPolicy, ResourceFetcher};

/// Chat lines kept for the presentation layer.
const CHAT_HISTORY: usize = 100;

/// Low bits of the join game mode; bit 3 is the hardcore flag.
const GAME_MODE_MASK: u8 = 0x07;

pub struct PlayHandler {
    world: Option<WorldReplica>,
    outbound: Outbound,
    tasks: TaskQueue<PlayHandler>,
    runtime: Option<Handle>,
    pack_policy: PackPolicy,
    fetcher: Arc<dyn ResourceFetcher>,
    active_pack: Option<PathBuf>,
    chat: VecDeque<Chat>,
    max_players: u8,
    done_loading_terrain: bool,
    disconnect_reason: Option<String>,
    server_brand: Option<String>,
}

impl PlayHandler {
    /// Fetches are spawned on the runtime current at construction, if any.
    pub fn new(
        outbound: Outbound,
        tasks: TaskQueue<PlayHandler>,
        pack_policy: PackPolicy,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        Self {
            world: None,
            outbound,
            tasks,
            runtime: Handle::try_current().ok(),
            pack_policy,
            fetcher,
            active_pack: None,
            chat: VecDeque::new(),
            max_players: 0,
            done_loading_terrain: false,
            disconnect_reason: None,
            server_brand: None,
        }
    }

    pub fn world(&self) -> Option<&WorldReplica> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut WorldReplica> {
        self.world.as_mut()
    }

    pub fn tasks(&self) -> &TaskQueue<PlayHandler> {
        &self.tasks
    }

    pub fn done_loading_terrain(&self) -> bool {
        self.done_loading_terrain
    }

    pub fn disconnect_reason(&self) -> Option<&str> {
        self.disconnect_reason.as_deref()
    }

    pub fn server_brand(&self) -> Option<&str> {
        self.server_brand.as_deref()
    }

    pub fn active_pack(&self) -> Option<&PathBuf> {
        self.active_pack.as_ref()
    }

    pub fn chat(&self) -> impl Iterator<Item = &Chat> {
        self.chat.iter()
    }

    pub fn max_players(&self) -> u8 {
        self.max_players
    }

    pub fn handle(&mut self, packet: ClientboundPacket) {
        match packet {
            ClientboundPacket::JoinGame(msg) => self.on_join_game(msg),
            ClientboundPacket::Respawn(msg) => self.on_respawn(msg),
            ClientboundPacket::Disconnect(msg) => self.on_disconnect(msg),
            ClientboundPacket::ResourcePackSend(msg) => self.on_resource_pack(msg),
            ClientboundPacket::Chat(msg) => self.on_chat(msg),
            ClientboundPacket::CustomPayload(msg) => self.on_custom_payload(msg),
            ClientboundPacket::KeepAlive(msg) => {
                self.outbound.send(ServerboundPacket::KeepAlive(msg));
            }
            ClientboundPacket::SetCompression(msg) => {
                debug!("Compression threshold {} reached the handler", msg.threshold);
            }
            other => self.apply_to_world(other),
        }
    }

    fn apply_to_world(&mut self, packet: ClientboundPacket) {
        let Some(world) = self.world.as_mut() else {
            debug!("Packet 0x{:02X} before join, dropped", packet.packet_id());
            return;
        };

        let result: Result<(), ReplicaError> = match packet {
            ClientboundPacket::TimeUpdate(msg) => {
                world.set_time(msg.world_age, msg.time_of_day);
                Ok(())
            }
            ClientboundPacket::SpawnPosition(msg) => {
                world.spawn = msg.location;
                Ok(())
            }
            ClientboundPacket::UpdateHealth(msg) => {
                world.set_health(msg.health, msg.food, msg.saturation);
                Ok(())
            }
            ClientboundPacket::PlayerPosLook(msg) => {
                let reply = world.apply_player_pos_look(&msg);
                self.outbound.send(ServerboundPacket::PlayerPosLook(reply));
                if !self.done_loading_terrain {
                    world.player.prev_pos = world.player.pos;
                    self.done_loading_terrain = true;
                    info!("Terrain loaded at {:?}", world.player.pos);
                }
                Ok(())
            }
            ClientboundPacket::HeldItemChange(msg) => {
                world.set_held_slot(msg.slot);
                Ok(())
            }
            ClientboundPacket::SpawnPlayer(msg) => {
                world.spawn_player(&msg);
                Ok(())
            }
            ClientboundPacket::CollectItem(msg) => {
                world.collect_item(&msg);
                Ok(())
            }
            ClientboundPacket::SpawnObject(msg) => world.spawn_object(&msg),
            ClientboundPacket::SpawnMob(msg) => world.spawn_mob(&msg),
            ClientboundPacket::SpawnExperienceOrb(msg) => {
                world.spawn_experience_orb(&msg);
                Ok(())
            }
            ClientboundPacket::EntityVelocity(msg) => {
                world.set_velocity(&msg);
                Ok(())
            }
            ClientboundPacket::DestroyEntities(msg) => {
                world.destroy_entities(&msg);
                Ok(())
            }
            ClientboundPacket::EntityMove(msg) => {
                world.move_entity(&msg);
                Ok(())
            }
            ClientboundPacket::EntityTeleport(msg) => {
                world.teleport_entity(&msg);
                Ok(())
            }
            ClientboundPacket::EntityHeadLook(msg) => {
                world.set_head_look(&msg);
                Ok(())
            }
            ClientboundPacket::EntityStatus(msg) => {
                world.entity_status(&msg);
                Ok(())
            }
            ClientboundPacket::EntityMetadata(msg) => {
                world.update_metadata(&msg);
                Ok(())
            }
            ClientboundPacket::ChunkData(msg) => world.apply_chunk_data(&msg),
            ClientboundPacket::MultiBlockChange(msg) => {
                world.apply_multi_block_change(&msg);
                Ok(())
            }
            ClientboundPacket::BlockChange(msg) => {
                world.apply_block_change(&msg);
                Ok(())
            }
            ClientboundPacket::ChangeGameState(msg) => {
                if let GameStateEffect::GameMode(mode) = world.change_game_state(&msg) {
                    info!("Game mode changed to {mode}");
                }
                Ok(())
            }
            ClientboundPacket::OpenWindow(msg) => {
                world.open_window(&msg);
                Ok(())
            }
            ClientboundPacket::CloseWindow(_) => {
                world.close_window();
                Ok(())
            }
            ClientboundPacket::SetSlot(msg) => world.set_slot(&msg).map(|_| ()),
            ClientboundPacket::WindowItems(msg) => {
                world.set_window_items(&msg);
                Ok(())
            }
            ClientboundPacket::WindowProperty(msg) => {
                world.set_window_property(&msg);
                Ok(())
            }
            ClientboundPacket::ConfirmTransaction(msg) => {
                if let Some(reply) = world.confirm_transaction(&msg) {
                    self.outbound
                        .send(ServerboundPacket::ConfirmTransaction(reply));
                }
                Ok(())
            }
            ClientboundPacket::PlayerListItem(msg) => {
                world.player_list.apply(&msg);
                Ok(())
            }
            ClientboundPacket::ScoreboardObjective(msg) => world.scoreboard.apply_objective(&msg),
            ClientboundPacket::UpdateScore(msg) => world.scoreboard.apply_score(&msg),
            ClientboundPacket::DisplayScoreboard(msg) => {
                world.scoreboard.apply_display(&msg);
                Ok(())
            }
            ClientboundPacket::Teams(msg) => world.scoreboard.apply_team(&msg),
            ClientboundPacket::EntityEquipment(msg) => {
                world.set_equipment(&msg);
                Ok(())
            }
            ClientboundPacket::SpawnPainting(msg) => {
                world.spawn_painting(&msg);
                Ok(())
            }
            ClientboundPacket::SpawnGlobalEntity(msg) => {
                world.spawn_global_entity(&msg);
                Ok(())
            }
            ClientboundPacket::AttachEntity(msg) => {
                world.attach_entity(&msg);
                Ok(())
            }
            ClientboundPacket::EntityEffect(msg) => {
                world.add_effect(&msg);
                Ok(())
            }
            ClientboundPacket::RemoveEntityEffect(msg) => {
                world.remove_effect(&msg);
                Ok(())
            }
            ClientboundPacket::SetExperience(msg) => {
                world.set_experience(&msg);
                Ok(())
            }
            ClientboundPacket::BlockAction(msg) => {
                world.block_action(&msg);
                Ok(())
            }
            ClientboundPacket::MapChunkBulk(msg) => world.apply_map_chunk_bulk(&msg).map(|_| ()),
            ClientboundPacket::Explosion(msg) => {
                world.apply_explosion(&msg);
                Ok(())
            }
            ClientboundPacket::UpdateSign(msg) => {
                world.update_sign(&msg);
                Ok(())
            }
            ClientboundPacket::UpdateBlockEntity(msg) => {
                world.update_block_entity(&msg);
                Ok(())
            }
            ClientboundPacket::PlayerAbilities(msg) => {
                world.set_abilities(&msg);
                Ok(())
            }
            ClientboundPacket::ServerDifficulty(msg) => {
                world.set_difficulty(&msg);
                Ok(())
            }
            ClientboundPacket::KeepAlive(_)
            | ClientboundPacket::JoinGame(_)
            | ClientboundPacket::Chat(_)
            | ClientboundPacket::Respawn(_)
            | ClientboundPacket::Disconnect(_)
            | ClientboundPacket::SetCompression(_)
            | ClientboundPacket::CustomPayload(_)
            | ClientboundPacket::ResourcePackSend(_) => Ok(()),
        };

        if let Err(e) = result {
            warn!(target: DESYNC_TARGET, "Replica update failed: {e}");
        }
    }

    fn on_join_game(&mut self, msg: JoinGame) {
        let mut player = LocalPlayer::new(msg.entity_id, msg.game_mode & GAME_MODE_MASK);
        player.reduced_debug_info = msg.reduced_debug_info;
        self.world = Some(WorldReplica::new(
            msg.dimension as i32,
            msg.difficulty,
            msg.level_type,
            player,
        ));
        self.max_players = msg.max_players;
        self.done_loading_terrain = false;
        info!(
            "Joined as entity {} in dimension {}",
            msg.entity_id, msg.dimension
        );
    }

    /// A different dimension replaces the replica; the same dimension only
    /// resets the local player.
    fn on_respawn(&mut self, msg: Respawn) {
        let Some(world) = self.world.take() else {
            debug!("Respawn before join, dropped");
            return;
        };
        let next = if world.dimension != msg.dimension {
            self.done_loading_terrain = false;
            info!("Changing dimension {} -> {}", world.dimension, msg.dimension);
            world.replace(msg.dimension, msg.difficulty, msg.level_type, msg.game_mode)
        } else {
            let mut world = world;
            let mut player = LocalPlayer::new(world.player.entity_id, msg.game_mode);
            player.reduced_debug_info = world.player.reduced_debug_info;
            world.player = player;
            world.containers = Containers::new();
            world.difficulty = msg.difficulty;
            world
        };
        self.world = Some(next);
    }

    fn on_disconnect(&mut self, msg: Disconnect) {
        info!("Disconnected by server: {}", msg.reason);
        self.disconnect_reason = Some(msg.reason);
        self.world = None;
    }

    fn on_custom_payload(&mut self, msg: CustomPayload) {
        match msg.read_brand() {
            Some(brand) => {
                info!("Server brand: {brand}");
                self.server_brand = Some(brand);
            }
            None => debug!(
                "Plugin message on {} ({} bytes)",
                msg.channel,
                msg.data.len()
            ),
        }
    }

    fn on_chat(&mut self, msg: Chat) {
        debug!("Chat [{}]: {}", msg.position, msg.message);
        if self.chat.len() == CHAT_HISTORY {
            self.chat.pop_front();
        }
        self.chat.push_back(msg);
    }

    fn on_resource_pack(&mut self, msg: ResourcePackSend) {
        let ResourcePackSend { url, hash } = msg;
        if self.pack_policy == PackPolicy::Disabled {
            self.send_pack_status(hash, ResourcePackResult::Declined);
            return;
        }
        let Some(runtime) = self.runtime.clone() else {
            warn!("No runtime for resource pack fetch, failing {url}");
            self.send_pack_status(hash, ResourcePackResult::FailedDownload);
            return;
        };

        self.send_pack_status(hash.clone(), ResourcePackResult::Accepted);
        let fetch = self.fetcher.fetch(&url, &hash);
        let tasks = self.tasks.clone();
        runtime.spawn(async move {
            let result = fetch.await;
            let posted = tasks.post(move |handler: &mut PlayHandler| {
                handler.on_pack_fetched(hash, result);
            });
            if posted.is_err() {
                debug!("Session ended before pack fetch of {url} completed");
            }
        });
    }

    /// Completion of a fetch started by [`on_resource_pack`](Self::on_resource_pack).
    pub fn on_pack_fetched(&mut self, hash: String, result: Result<PathBuf, FetchError>) {
        match result {
            Ok(path) => {
                info!("Resource pack ready at {}", path.display());
                self.active_pack = Some(path);
                self.send_pack_status(hash, ResourcePackResult::SuccessfullyLoaded);
            }
            Err(e) => {
                warn!("Resource pack fetch failed: {e}");
                self.send_pack_status(hash, ResourcePackResult::FailedDownload);
            }
        }
    }

    fn send_pack_status(&self, hash: String, result: ResourcePackResult) {
        self.outbound
            .send(ServerboundPacket::ResourcePackStatus(ResourcePackStatus {
                hash,
                result,
            }));
    }
}
