//! The server's single mutable state, owned by the simulation thread.

use std::collections::HashMap;

use mc_sync_proto::packets::{ClientboundPacket, KeepAlive, ServerboundPacket};
use tracing::{debug, info, warn};

use crate::network::{ConnId, NetworkEvent, Outbox};
use crate::persistence::WorldSnapshot;
use crate::world::{Dimension, EntityIds};

/// Everything a simulation step, a periodic job or a deferred task may touch.
pub struct ServerContext {
    dimensions: Vec<Box<dyn Dimension>>,
    /// Connection to the dimension the player is in.
    players: HashMap<ConnId, i32>,
    pending_keep_alive: HashMap<ConnId, i32>,
    ids: EntityIds,
    pub outbox: Outbox,
}

impl ServerContext {
    pub fn new(ids: EntityIds) -> Self {
        Self {
            dimensions: Vec::new(),
            players: HashMap::new(),
            pending_keep_alive: HashMap::new(),
            ids,
            outbox: Outbox::new(),
        }
    }

    /// New players join the first dimension added.
    pub fn add_dimension(&mut self, dimension: Box<dyn Dimension>) {
        info!("Loaded dimension {} ({})", dimension.id(), dimension.name());
        self.dimensions.push(dimension);
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension_mut(&mut self, id: i32) -> Option<&mut (dyn Dimension + 'static)> {
        self.dimensions
            .iter_mut()
            .find(|d| d.id() == id)
            .map(|d| d.as_mut())
    }

    /// Dimensions and the outbox, borrowed together so a dimension can queue
    /// packets while it ticks.
    pub fn split(&mut self) -> (&mut [Box<dyn Dimension>], &mut Outbox) {
        (&mut self.dimensions, &mut self.outbox)
    }

    /// Every dimension has players and all of them sleep.
    pub fn all_idle(&self) -> bool {
        !self.dimensions.is_empty() && self.dimensions.iter().all(|d| d.all_players_asleep())
    }

    pub fn connections(&self) -> Vec<ConnId> {
        let mut conns: Vec<ConnId> = self.players.keys().copied().collect();
        conns.sort_unstable();
        conns
    }

    pub fn player_dimension(&self, conn: ConnId) -> Option<i32> {
        self.players.get(&conn).copied()
    }

    pub fn broadcast(&mut self, packet: &ClientboundPacket) {
        let conns = self.connections();
        self.outbox.broadcast(conns, packet);
    }

    pub fn snapshots(&self, tick: u64) -> Vec<WorldSnapshot> {
        self.dimensions.iter().map(|d| d.snapshot(tick)).collect()
    }

    /// Send a keep-alive to `conn` and remember the id it must echo.
    pub fn send_keep_alive(&mut self, conn: ConnId, id: i32) {
        if let Some(previous) = self.pending_keep_alive.insert(conn, id) {
            debug!("Connection {conn} never answered keep-alive {previous}");
        }
        self.outbox
            .push(conn, ClientboundPacket::KeepAlive(KeepAlive { id }));
    }

    pub fn awaiting_keep_alive(&self, conn: ConnId) -> Option<i32> {
        self.pending_keep_alive.get(&conn).copied()
    }

    pub fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected(conn) => {
                let Some(dimension) = self.dimensions.first_mut() else {
                    warn!("Connection {conn} arrived with no dimension loaded");
                    return;
                };
                let entity_id = self.ids.next();
                dimension.add_player(conn, entity_id, &mut self.outbox);
                self.players.insert(conn, dimension.id());
            }
            NetworkEvent::Packet(conn, packet) => self.handle_packet(conn, packet),
            NetworkEvent::Disconnected(conn, reason) => {
                info!("Connection {conn} closed: {reason}");
                self.pending_keep_alive.remove(&conn);
                if let Some(dim) = self.players.remove(&conn) {
                    if let Some(dimension) = self.dimension_mut(dim) {
                        dimension.remove_player(conn);
                    }
                }
            }
        }
    }

    fn handle_packet(&mut self, conn: ConnId, packet: ServerboundPacket) {
        if let ServerboundPacket::KeepAlive(KeepAlive { id }) = packet {
            match self.pending_keep_alive.get(&conn) {
                Some(expected) if *expected == id => {
                    self.pending_keep_alive.remove(&conn);
                }
                _ => debug!("Connection {conn} sent unexpected keep-alive {id}"),
            }
            return;
        }
        let Some(dim) = self.players.get(&conn).copied() else {
            debug!("Dropping packet 0x{:02X} from unknown connection {conn}", packet.packet_id());
            return;
        };
        let Some(dimension) = self.dimensions.iter_mut().find(|d| d.id() == dim) else {
            return;
        };
        dimension.handle_packet(conn, &packet, &mut self.outbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FlatWorld;
    use mc_sync_proto::types::BlockPos;

    fn context() -> ServerContext {
        let ids = EntityIds::default();
        let mut ctx = ServerContext::new(ids.clone());
        ctx.add_dimension(Box::new(FlatWorld::new(
            0,
            "world",
            BlockPos::new(0, 4, 0),
            1,
            1,
            ids,
        )));
        ctx
    }

    #[test]
    fn connect_and_disconnect_route_to_first_dimension() {
        let mut ctx = context();
        ctx.handle_event(NetworkEvent::Connected(3));
        assert_eq!(ctx.player_dimension(3), Some(0));
        assert!(!ctx.outbox.is_empty());

        ctx.handle_event(NetworkEvent::Disconnected(3, "bye".into()));
        assert_eq!(ctx.connections(), Vec::<ConnId>::new());
        assert!(ctx.dimension_mut(0).unwrap().players().is_empty());
    }

    #[test]
    fn keep_alive_round_trip() {
        let mut ctx = context();
        ctx.handle_event(NetworkEvent::Connected(3));
        ctx.outbox.take();

        ctx.send_keep_alive(3, 77);
        assert_eq!(ctx.awaiting_keep_alive(3), Some(77));
        ctx.handle_event(NetworkEvent::Packet(
            3,
            ServerboundPacket::KeepAlive(KeepAlive { id: 5 }),
        ));
        assert_eq!(ctx.awaiting_keep_alive(3), Some(77));
        ctx.handle_event(NetworkEvent::Packet(
            3,
            ServerboundPacket::KeepAlive(KeepAlive { id: 77 }),
        ));
        assert_eq!(ctx.awaiting_keep_alive(3), None);
    }

    #[test]
    fn idle_requires_sleeping_players() {
        let mut ctx = context();
        assert!(!ctx.all_idle());
        ctx.handle_event(NetworkEvent::Connected(3));
        assert!(!ctx.all_idle());
        ctx.dimension_mut(0).unwrap().set_sleeping(3, true);
        assert!(ctx.all_idle());
        assert!(!ServerContext::new(EntityIds::default()).all_idle());
    }
}
