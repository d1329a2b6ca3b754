//! Routes decoded clientbound packets to the simulation thread.
//!
//! Decoding happens wherever bytes arrive. Connection-level packets
//! (keep-alive, compression) are answered on the spot; everything else goes
//! through a [`PacketSink`], which either runs the handler in place or
//! queues it for the simulation thread.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Buf;
use mc_sync_proto::packets::{ClientboundPacket, ServerboundPacket};
use mc_sync_tasks::TaskQueue;

use crate::error::DispatchError;
use crate::handler::PlayHandler;
use crate::outbound::Outbound;

/// Receives packets that mutate client state.
pub trait PacketSink {
    fn deliver(&mut self, packet: ClientboundPacket) -> Result<(), DispatchError>;
}

/// Runs the handler immediately. Use only on the simulation thread.
impl PacketSink for PlayHandler {
    fn deliver(&mut self, packet: ClientboundPacket) -> Result<(), DispatchError> {
        self.handle(packet);
        Ok(())
    }
}

/// Marshals each packet onto the simulation thread's task queue.
///
/// On the simulation thread itself, a sink that borrows the handler applies
/// packets in place, after anything already queued.
pub struct QueueSink<'h> {
    queue: TaskQueue<PlayHandler>,
    local: Option<&'h mut PlayHandler>,
}

impl QueueSink<'static> {
    pub fn new(queue: TaskQueue<PlayHandler>) -> Self {
        Self { queue, local: None }
    }
}

impl<'h> QueueSink<'h> {
    /// Sink for code that already owns the handler on the simulation thread.
    pub fn inline(handler: &'h mut PlayHandler) -> Self {
        Self {
            queue: handler.tasks().clone(),
            local: Some(handler),
        }
    }
}

impl Clone for QueueSink<'static> {
    fn clone(&self) -> Self {
        Self::new(self.queue.clone())
    }
}

impl PacketSink for QueueSink<'_> {
    fn deliver(&mut self, packet: ClientboundPacket) -> Result<(), DispatchError> {
        if self.queue.is_simulation_thread() {
            if let Some(handler) = self.local.as_deref_mut() {
                self.queue.drain(handler);
                handler.handle(packet);
                return Ok(());
            }
        }
        self.queue
            .post(move |handler: &mut PlayHandler| handler.handle(packet))?;
        Ok(())
    }
}

/// What the dispatcher did with a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Handed to the sink.
    Delivered,
    /// Keep-alive answered from the I/O side.
    KeepAlive,
    /// New compression threshold; the connection must apply it before the next frame.
    Compression(i32),
}

pub struct InboundDispatcher {
    outbound: Outbound,
    received: AtomicU64,
}

impl InboundDispatcher {
    pub fn new(outbound: Outbound) -> Self {
        Self {
            outbound,
            received: AtomicU64::new(0),
        }
    }

    /// Decode one packet body and route it.
    ///
    /// An unknown id and a body that fails to decode are both fatal to the
    /// connection but reported as different errors.
    pub fn dispatch(
        &self,
        packet_id: u32,
        payload: &mut impl Buf,
        sink: &mut impl PacketSink,
    ) -> Result<Dispatched, DispatchError> {
        let packet = ClientboundPacket::decode(packet_id, payload).map_err(|e| {
            if e.is_unknown_packet() {
                DispatchError::UnknownPacket(packet_id)
            } else {
                DispatchError::Decode {
                    id: packet_id,
                    source: e,
                }
            }
        })?;

        let outcome = match packet {
            ClientboundPacket::KeepAlive(keep_alive) => {
                self.outbound.send(ServerboundPacket::KeepAlive(keep_alive));
                Dispatched::KeepAlive
            }
            ClientboundPacket::SetCompression(msg) => Dispatched::Compression(msg.threshold),
            other => {
                sink.deliver(other)?;
                Dispatched::Delivered
            }
        };
        self.received.fetch_add(1, Ordering::Relaxed);
        Ok(outcome)
    }

    /// Packets successfully dispatched on this connection.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use mc_sync_proto::codec::ProtoEncode;
    use mc_sync_proto::packets::{id, KeepAlive, SetCompression, TimeUpdate};

    #[derive(Default)]
    struct Recording(Vec<ClientboundPacket>);

    impl PacketSink for Recording {
        fn deliver(&mut self, packet: ClientboundPacket) -> Result<(), DispatchError> {
            self.0.push(packet);
            Ok(())
        }
    }

    fn body(packet: &impl ProtoEncode) -> BytesMut {
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        buf
    }

    #[test]
    fn delivers_and_counts() {
        let (outbound, _rx) = Outbound::channel();
        let dispatcher = InboundDispatcher::new(outbound);
        let mut sink = Recording::default();
        let time = TimeUpdate {
            world_age: 100,
            time_of_day: 6000,
        };
        let outcome = dispatcher
            .dispatch(id::TIME_UPDATE, &mut body(&time), &mut sink)
            .unwrap();
        assert_eq!(outcome, Dispatched::Delivered);
        assert_eq!(sink.0, vec![ClientboundPacket::TimeUpdate(time)]);
        assert_eq!(dispatcher.received(), 1);
    }

    #[test]
    fn keep_alive_is_echoed_without_the_sink() {
        let (outbound, mut rx) = Outbound::channel();
        let dispatcher = InboundDispatcher::new(outbound);
        let mut sink = Recording::default();
        let outcome = dispatcher
            .dispatch(id::KEEP_ALIVE, &mut body(&KeepAlive { id: 42 }), &mut sink)
            .unwrap();
        assert_eq!(outcome, Dispatched::KeepAlive);
        assert!(sink.0.is_empty());
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerboundPacket::KeepAlive(KeepAlive { id: 42 })
        );
    }

    #[test]
    fn compression_is_reported() {
        let (outbound, _rx) = Outbound::channel();
        let dispatcher = InboundDispatcher::new(outbound);
        let outcome = dispatcher
            .dispatch(
                id::SET_COMPRESSION,
                &mut body(&SetCompression { threshold: 256 }),
                &mut Recording::default(),
            )
            .unwrap();
        assert_eq!(outcome, Dispatched::Compression(256));
    }

    #[test]
    fn unknown_and_malformed_differ() {
        let (outbound, _rx) = Outbound::channel();
        let dispatcher = InboundDispatcher::new(outbound);
        let mut sink = Recording::default();

        let err = dispatcher
            .dispatch(0x7E, &mut BytesMut::new(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownPacket(0x7E)));

        let err = dispatcher
            .dispatch(id::TIME_UPDATE, &mut BytesMut::from(&[0u8; 3][..]), &mut sink)
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Decode {
                id: id::TIME_UPDATE,
                ..
            }
        ));
        assert_eq!(dispatcher.received(), 0);
        assert!(sink.0.is_empty());
    }

    fn handler() -> PlayHandler {
        use crate::resource::{LocalPackFetcher, PackPolicy};
        let (outbound, _rx) = Outbound::channel();
        PlayHandler::new(
            outbound,
            TaskQueue::new(),
            PackPolicy::Enabled,
            std::sync::Arc::new(LocalPackFetcher::new("saves")),
        )
    }

    fn time(world_age: i64) -> ClientboundPacket {
        ClientboundPacket::TimeUpdate(TimeUpdate {
            world_age,
            time_of_day: 0,
        })
    }

    fn join() -> ClientboundPacket {
        ClientboundPacket::JoinGame(mc_sync_proto::packets::JoinGame {
            entity_id: 1,
            game_mode: 0,
            dimension: 0,
            difficulty: 1,
            max_players: 8,
            level_type: "flat".into(),
            reduced_debug_info: false,
        })
    }

    #[test]
    fn simulation_thread_applies_inline() {
        let mut h = handler();
        let queue = h.tasks().clone();
        queue.bind_current_thread();
        QueueSink::new(queue.clone()).deliver(join()).unwrap();
        assert_eq!(queue.len(), 1);

        let mut sink = QueueSink::inline(&mut h);
        sink.deliver(time(40)).unwrap();
        drop(sink);
        // The queued join ran first, then the update applied in place.
        assert!(queue.is_empty());
        assert_eq!(h.world().map(|w| w.world_age), Some(40));
    }

    #[test]
    fn other_threads_post() {
        let mut h = handler();
        let queue = h.tasks().clone();
        queue.bind_current_thread();
        let remote = queue.clone();
        std::thread::spawn(move || {
            let mut sink = QueueSink::new(remote);
            sink.deliver(join()).unwrap();
            sink.deliver(time(7)).unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(queue.len(), 2);
        assert!(h.world().is_none());
        assert_eq!(queue.drain(&mut h), 2);
        assert_eq!(h.world().map(|w| w.world_age), Some(7));
    }

    #[test]
    fn unbound_thread_posts_even_with_handler() {
        let mut h = handler();
        let queue = h.tasks().clone();
        QueueSink::inline(&mut h).deliver(join()).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(h.world().is_none());
    }

    #[test]
    fn closed_queue_is_an_error() {
        let (outbound, _rx) = Outbound::channel();
        let dispatcher = InboundDispatcher::new(outbound);
        let queue = TaskQueue::<PlayHandler>::new();
        queue.close();
        let mut sink = QueueSink::new(queue);
        let err = dispatcher
            .dispatch(
                id::TIME_UPDATE,
                &mut body(&TimeUpdate {
                    world_age: 0,
                    time_of_day: 0,
                }),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::Queue(_)));
    }
}
