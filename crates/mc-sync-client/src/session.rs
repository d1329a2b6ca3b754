//! The client's simulation thread: drains marshalled work, then advances the replica.

use std::time::Duration;

use mc_sync_tasks::TaskQueue;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::dispatch::QueueSink;
use crate::handler::PlayHandler;

/// One client frame at 20 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

pub struct ClientSession {
    handler: PlayHandler,
    tasks: TaskQueue<PlayHandler>,
    frames: u64,
}

impl ClientSession {
    pub fn new(handler: PlayHandler) -> Self {
        let tasks = handler.tasks().clone();
        Self {
            handler,
            tasks,
            frames: 0,
        }
    }

    /// Sink for the connection's reader.
    pub fn sink(&self) -> QueueSink<'static> {
        QueueSink::new(self.tasks.clone())
    }

    pub fn handler(&self) -> &PlayHandler {
        &self.handler
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run everything queued since the last frame, then tick the replica.
    /// Returns how many tasks ran.
    pub fn frame(&mut self) -> usize {
        let ran = self.tasks.drain(&mut self.handler);
        if let Some(world) = self.handler.world_mut() {
            world.tick();
        }
        self.frames += 1;
        ran
    }

    /// Blocking frame loop. Binds the calling thread as the simulation
    /// thread and returns the handler once shut down or disconnected.
    pub fn run(mut self, shutdown: watch::Receiver<bool>) -> PlayHandler {
        self.tasks.bind_current_thread();
        info!("Client session started");

        loop {
            if *shutdown.borrow() {
                debug!("Session stopping on shutdown");
                break;
            }
            self.frame();
            if let Some(reason) = self.handler.disconnect_reason() {
                info!("Session ended: {reason}");
                break;
            }
            std::thread::sleep(FRAME_INTERVAL);
        }

        self.tasks.close();
        info!("Client session stopped after {} frames", self.frames);
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::PacketSink;
    use crate::outbound::Outbound;
    use crate::resource::{LocalPackFetcher, PackPolicy};
    use mc_sync_proto::packets::{ClientboundPacket, Disconnect, JoinGame, TimeUpdate};
    use std::sync::Arc;

    fn session() -> ClientSession {
        let (outbound, _rx) = Outbound::channel();
        let handler = PlayHandler::new(
            outbound,
            TaskQueue::new(),
            PackPolicy::Enabled,
            Arc::new(LocalPackFetcher::new("saves")),
        );
        ClientSession::new(handler)
    }

    fn join() -> ClientboundPacket {
        ClientboundPacket::JoinGame(JoinGame {
            entity_id: 3,
            game_mode: 0,
            dimension: 0,
            difficulty: 1,
            max_players: 8,
            level_type: "flat".into(),
            reduced_debug_info: false,
        })
    }

    #[test]
    fn frame_applies_queued_packets_in_order() {
        let mut session = session();
        let mut sink = session.sink();
        sink.deliver(join()).unwrap();
        sink.deliver(ClientboundPacket::TimeUpdate(TimeUpdate {
            world_age: 40,
            time_of_day: 1000,
        }))
        .unwrap();

        assert_eq!(session.frame(), 2);
        let world = session.handler().world().unwrap();
        assert_eq!(world.world_age, 40);
        assert_eq!(session.frame(), 0);
        assert_eq!(session.frames(), 2);
    }

    #[test]
    fn run_stops_on_shutdown() {
        let session = session();
        let sink = session.sink();
        let (_tx, rx) = watch::channel(true);
        let handler = session.run(rx);
        assert!(handler.world().is_none());
        assert!(handler.tasks().is_closed());
        assert!(matches!(
            sink.clone().deliver(join()),
            Err(crate::error::DispatchError::Queue(_))
        ));
    }

    #[test]
    fn run_stops_on_disconnect() {
        let session = session();
        let mut sink = session.sink();
        sink.deliver(join()).unwrap();
        sink.deliver(ClientboundPacket::Disconnect(Disconnect::with_text("kicked")))
            .unwrap();
        let (_tx, rx) = watch::channel(false);
        let handler = session.run(rx);
        assert!(handler.disconnect_reason().is_some());
    }
}
