use mc_sync_proto::packets::ServerboundPacket;
use tokio::sync::mpsc;
use tracing::debug;

/// Fire-and-forget sender for serverbound packets.
///
/// Sending never blocks; packets queued after the writer has gone away are
/// discarded.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::UnboundedSender<ServerboundPacket>,
}

impl Outbound {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerboundPacket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, packet: ServerboundPacket) {
        if self.tx.send(packet).is_err() {
            debug!("Outbound channel closed, dropping packet");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
