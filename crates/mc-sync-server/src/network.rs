//! Network pump: the scheduler's only contact with sockets.
//!
//! Connections are served by tokio tasks that decode frames and push events
//! into a channel. The simulation thread calls [`NetworkPump::pump`] once per
//! step to flush queued packets and collect whatever arrived.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::BytesMut;
use mc_sync_proto::frame::{decode_frame, encode_frame, split_packet_id, FrameConfig};
use mc_sync_proto::packets::{ClientboundPacket, Disconnect, ServerboundPacket, SetCompression};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type ConnId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub conn: ConnId,
    pub packet: ClientboundPacket,
}

/// Packets produced during a step, flushed by the pump at its end.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Outgoing>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, conn: ConnId, packet: ClientboundPacket) {
        self.queued.push(Outgoing { conn, packet });
    }

    pub fn broadcast<I>(&mut self, conns: I, packet: &ClientboundPacket)
    where
        I: IntoIterator<Item = ConnId>,
    {
        for conn in conns {
            self.push(conn, packet.clone());
        }
    }

    pub fn take(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.queued)
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outgoing> {
        self.queued.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Connected(ConnId),
    Packet(ConnId, ServerboundPacket),
    Disconnected(ConnId, String),
}

pub trait NetworkPump: Send {
    /// Flush `outgoing`, then return everything received since the last call.
    fn pump(&mut self, outgoing: Vec<Outgoing>) -> Vec<NetworkEvent>;

    /// Close every connection and stop accepting new ones.
    fn shutdown(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct FrameSettings {
    /// Negative disables compression.
    pub compression_threshold: i32,
    pub max_frame_len: usize,
}

/// Why a connection's reader stopped.
enum ReadFailure {
    Io(String),
    /// The peer sent something undecodable; it is told why before the socket closes.
    Protocol(String),
}

enum Inbound {
    Connected(ConnId, mpsc::UnboundedSender<ClientboundPacket>),
    Packet(ConnId, ServerboundPacket),
    Disconnected(ConnId, String),
}

pub struct TcpNetwork {
    local_addr: SocketAddr,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    connections: HashMap<ConnId, mpsc::UnboundedSender<ClientboundPacket>>,
    accept_task: JoinHandle<()>,
}

impl TcpNetwork {
    /// Bind and start accepting. Must be called inside a tokio runtime.
    pub async fn bind(addr: SocketAddr, settings: FrameSettings) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {local_addr}");

        let (tx, inbound) = mpsc::unbounded_channel();
        let accept_task = tokio::spawn(accept_loop(listener, settings, tx));
        Ok(Self {
            local_addr,
            inbound,
            connections: HashMap::new(),
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl NetworkPump for TcpNetwork {
    fn pump(&mut self, outgoing: Vec<Outgoing>) -> Vec<NetworkEvent> {
        for Outgoing { conn, packet } in outgoing {
            match self.connections.get(&conn) {
                Some(tx) => {
                    if tx.send(packet).is_err() {
                        debug!("Connection {conn} writer gone, dropping packet");
                    }
                }
                None => debug!("No connection {conn}, dropping packet"),
            }
        }

        let mut events = Vec::new();
        while let Ok(inbound) = self.inbound.try_recv() {
            events.push(match inbound {
                Inbound::Connected(conn, tx) => {
                    self.connections.insert(conn, tx);
                    NetworkEvent::Connected(conn)
                }
                Inbound::Packet(conn, packet) => NetworkEvent::Packet(conn, packet),
                Inbound::Disconnected(conn, reason) => {
                    self.connections.remove(&conn);
                    NetworkEvent::Disconnected(conn, reason)
                }
            });
        }
        events
    }

    fn shutdown(&mut self) {
        self.accept_task.abort();
        // Dropping the senders ends each writer task, which closes its socket.
        let closed = self.connections.len();
        self.connections.clear();
        info!("Network closed ({closed} connection(s))");
    }
}

async fn accept_loop(
    listener: TcpListener,
    settings: FrameSettings,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    let next_id = AtomicU32::new(1);
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let conn = next_id.fetch_add(1, Ordering::Relaxed);
                debug!("Connection {conn} from {peer}");
                spawn_connection(conn, stream, settings.clone(), inbound.clone());
            }
            Err(e) => {
                warn!("Accept error: {e}");
            }
        }
    }
}

fn spawn_connection(
    conn: ConnId,
    stream: TcpStream,
    settings: FrameSettings,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Connection {conn}: set_nodelay failed: {e}");
    }
    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();

    let mut config = FrameConfig {
        max_frame_len: settings.max_frame_len,
        ..FrameConfig::default()
    };
    let plain = config.clone();
    config.set_threshold(settings.compression_threshold);

    let kick = tx.clone();
    if inbound.send(Inbound::Connected(conn, tx)).is_err() {
        return;
    }
    let compression = settings.compression_threshold;
    tokio::spawn(write_loop(conn, writer, rx, plain, config.clone(), compression));
    tokio::spawn(async move {
        let reason = match read_loop(conn, reader, &config, &inbound).await {
            Ok(()) => "disconnected".to_string(),
            Err(ReadFailure::Io(e)) => e,
            Err(ReadFailure::Protocol(e)) => {
                warn!("Connection {conn}: {e}");
                // Queued ahead of the close, so the writer flushes it first.
                let _ = kick.send(ClientboundPacket::Disconnect(Disconnect::with_text(&e)));
                e
            }
        };
        drop(kick);
        let _ = inbound.send(Inbound::Disconnected(conn, reason));
    });
}

/// The first frame is SetCompression when enabled, sent uncompressed; every
/// later frame uses the threshold.
async fn write_loop(
    conn: ConnId,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<ClientboundPacket>,
    plain: FrameConfig,
    config: FrameConfig,
    compression_threshold: i32,
) {
    if compression_threshold >= 0 {
        let packet = ClientboundPacket::SetCompression(SetCompression {
            threshold: compression_threshold,
        });
        match encode_frame(&packet.to_bytes(), &plain) {
            Ok(frame) => {
                if writer.write_all(&frame).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("Connection {conn}: failed to frame SetCompression: {e}");
                return;
            }
        }
    }

    while let Some(packet) = rx.recv().await {
        let frame = match encode_frame(&packet.to_bytes(), &config) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Connection {conn}: failed to frame packet 0x{:02X}: {e}",
                    packet.packet_id()
                );
                continue;
            }
        };
        if let Err(e) = writer.write_all(&frame).await {
            debug!("Connection {conn}: write failed: {e}");
            return;
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_loop(
    conn: ConnId,
    mut reader: OwnedReadHalf,
    config: &FrameConfig,
    inbound: &mpsc::UnboundedSender<Inbound>,
) -> Result<(), ReadFailure> {
    let protocol = |e: mc_sync_proto::error::ProtoError| ReadFailure::Protocol(e.to_string());
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        let n = reader
            .read_buf(&mut buf)
            .await
            .map_err(|e| ReadFailure::Io(e.to_string()))?;
        if n == 0 {
            return Ok(());
        }
        while let Some(frame) = decode_frame(&mut buf, config).map_err(protocol)? {
            let (packet_id, mut body) = split_packet_id(frame).map_err(protocol)?;
            let packet = ServerboundPacket::decode(packet_id, &mut body).map_err(protocol)?;
            if inbound.send(Inbound::Packet(conn, packet)).is_err() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_sync_proto::packets::KeepAlive;
    use std::time::Duration;

    #[test]
    fn outbox_broadcast_and_take() {
        let mut outbox = Outbox::new();
        let packet = ClientboundPacket::KeepAlive(KeepAlive { id: 1 });
        outbox.broadcast([1, 2, 3], &packet);
        assert_eq!(outbox.len(), 3);
        let taken = outbox.take();
        assert_eq!(taken[2].conn, 3);
        assert!(outbox.is_empty());
    }

    async fn pump_until<F>(network: &mut TcpNetwork, mut outgoing: Vec<Outgoing>, done: F) -> Vec<NetworkEvent>
    where
        F: Fn(&NetworkEvent) -> bool,
    {
        let mut seen = Vec::new();
        for _ in 0..200 {
            let events = network.pump(std::mem::take(&mut outgoing));
            let finished = events.iter().any(&done);
            seen.extend(events);
            if finished {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out, saw {seen:?}");
    }

    async fn read_packet(stream: &mut TcpStream, buf: &mut BytesMut, config: &FrameConfig) -> ClientboundPacket {
        loop {
            if let Some(frame) = decode_frame(buf, config).unwrap() {
                let (id, mut body) = split_packet_id(frame).unwrap();
                return ClientboundPacket::decode(id, &mut body).unwrap();
            }
            let n = tokio::time::timeout(Duration::from_secs(5), stream.read_buf(buf))
                .await
                .unwrap()
                .unwrap();
            assert!(n > 0);
        }
    }

    #[tokio::test]
    async fn tcp_round_trip_with_compression() {
        let settings = FrameSettings {
            compression_threshold: 64,
            max_frame_len: 1 << 16,
        };
        let mut network = TcpNetwork::bind("127.0.0.1:0".parse().unwrap(), settings)
            .await
            .unwrap();
        let mut client = TcpStream::connect(network.local_addr()).await.unwrap();

        let events = pump_until(&mut network, Vec::new(), |e| matches!(e, NetworkEvent::Connected(_))).await;
        let NetworkEvent::Connected(conn) = events[0] else {
            panic!("expected connect, got {events:?}");
        };
        assert_eq!(network.connection_count(), 1);

        network.pump(vec![Outgoing {
            conn,
            packet: ClientboundPacket::KeepAlive(KeepAlive { id: 77 }),
        }]);

        let mut buf = BytesMut::new();
        let mut config = FrameConfig::default();
        assert_eq!(
            read_packet(&mut client, &mut buf, &config).await,
            ClientboundPacket::SetCompression(SetCompression { threshold: 64 })
        );
        config.set_threshold(64);
        assert_eq!(
            read_packet(&mut client, &mut buf, &config).await,
            ClientboundPacket::KeepAlive(KeepAlive { id: 77 })
        );

        let reply = ServerboundPacket::KeepAlive(KeepAlive { id: 77 });
        let frame = encode_frame(&reply.to_bytes(), &config).unwrap();
        client.write_all(&frame).await.unwrap();
        let events = pump_until(&mut network, Vec::new(), |e| matches!(e, NetworkEvent::Packet(..))).await;
        assert!(events.contains(&NetworkEvent::Packet(conn, reply)));

        drop(client);
        pump_until(&mut network, Vec::new(), |e| matches!(e, NetworkEvent::Disconnected(..))).await;
        assert_eq!(network.connection_count(), 0);
        network.shutdown();
    }

    #[tokio::test]
    async fn unknown_packet_is_answered_with_disconnect() {
        let settings = FrameSettings {
            compression_threshold: -1,
            max_frame_len: 1 << 16,
        };
        let mut network = TcpNetwork::bind("127.0.0.1:0".parse().unwrap(), settings)
            .await
            .unwrap();
        let mut client = TcpStream::connect(network.local_addr()).await.unwrap();
        pump_until(&mut network, Vec::new(), |e| matches!(e, NetworkEvent::Connected(_))).await;

        let config = FrameConfig::default();
        let frame = encode_frame(&[0x7E], &config).unwrap();
        client.write_all(&frame).await.unwrap();

        let events = pump_until(&mut network, Vec::new(), |e| matches!(e, NetworkEvent::Disconnected(..))).await;
        assert!(!events.iter().any(|e| matches!(e, NetworkEvent::Packet(..))));

        let mut buf = BytesMut::new();
        let ClientboundPacket::Disconnect(Disconnect { reason }) =
            read_packet(&mut client, &mut buf, &config).await
        else {
            panic!("expected a disconnect");
        };
        assert!(reason.contains("unknown packet id: 0x7E"), "{reason}");

        // The server closes its side once the reason is flushed.
        let n = tokio::time::timeout(Duration::from_secs(5), client.read_buf(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(n, 0);
        network.shutdown();
    }
}
