//! Tokio side of the connection: framing, compression, and the writer task.

use std::sync::Arc;

use bytes::BytesMut;
use mc_sync_proto::frame::{decode_frame, encode_frame, split_packet_id, FrameConfig};
use mc_sync_proto::packets::ServerboundPacket;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatched, InboundDispatcher, PacketSink};
use crate::error::ConnectionError;

const READ_CHUNK: usize = 8 * 1024;

pub async fn connect(address: &str, port: u16) -> Result<TcpStream, ConnectionError> {
    let stream = TcpStream::connect((address, port)).await?;
    stream.set_nodelay(true)?;
    info!("Connected to {address}:{port}");
    Ok(stream)
}

/// Drive one connection until the remote closes it, a fatal protocol error
/// occurs, or `shutdown` flips to true (or its sender is dropped).
///
/// Inbound frames are decoded here and handed to `sink`. Serverbound
/// packets arrive on `outbound` and are framed with whatever compression
/// threshold is current when they are written.
pub async fn run_connection<S, K>(
    stream: S,
    dispatcher: Arc<InboundDispatcher>,
    mut sink: K,
    outbound: mpsc::UnboundedReceiver<ServerboundPacket>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    K: PacketSink,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let mut config = FrameConfig::default();
    let (config_tx, config_rx) = watch::channel(config.clone());
    let writer_task = tokio::spawn(write_loop(writer, outbound, config_rx));

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let result = loop {
        buf.reserve(READ_CHUNK);
        tokio::select! {
            read = reader.read_buf(&mut buf) => {
                match read {
                    Ok(0) => break Err(ConnectionError::Closed),
                    Ok(_) => {}
                    Err(e) => break Err(e.into()),
                }
                if let Err(e) = drain_frames(&mut buf, &mut config, &config_tx, &dispatcher, &mut sink) {
                    break Err(e);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("Connection closing on shutdown");
                    break Ok(());
                }
            }
        }
    };

    writer_task.abort();
    info!(
        "Connection finished after {} packets",
        dispatcher.received()
    );
    result
}

fn drain_frames(
    buf: &mut BytesMut,
    config: &mut FrameConfig,
    config_tx: &watch::Sender<FrameConfig>,
    dispatcher: &InboundDispatcher,
    sink: &mut impl PacketSink,
) -> Result<(), ConnectionError> {
    while let Some(frame) = decode_frame(buf, config)? {
        let (packet_id, mut body) = split_packet_id(frame)?;
        if let Dispatched::Compression(threshold) = dispatcher.dispatch(packet_id, &mut body, sink)? {
            // Frames after SetCompression use the new format, including any
            // already sitting in `buf`.
            config.set_threshold(threshold);
            config_tx.send_replace(config.clone());
            debug!("Compression threshold set to {threshold}");
        }
    }
    Ok(())
}

async fn write_loop<S: AsyncWrite>(
    mut writer: WriteHalf<S>,
    mut outbound: mpsc::UnboundedReceiver<ServerboundPacket>,
    config: watch::Receiver<FrameConfig>,
) {
    while let Some(packet) = outbound.recv().await {
        let frame = {
            let config = config.borrow();
            encode_frame(&packet.to_bytes(), &config)
        };
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to frame packet 0x{:02X}: {e}", packet.packet_id());
                continue;
            }
        };
        if let Err(e) = writer.write_all(&frame).await {
            warn!("Write failed: {e}");
            return;
        }
    }
    let _ = writer.shutdown().await;
}
