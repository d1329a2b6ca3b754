use std::sync::Arc;

use mc_sync_client::config::{ClientConfig, ConfigError};
use mc_sync_client::dispatch::InboundDispatcher;
use mc_sync_client::handler::PlayHandler;
use mc_sync_client::net;
use mc_sync_client::outbound::Outbound;
use mc_sync_client::resource::LocalPackFetcher;
use mc_sync_client::session::ClientSession;
use mc_sync_client::ConnectionError;
use mc_sync_tasks::TaskQueue;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let (config, missing) = match ClientConfig::load("client.toml") {
        Ok(c) => (c, false),
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            (ClientConfig::default(), true)
        }
        Err(e) => {
            eprintln!("Failed to load client.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if missing {
        warn!("client.toml not found, using defaults");
    }
    info!(
        "MC-Sync client v{} connecting to {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.connection.address,
        config.connection.port
    );

    let stream = match net::connect(&config.connection.address, config.connection.port).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to connect: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Handle Ctrl+C
    let shutdown_tx_ctrlc = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx_ctrlc.send(true);
    });

    let (outbound, outbound_rx) = Outbound::channel();
    let handler = PlayHandler::new(
        outbound.clone(),
        TaskQueue::new(),
        config.resource_packs.policy,
        Arc::new(LocalPackFetcher::new(&config.resource_packs.saves_dir)),
    );
    let session = ClientSession::new(handler);
    let dispatcher = Arc::new(InboundDispatcher::new(outbound));

    let sink = session.sink();
    let connection_rx = shutdown_rx.clone();
    let shutdown_tx_conn = shutdown_tx.clone();
    tokio::spawn(async move {
        match net::run_connection(stream, dispatcher, sink, outbound_rx, connection_rx).await {
            Ok(()) => {}
            Err(ConnectionError::Closed) => info!("Server closed the connection"),
            Err(e) => error!("Connection failed: {e}"),
        }
        let _ = shutdown_tx_conn.send(true);
    });

    match tokio::task::spawn_blocking(move || session.run(shutdown_rx)).await {
        Ok(handler) => {
            if let Some(reason) = handler.disconnect_reason() {
                info!("Disconnected: {reason}");
            }
        }
        Err(e) => error!("Simulation thread failed: {e}"),
    }
    let _ = shutdown_tx.send(true);
    info!("Client shut down.");
}
