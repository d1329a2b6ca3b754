use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use mc_sync_proto::types::BlockPos;
use mc_sync_server::clock::SystemClock;
use mc_sync_server::config::{ConfigError, ServerConfig};
use mc_sync_server::console;
use mc_sync_server::jobs::JobList;
use mc_sync_server::network::{FrameSettings, TcpNetwork};
use mc_sync_server::persistence::JsonPersistence;
use mc_sync_server::world::EntityIds;
use mc_sync_server::{FlatWorld, ServerContext, ServerError, TickScheduler, TickSettings};
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let (config, missing) = match ServerConfig::load("server.toml") {
        Ok(c) => (c, false),
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            (ServerConfig::default(), true)
        }
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
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
        warn!("server.toml not found, using defaults");
    }
    info!("MC-Sync server v{}", env!("CARGO_PKG_VERSION"));

    let addr: SocketAddr = match format!("{}:{}", config.network.address, config.network.port).parse() {
        Ok(a) => a,
        Err(e) => {
            error!("Invalid bind address: {e}");
            std::process::exit(1);
        }
    };
    let settings = FrameSettings {
        compression_threshold: config.network.compression_threshold,
        max_frame_len: config.network.max_frame_len,
    };
    let network = match TcpNetwork::bind(addr, settings).await {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    let data_dir = PathBuf::from(&config.world.data_dir).join(&config.world.name);
    let persistence = JsonPersistence::new(&data_dir);
    let [x, y, z] = config.world.spawn;
    let ids = EntityIds::default();
    let mut overworld = FlatWorld::new(
        0,
        config.world.name.clone(),
        BlockPos::new(x, y, z),
        config.world.view_distance,
        config.world.seed,
        ids.clone(),
    );
    match persistence.load(0) {
        Ok(Some(snapshot)) => overworld.restore(&snapshot),
        Ok(None) => info!("No saved world in {}, starting fresh", data_dir.display()),
        Err(e) => {
            error!("Failed to load world from {}: {e}", data_dir.display());
            std::process::exit(1);
        }
    }
    let mut ctx = ServerContext::new(ids);
    ctx.add_dimension(Box::new(overworld));

    let mut scheduler = TickScheduler::new(
        TickSettings::from(&config.tick),
        Box::new(SystemClock),
        ctx,
        Box::new(network),
    )
    .with_persistence(Box::new(persistence))
    .with_jobs(JobList::standard());

    let running = scheduler.running_flag();
    let tasks = scheduler.tasks().clone();

    // Handle Ctrl+C
    let running_ctrlc = running.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        running_ctrlc.store(false, Ordering::Release);
    });

    // Console REPL: read lines from stdin, run them between ticks
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line == "stop" {
                running.store(false, Ordering::Release);
                break;
            }
            let handle = match tasks.submit(move |ctx| console::execute(ctx, &line)) {
                Ok(h) => h,
                Err(e) => {
                    warn!("Console unavailable: {e}");
                    break;
                }
            };
            match handle.wait().await {
                Ok(reply) => info!("{reply}"),
                Err(e) => warn!("Command failed: {e}"),
            }
        }
    });

    let result = tokio::task::spawn_blocking(move || {
        let result = scheduler.run();
        let stats = scheduler.stats();
        info!(
            "Ran {} tick(s), mean tick {:?}, {} overload warning(s)",
            scheduler.tick(),
            stats.mean_tick(),
            stats.skipped_warnings
        );
        result
    })
    .await;

    match result {
        Ok(Ok(())) => info!("Server stopped."),
        Ok(Err(ServerError::Crashed { report })) => {
            if let Some(path) = report {
                error!("Server crashed, see {}", path.display());
            }
            std::process::exit(1);
        }
        Ok(Err(e)) => {
            error!("Server failed: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Simulation thread failed: {e}");
            std::process::exit(1);
        }
    }
}
