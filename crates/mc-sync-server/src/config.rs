use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub tick: TickSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Packets at least this long are compressed. Negative disables compression.
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: i32,
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

fn default_address() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    25565
}

fn default_compression_threshold() -> i32 {
    256
}

fn default_max_frame_len() -> usize {
    mc_sync_proto::frame::DEFAULT_MAX_FRAME_LEN
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            compression_threshold: default_compression_threshold(),
            max_frame_len: default_max_frame_len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickSection {
    /// Length of one simulation step.
    #[serde(default = "default_quantum_ms")]
    pub quantum_ms: i64,
    /// Elapsed time above this is discarded.
    #[serde(default = "default_max_catchup_ms")]
    pub max_catchup_ms: i64,
    #[serde(default = "default_warn_cooldown_ms")]
    pub warn_cooldown_ms: i64,
    #[serde(default = "default_min_sleep_ms")]
    pub min_sleep_ms: i64,
    /// Ticks between autosaves. 0 = disabled.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: u64,
    #[serde(default = "default_time_sync_interval")]
    pub time_sync_interval: u64,
    /// Number of recent ticks kept for timing statistics.
    #[serde(default = "default_tick_window")]
    pub tick_window: usize,
}

fn default_quantum_ms() -> i64 {
    50
}

fn default_max_catchup_ms() -> i64 {
    2000
}

fn default_warn_cooldown_ms() -> i64 {
    15000
}

fn default_min_sleep_ms() -> i64 {
    1
}

fn default_autosave_interval() -> u64 {
    900
}

fn default_time_sync_interval() -> u64 {
    20
}

fn default_tick_window() -> usize {
    100
}

impl Default for TickSection {
    fn default() -> Self {
        Self {
            quantum_ms: default_quantum_ms(),
            max_catchup_ms: default_max_catchup_ms(),
            warn_cooldown_ms: default_warn_cooldown_ms(),
            min_sleep_ms: default_min_sleep_ms(),
            autosave_interval: default_autosave_interval(),
            time_sync_interval: default_time_sync_interval(),
            tick_window: default_tick_window(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_world_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_spawn")]
    pub spawn: [i32; 3],
    /// Radius in chunks sent to a joining player.
    #[serde(default = "default_view_distance")]
    pub view_distance: i32,
    #[serde(default)]
    pub seed: u64,
}

fn default_world_name() -> String {
    "world".into()
}

fn default_data_dir() -> String {
    "worlds".into()
}

fn default_spawn() -> [i32; 3] {
    [0, 4, 0]
}

fn default_view_distance() -> i32 {
    4
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            data_dir: default_data_dir(),
            spawn: default_spawn(),
            view_distance: default_view_distance(),
            seed: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
