use serde::Deserialize;
use std::path::Path;

use crate::resource::PackPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub resource_packs: ResourcePackSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionSection {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    25565
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResourcePackSection {
    #[serde(default)]
    pub policy: PackPolicy,
    /// Directory that `level://` pack URLs resolve against.
    #[serde(default = "default_saves_dir")]
    pub saves_dir: String,
}

fn default_saves_dir() -> String {
    "saves".into()
}

impl Default for ResourcePackSection {
    fn default() -> Self {
        Self {
            policy: PackPolicy::default(),
            saves_dir: default_saves_dir(),
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

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
