//! Server resource pack requests.
//!
//! Loading the pack itself belongs to the presentation layer; this module
//! only locates it. Fetches run off the simulation thread and report back
//! through the task queue.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use serde::Deserialize;

/// Scheme for packs bundled with a local save.
pub const LEVEL_SCHEME: &str = "level://";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported pack location '{0}'")]
    Unsupported(String),
    #[error("pack not found at {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<PathBuf, FetchError>> + Send>>;

/// Locates a resource pack. Implementations must not block.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, url: &str, hash: &str) -> FetchFuture;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackPolicy {
    #[default]
    Enabled,
    Disabled,
}

/// Resolves `level://<name>` against a saves directory. Remote URLs are
/// not supported.
#[derive(Debug, Clone)]
pub struct LocalPackFetcher {
    saves_dir: PathBuf,
}

impl LocalPackFetcher {
    pub fn new(saves_dir: impl Into<PathBuf>) -> Self {
        Self {
            saves_dir: saves_dir.into(),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let name = url
            .strip_prefix(LEVEL_SCHEME)
            .ok_or_else(|| FetchError::Unsupported(url.to_string()))?;
        let relative = Path::new(name);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(FetchError::Unsupported(url.to_string()));
        }
        Ok(self.saves_dir.join(relative))
    }
}

impl ResourceFetcher for LocalPackFetcher {
    fn fetch(&self, url: &str, _hash: &str) -> FetchFuture {
        let resolved = self.resolve(url);
        Box::pin(async move {
            let path = resolved?;
            let meta = tokio::fs::metadata(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::NotFound(path.clone())
                } else {
                    FetchError::Io(e)
                }
            })?;
            if !meta.is_file() {
                return Err(FetchError::NotFound(path));
            }
            Ok(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_escapes() {
        let fetcher = LocalPackFetcher::new("/saves");
        assert_eq!(
            fetcher.resolve("level://world/resources.zip").unwrap(),
            PathBuf::from("/saves/world/resources.zip")
        );
        assert!(fetcher.resolve("level://../etc/passwd").is_err());
        assert!(fetcher.resolve("level://").is_err());
        assert!(fetcher.resolve("http://example.com/pack.zip").is_err());
    }

    #[tokio::test]
    async fn fetch_finds_existing_file() {
        let dir = std::env::temp_dir().join(format!("mc-sync-pack-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("pack.zip"), b"PK").await.unwrap();

        let fetcher = LocalPackFetcher::new(&dir);
        let path = fetcher.fetch("level://pack.zip", "").await.unwrap();
        assert_eq!(path, dir.join("pack.zip"));
        assert!(matches!(
            fetcher.fetch("level://missing.zip", "").await,
            Err(FetchError::NotFound(_))
        ));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
