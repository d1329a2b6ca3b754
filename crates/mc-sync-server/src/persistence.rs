//! World snapshots saved as JSON, one file per dimension.

use std::path::{Path, PathBuf};

use mc_sync_proto::types::{BlockPos, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub name: String,
    pub dimension: i32,
    pub tick: u64,
    pub world_age: i64,
    pub time_of_day: i64,
    pub spawn: BlockPos,
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub kind: u8,
    pub position: Vec3,
    pub yaw: f32,
}

/// Receives whole-world snapshots from the scheduler. Calls never overlap.
pub trait Persistence: Send {
    fn save(&mut self, snapshots: &[WorldSnapshot]) -> Result<(), PersistenceError>;
}

pub struct JsonPersistence {
    root: PathBuf,
}

impl JsonPersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, dimension: i32) -> PathBuf {
        self.root.join(format!("DIM{dimension}.json"))
    }

    /// `Ok(None)` when the dimension has never been saved.
    pub fn load(&self, dimension: i32) -> Result<Option<WorldSnapshot>, PersistenceError> {
        let data = match std::fs::read_to_string(self.path(dimension)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }
}

impl Persistence for JsonPersistence {
    fn save(&mut self, snapshots: &[WorldSnapshot]) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.root)?;
        for snapshot in snapshots {
            let path = self.path(snapshot.dimension);
            let tmp = path.with_extension("json.tmp");
            let json = serde_json::to_string_pretty(snapshot)?;
            std::fs::write(&tmp, json)?;
            std::fs::rename(&tmp, &path)?;
            debug!("Saved {} to {}", snapshot.name, path.display());
        }
        Ok(())
    }
}
