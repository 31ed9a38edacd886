//! Periodic JSON snapshot files
//!
//! Every N turns the engine serializes the published [`WorldSnapshot`] under
//! `<output_dir>/<scenario>/turn_NNNNNN.json`. The files are write-only
//! telemetry for external tooling; the engine never reads them back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{World, WorldSnapshot};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Turns between snapshots; 0 disables them.
    pub interval: u64,
    pub output_dir: String,
}

impl SnapshotConfig {
    pub fn with_output_dir(mut self, dir: String) -> Self {
        self.output_dir = dir;
        self
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval: 20,
            output_dir: "snapshots".to_string(),
        }
    }
}

/// On-disk envelope around a world snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub generated_at: String,
    pub snapshot: WorldSnapshot,
}

pub struct SnapshotManager {
    config: SnapshotConfig,
}

impl SnapshotManager {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    pub fn maybe_snapshot(
        &self,
        turn: u64,
        scenario_name: &str,
        world: &World,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.config.interval == 0 || turn % self.config.interval != 0 {
            return Ok(None);
        }

        let dir = Path::new(&self.config.output_dir).join(scenario_name);
        fs::create_dir_all(&dir)?;
        let file_path = dir.join(format!("turn_{turn:06}.json"));
        let payload = SnapshotFile {
            generated_at: chrono::Local::now().to_rfc3339(),
            snapshot: world.snapshot(scenario_name),
        };
        fs::write(&file_path, serde_json::to_string_pretty(&payload)?)?;
        Ok(Some(file_path))
    }
}
