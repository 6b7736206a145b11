//! Local persistence of the last good provider payload.
//!
//! The payload is stored verbatim as JSON in a single well-known file inside
//! the data directory. It is written after every successful fetch or manual
//! override and read once at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

/// File name of the persisted payload inside the data directory.
pub const SNAPSHOT_FILE: &str = "WeatherStationValues.json";

#[derive(Debug, Clone)]
pub struct PersistenceStore {
    data_dir: PathBuf,
}

impl PersistenceStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the persisted payload. `Ok(None)` means nothing was ever saved.
    pub fn load(&self) -> Result<Option<Value>> {
        let path = self.path();
        if !path.exists() {
            debug!(path = %path.display(), "No persisted weather payload");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read persisted payload: {}", path.display()))?;

        let payload: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse persisted payload: {}", path.display()))?;

        Ok(Some(payload))
    }

    /// Overwrite the persisted payload.
    pub fn save(&self, payload: &Value) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory: {}", self.data_dir.display())
        })?;

        let path = self.path();
        let contents = serde_json::to_string_pretty(payload)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write persisted payload: {}", path.display()))?;

        debug!(path = %path.display(), "Persisted weather payload");
        Ok(())
    }
}
