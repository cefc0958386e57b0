//! Log source reading an exported JSON array of log rows from disk.

use std::path::{Path, PathBuf};

use bodymap_core::error::CoreError;
use bodymap_core::health_log::{HealthLog, LogSource};

/// Reads the whole file on every fetch; the file is the source of truth.
#[derive(Debug, Clone)]
pub struct JsonFileLogSource {
    path: PathBuf,
}

impl JsonFileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for JsonFileLogSource {
    fn fetch_logs(&self) -> Result<Vec<HealthLog>, CoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;

        let logs: Vec<HealthLog> = serde_json::from_str(&contents)
            .map_err(|e| CoreError::Decode(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), count = logs.len(), "Fetched logs");
        Ok(logs)
    }
}
