use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::snapshot::PersistedState;

use super::traits::SnapshotStore;

/// Pretty-printed JSON snapshot on disk (native only, not WASM).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    /// A missing file is an empty tracker, not an error.
    fn load(&self) -> Result<Option<PersistedState>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        let state: PersistedState = serde_json::from_str(&text).map_err(|e| {
            CoreError::Deserialization(format!(
                "Failed to parse snapshot {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(state))
    }

    /// Writes a sibling `.tmp` file and renames it over the target, so a
    /// crash mid-write leaves the previous snapshot intact.
    fn save(&mut self, state: &PersistedState) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
