//! File based local state repository.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use courier_application::LocalState;
use courier_application::ports::{StateError, StateRepository};

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

const APP_DIR: &str = "courier";
const STATE_FILE: &str = "state.json";

/// Stores the local state as one pretty-printed JSON file.
pub struct FileStateRepository {
    path: PathBuf,
}

impl FileStateRepository {
    /// Creates a repository writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default state file in the platform config directory.
    #[must_use]
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(STATE_FILE))
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateRepository for FileStateRepository {
    async fn load(&self) -> Result<Option<LocalState>, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved state");
                return Ok(None);
            }
            Err(e) => return Err(StateError::FileSystem(e.to_string())),
        };

        let state = from_json_bytes(&bytes).map_err(|e| match e {
            SerializationError::Deserialize(e) => StateError::Invalid(e.to_string()),
            other => StateError::Serialization(other.to_string()),
        })?;
        tracing::debug!(path = %self.path.display(), "state loaded");
        Ok(Some(state))
    }

    async fn save(&self, state: &LocalState) -> Result<(), StateError> {
        let bytes =
            to_json_stable_bytes(state).map_err(|e| StateError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::FileSystem(e.to_string()))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StateError::FileSystem(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
