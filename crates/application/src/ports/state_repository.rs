//! Local state repository port.

use crate::store::LocalState;

/// Error type for local state persistence.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The state file exists but does not hold a valid state.
    #[error("Invalid state file: {0}")]
    Invalid(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system error.
    #[error("File system error: {0}")]
    FileSystem(String),
}

/// Repository for the persistent part of the local state.
pub trait StateRepository: Send + Sync {
    /// Loads the saved state, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved state cannot be read or parsed.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<LocalState>, StateError>> + Send;

    /// Saves the state, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &LocalState) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}
