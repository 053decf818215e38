//! Application error types

use courier_domain::DomainError;
use thiserror::Error;

use crate::ports::{AuthError, StateError, StoreError};
use crate::sync::SyncError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A remote sync operation failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The document store failed outside of a sync operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The identity provider failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Local state could not be loaded or saved.
    #[error("persistence error: {0}")]
    Persistence(#[from] StateError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
