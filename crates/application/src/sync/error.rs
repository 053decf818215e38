//! Remote sync errors.

use thiserror::Error;

use crate::ports::{AuthError, StoreError};

/// Errors raised by the sync client.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A write was attempted while nobody is signed in.
    #[error("no user is signed in")]
    NotSignedIn,

    /// Sign-out was requested without an active session.
    #[error("no user has logged in")]
    NoActiveSession,

    /// A remote write, delete or batch failed.
    #[error("{operation} failed: {source}")]
    StoreWrite {
        /// The client operation that issued the write.
        operation: &'static str,
        /// The store failure.
        source: StoreError,
    },

    /// Opening a live subscription failed.
    #[error("subscribing to {collection} failed: {source}")]
    Subscribe {
        /// Path of the collection.
        collection: String,
        /// The store failure.
        source: StoreError,
    },

    /// The identity provider failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An entity could not be encoded as a document.
    #[error("encoding document failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
