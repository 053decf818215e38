//! Ports of the application core.
//!
//! The local store depends on a clock and a notifier; the sync client on a
//! remote document store and an identity provider; the binary on a state
//! repository. Adapters live in the infrastructure crate.

mod clock;
mod document_store;
mod identity_provider;
mod notifier;
mod state_repository;

pub use clock::Clock;
pub use document_store::{
    BatchOp, CollectionRef, Document, DocumentRef, DocumentStore, Fields, Query, SnapshotReceiver,
    SortDirection, StoreError,
};
pub use identity_provider::{AuthError, IdentityProvider};
pub use notifier::{Notification, Notifier};
pub use state_repository::{StateError, StateRepository};
