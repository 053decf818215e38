//! Courier Application - Use cases and ports
//!
//! This crate holds the application core of the Courier data layer:
//!
//! - [`ports`]: traits for the clock, notifications, the remote document
//!   store and the identity provider
//! - [`store`]: the local state store and its mutations
//! - [`sync`]: the remote sync client and the first-sync orchestrator
//! - [`services`]: entity services combining local mutations with sync

pub mod error;
pub mod ports;
pub mod services;
pub mod store;
pub mod sync;

pub use error::{ApplicationError, ApplicationResult};
pub use store::{LocalState, LocalStore, MoveRequest, Outcome, SaveRequestAs, Selection, SharedStore};
pub use sync::{SyncClient, SyncError, SyncEvent, SyncOrchestrator, SyncPhase};
