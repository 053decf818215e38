//! Remote sync: the client mirroring the user's remote namespace and the
//! orchestrator deciding between seeding and pulling on first contact.

mod client;
mod error;
mod events;
mod location;
mod orchestrator;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientState, SyncClient};
pub use error::{SyncError, SyncResult};
pub use events::SyncEvent;
pub use location::{CollectionsLocation, SYNC_DOCUMENT, UserNamespace};
pub use orchestrator::{FIRST_SYNC_THRESHOLD, SyncDecision, SyncOrchestrator, SyncPhase};
