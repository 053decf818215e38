//! In-process stand-ins for the hosted backend.

mod local_identity;
mod memory_store;

pub use local_identity::LocalIdentityProvider;
pub use memory_store::MemoryDocumentStore;
