//! Courier Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the ports defined in the application layer:
//! the system clock, a tracing notifier, the on-disk state file, and
//! in-process stand-ins for the hosted document store and identity provider.

pub mod adapters;
pub mod persistence;
pub mod remote;
pub mod serialization;

pub use adapters::{SystemClock, TracingNotifier};
pub use persistence::FileStateRepository;
pub use remote::{LocalIdentityProvider, MemoryDocumentStore};
pub use serialization::{
    SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
