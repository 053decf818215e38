//! Entity services: local mutations followed by best-effort remote sync.
//!
//! A service applies the local mutation first. Remote failures are returned
//! to the caller but never undo the local change.

mod collections;
mod projects;
mod settings;

pub use collections::CollectionsService;
pub use projects::ProjectsService;
pub use settings::SettingsService;
