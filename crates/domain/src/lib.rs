//! Courier Domain - Core data types
//!
//! This crate defines the data model of the Courier REST client: projects,
//! collection trees, environments, settings and the documents mirrored to
//! the remote store. All types here are pure Rust with no I/O dependencies.

pub mod environment;
pub mod error;
pub mod id;
pub mod identity;
pub mod metadata;
pub mod project;
pub mod remote;
pub mod settings;
pub mod tree;

pub use environment::{Environment, Variable, parse_variable_value, renumber_environments};
pub use error::{DomainError, DomainResult, EntityKind};
pub use id::generate_id;
pub use identity::{AuthProviderKind, UserIdentity};
pub use metadata::{Author, SyncMetadata};
pub use project::{Collection, Folder, Project, Request};
pub use remote::{Feed, HistoryEntry, SYNC_INITIALIZED, Setting, SyncFlag, is_truthy};
pub use settings::{LocalSettings, SettingKey};
pub use tree::{
    FolderPath, Named, find_folder, find_folder_mut, find_parent_folder, find_parent_folder_mut,
    is_duplicate_name, is_duplicate_name_except, locate_folder, take_request,
};
