//! Domain error types

use std::fmt;

use thiserror::Error;

/// The kind of entity a name belongs to, used in duplicate-name reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A project.
    Project,
    /// A collection inside a project (or the default set).
    Collection,
    /// A folder inside a collection.
    Folder,
    /// An environment.
    Environment,
}

impl EntityKind {
    /// Returns the lowercase display name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Collection => "collection",
            Self::Folder => "folder",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level errors that can occur during validation or tree mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A sibling with the same case-insensitive name already exists.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// What kind of entity collided.
        kind: EntityKind,
        /// The rejected name.
        name: String,
    },

    /// The setting key is not part of the documented settings.
    #[error("the settings structure does not include the key {0}")]
    UnknownSetting(String),

    /// A positional index does not address an existing element.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The sequence that was indexed.
        what: &'static str,
        /// The requested position.
        index: usize,
        /// The length of the sequence.
        len: usize,
    },

    /// No folder with the given name exists in the traversed tree.
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    /// No project with the given id exists.
    #[error("project not found: {0}")]
    ProjectNotFound(String),
}

impl DomainError {
    /// Returns true if this error should be surfaced to the user as a notification.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::DuplicateName { .. } | Self::UnknownSetting(_))
    }

    /// Builds an index error after checking `index` against `len`.
    #[must_use]
    pub const fn index(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { what, index, len }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
