//! Projects, collections, folders and requests.
//!
//! A collection is the root of a folder tree and has exactly the shape of a
//! folder, so both share the [`Folder`] type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::environment::Environment;
use crate::id::generate_id;
use crate::metadata::{Author, SyncMetadata};
use crate::tree::Named;

/// A saved request.
///
/// The payload is opaque to the data layer: only the name is interpreted,
/// every other field is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Display name of the request.
    #[serde(default)]
    pub name: String,

    /// The rest of the request payload.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Request {
    /// Creates a request with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
        }
    }

    /// Adds an opaque payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// A folder of requests and nested folders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder name. Lookups match it exactly.
    pub name: String,

    /// Nested folders, in display order.
    #[serde(default)]
    pub folders: Vec<Folder>,

    /// Requests, addressed by position.
    #[serde(default)]
    pub requests: Vec<Request>,
}

/// A collection: the root folder of a request tree.
pub type Collection = Folder;

impl Folder {
    /// Creates an empty folder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folders: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Appends a nested folder.
    #[must_use]
    pub fn with_folder(mut self, folder: Self) -> Self {
        self.folders.push(folder);
        self
    }

    /// Appends a request.
    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    /// Returns the total number of requests in this folder (recursive).
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.len() + self.folders.iter().map(Self::request_count).sum::<usize>()
    }
}

impl Named for Folder {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A named group of collections and environments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque identifier, also the remote document id.
    #[serde(default)]
    pub id: String,

    /// Project name, unique case-insensitively among projects.
    pub name: String,

    /// Collections of this project.
    #[serde(default, deserialize_with = "synced_items")]
    pub collections: Vec<Collection>,

    /// Environments of this project.
    #[serde(default, deserialize_with = "synced_items")]
    pub environments: Vec<Environment>,

    /// Set while the project was created locally and not yet synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adding: Option<bool>,

    /// Set while the project was renamed locally and not yet synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing: Option<bool>,

    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Author of the last remote write.
    #[serde(flatten)]
    pub author: Option<Author>,
}

impl Project {
    /// Creates an empty project with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            collections: Vec::new(),
            environments: Vec::new(),
            adding: None,
            editing: None,
            updated_at: None,
            author: None,
        }
    }

    /// Returns true if the project carries unsynced local changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.adding.unwrap_or(false) || self.editing.unwrap_or(false)
    }

    /// Applies sync metadata and clears the pending-change markers.
    pub fn stamp(&mut self, metadata: &SyncMetadata) {
        self.author = Some(metadata.author.clone());
        self.updated_at = Some(metadata.updated_at);
        self.adding = None;
        self.editing = None;
    }
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Wire shapes accepted for a project's `collections`/`environments` field.
///
/// Locally the field is a plain array. When a project is selected, the sync
/// client nests the array under `{ sync: { collection: [...] } }` (or
/// `environment`) inside the project document.
#[derive(Deserialize)]
#[serde(untagged)]
enum SyncedItems<T> {
    Items(Vec<T>),
    Wrapped { sync: SyncedPayload<T> },
}

#[derive(Deserialize)]
struct SyncedPayload<T> {
    #[serde(default = "Vec::new", alias = "collection", alias = "environment")]
    items: Vec<T>,
}

fn synced_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<SyncedItems<T>>::deserialize(deserializer)?;
    Ok(match items {
        Some(SyncedItems::Items(items)) => items,
        Some(SyncedItems::Wrapped { sync }) => sync.items,
        None => Vec::new(),
    })
}
