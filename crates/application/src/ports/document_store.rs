//! Remote document store port
//!
//! Abstracts a hosted, per-user document database with live change
//! notification. Documents are JSON objects grouped in collections; a
//! document may own nested sub-collections.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// Receives the full document set of a query on every change.
///
/// Dropping the receiver ends the subscription.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<Vec<Document>>;

/// Errors reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The document to update does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Reference to a collection, e.g. `users/u1/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    /// A top-level collection.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self {
            path: name.to_string(),
        }
    }

    /// The slash-separated path of the collection.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reference to the document `id` inside this collection.
    #[must_use]
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef {
            collection: self.clone(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Reference to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    collection: CollectionRef,
    id: String,
}

impl DocumentRef {
    /// The document id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The collection holding the document.
    #[must_use]
    pub const fn parent(&self) -> &CollectionRef {
        &self.collection
    }

    /// A sub-collection owned by this document.
    #[must_use]
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef {
            path: format!("{}/{}/{name}", self.collection.path, self.id),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A document as delivered by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id.
    pub id: String,
    /// Document fields.
    pub fields: Fields,
}

impl Document {
    /// Creates a document.
    #[must_use]
    pub const fn new(id: String, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Decodes the document into `T`, exposing the id as an `id` field.
    ///
    /// # Errors
    /// Returns the serde error when the fields don't match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
    }
}

/// Sort order of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A live query over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Queried collection.
    pub collection: CollectionRef,
    /// Optional ordering field.
    pub order_by: Option<(String, SortDirection)>,
}

impl Query {
    /// Queries every document of `collection` in store order.
    #[must_use]
    pub const fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            order_by: None,
        }
    }

    /// Orders results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }
}

/// One operation of an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Create or overwrite a document.
    Set(DocumentRef, Fields),
    /// Delete a document.
    Delete(DocumentRef),
}

/// Port for the remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns every document of a collection.
    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError>;

    /// Creates or overwrites a document.
    async fn set(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError>;

    /// Overwrites the given top-level fields of an existing document.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when the document doesn't exist.
    async fn update(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError>;

    /// Adds a document with a store-assigned id and returns the id.
    async fn add(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError>;

    /// Deletes a document. Deleting a missing document succeeds.
    async fn delete(&self, document: &DocumentRef) -> Result<(), StoreError>;

    /// Applies every operation atomically.
    async fn commit(&self, batch: Vec<BatchOp>) -> Result<(), StoreError>;

    /// Subscribes to a query.
    ///
    /// The current result set is delivered immediately, then again after
    /// every change to the queried collection.
    async fn subscribe(&self, query: Query) -> Result<SnapshotReceiver, StoreError>;
}
