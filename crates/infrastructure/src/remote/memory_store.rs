//! In-process document store with live queries.
//!
//! Stands in for the hosted store in the binary and in integration tests.
//! Every write notifies the live queries of the touched collections with
//! their full result set, the same contract the hosted store offers.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use courier_application::ports::{
    BatchOp, CollectionRef, Document, DocumentRef, DocumentStore, Fields, Query,
    SnapshotReceiver, SortDirection, StoreError,
};
use courier_domain::generate_id;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

struct LiveQuery {
    query: Query,
    sender: mpsc::UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
struct Collections {
    documents: BTreeMap<String, BTreeMap<String, Fields>>,
    live: Vec<LiveQuery>,
}

impl Collections {
    fn run(&self, query: &Query) -> Vec<Document> {
        let mut documents: Vec<Document> = self
            .documents
            .get(query.collection.path())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            documents.sort_by(|a, b| {
                let ordering = compare_fields(a.fields.get(field), b.fields.get(field));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        documents
    }

    fn put(&mut self, document: &DocumentRef, fields: Fields) {
        self.documents
            .entry(document.parent().path().to_string())
            .or_default()
            .insert(document.id().to_string(), fields);
    }

    fn remove(&mut self, document: &DocumentRef) {
        if let Some(docs) = self.documents.get_mut(document.parent().path()) {
            docs.remove(document.id());
        }
    }

    fn contains(&self, document: &DocumentRef) -> bool {
        self.documents
            .get(document.parent().path())
            .is_some_and(|docs| docs.contains_key(document.id()))
    }

    /// Pushes fresh snapshots to the live queries of `touched` and forgets
    /// queries whose receiver was dropped.
    fn notify(&mut self, touched: &BTreeSet<String>) {
        self.live.retain(|live| !live.sender.is_closed());
        for live in &self.live {
            if touched.contains(live.query.collection.path()) {
                let _ = live.sender.send(self.run(&live.query));
            }
        }
    }
}

/// Orders missing fields last, then numbers, then strings, then anything
/// else by its JSON text. Two RFC 3339 strings compare as instants, since
/// their fractional seconds vary in width.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Greater,
        (Some(_), None) => CmpOrdering::Less,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

/// A document store kept in memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<Collections>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail with [`StoreError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the fields of a document.
    pub async fn get(&self, document: &DocumentRef) -> Option<Fields> {
        self.inner
            .lock()
            .await
            .documents
            .get(document.parent().path())?
            .get(document.id())
            .cloned()
    }

    /// Number of live queries with a receiver still attached.
    pub async fn live_queries(&self) -> usize {
        self.inner
            .lock()
            .await
            .live
            .iter()
            .filter(|live| !live.sender.is_closed())
            .count()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    async fn write<F>(&self, touched: &CollectionRef, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Collections) -> Result<(), StoreError> + Send,
    {
        self.ensure_online()?;
        let mut inner = self.inner.lock().await;
        apply(&mut inner)?;
        inner.notify(&BTreeSet::from([touched.path().to_string()]));
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        Ok(self.inner.lock().await.run(&Query::new(collection.clone())))
    }

    async fn set(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        tracing::debug!(%document, "set");
        self.write(document.parent(), |inner| {
            inner.put(document, fields);
            Ok(())
        })
        .await
    }

    async fn update(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        tracing::debug!(%document, "update");
        self.write(document.parent(), |inner| {
            let existing = inner
                .documents
                .get_mut(document.parent().path())
                .and_then(|docs| docs.get_mut(document.id()))
                .ok_or_else(|| StoreError::NotFound(document.to_string()))?;
            existing.extend(fields);
            Ok(())
        })
        .await
    }

    async fn add(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError> {
        let id = generate_id();
        let document = collection.doc(&id);
        tracing::debug!(%document, "add");
        self.write(collection, |inner| {
            inner.put(&document, fields);
            Ok(())
        })
        .await?;
        Ok(id)
    }

    async fn delete(&self, document: &DocumentRef) -> Result<(), StoreError> {
        tracing::debug!(%document, "delete");
        self.write(document.parent(), |inner| {
            inner.remove(document);
            Ok(())
        })
        .await
    }

    async fn commit(&self, batch: Vec<BatchOp>) -> Result<(), StoreError> {
        self.ensure_online()?;
        tracing::debug!(ops = batch.len(), "commit");
        let mut inner = self.inner.lock().await;
        let mut touched = BTreeSet::new();
        for op in batch {
            match op {
                BatchOp::Set(document, fields) => {
                    touched.insert(document.parent().path().to_string());
                    inner.put(&document, fields);
                }
                BatchOp::Delete(document) => {
                    touched.insert(document.parent().path().to_string());
                    if inner.contains(&document) {
                        inner.remove(&document);
                    }
                }
            }
        }
        inner.notify(&touched);
        Ok(())
    }

    async fn subscribe(&self, query: Query) -> Result<SnapshotReceiver, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;
        let _ = sender.send(inner.run(&query));
        tracing::debug!(collection = %query.collection, "live query opened");
        inner.live.push(LiveQuery { query, sender });
        Ok(receiver)
    }
}
