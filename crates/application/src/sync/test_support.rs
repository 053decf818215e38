#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courier_domain::{AuthProviderKind, UserIdentity};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use super::SyncClient;
use crate::ports::{
    AuthError, BatchOp, Clock, CollectionRef, Document, DocumentRef, DocumentStore, Fields,
    IdentityProvider, Query, SnapshotReceiver, StoreError,
};
use crate::store::test_support::{FixedClock, fixed_now};

type Subscriber = (String, mpsc::UnboundedSender<Vec<Document>>);

/// Document store double. Snapshots are only delivered on subscribe and on
/// explicit [`MockStore::emit`] calls.
#[derive(Default)]
pub struct MockStore {
    docs: Mutex<BTreeMap<String, BTreeMap<String, Fields>>>,
    subscribers: Mutex<Vec<Subscriber>>,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    next_id: AtomicU64,
}

impl MockStore {
    pub fn seed(&self, collection: &str, id: &str, fields: Value) {
        let Value::Object(fields) = fields else {
            panic!("seeded documents must be objects");
        };
        self.docs
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Fields> {
        self.docs.lock().unwrap().get(collection)?.get(id).cloned()
    }

    pub async fn emit(&self, collection: &str) {
        let documents = self.documents(collection);
        for (path, sender) in self.subscribers.lock().unwrap().iter() {
            if path == collection {
                let _ = sender.send(documents.clone());
            }
        }
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn documents(&self, collection: &str) -> Vec<Document> {
        self.docs
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, write: String) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        self.writes.lock().unwrap().push(write);
        Ok(())
    }

    fn put(&self, document: &DocumentRef, fields: Fields) {
        self.docs
            .lock()
            .unwrap()
            .entry(document.parent().path().to_string())
            .or_default()
            .insert(document.id().to_string(), fields);
    }

    fn remove(&self, document: &DocumentRef) {
        if let Some(docs) = self.docs.lock().unwrap().get_mut(document.parent().path()) {
            docs.remove(document.id());
        }
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents(collection.path()))
    }

    async fn set(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        self.record(format!("set {document}"))?;
        self.put(document, fields);
        Ok(())
    }

    async fn update(&self, document: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        self.record(format!("update {document}"))?;
        let mut docs = self.docs.lock().unwrap();
        let existing = docs
            .get_mut(document.parent().path())
            .and_then(|docs| docs.get_mut(document.id()))
            .ok_or_else(|| StoreError::NotFound(document.to_string()))?;
        existing.extend(fields);
        Ok(())
    }

    async fn add(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError> {
        self.record(format!("add {collection}"))?;
        let id = format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.put(&collection.doc(&id), fields);
        Ok(id)
    }

    async fn delete(&self, document: &DocumentRef) -> Result<(), StoreError> {
        self.record(format!("delete {document}"))?;
        self.remove(document);
        Ok(())
    }

    async fn commit(&self, batch: Vec<BatchOp>) -> Result<(), StoreError> {
        self.record(format!("commit {}", batch.len()))?;
        for op in batch {
            match op {
                BatchOp::Set(document, fields) => self.put(&document, fields),
                BatchOp::Delete(document) => self.remove(&document),
            }
        }
        Ok(())
    }

    async fn subscribe(&self, query: Query) -> Result<SnapshotReceiver, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let path = query.collection.path().to_string();
        let _ = sender.send(self.documents(&path));
        self.subscribers.lock().unwrap().push((path, sender));
        Ok(receiver)
    }
}

/// Identity provider double that always signs in the same user.
pub struct MockIdentity {
    user: Option<UserIdentity>,
    sender: watch::Sender<Option<UserIdentity>>,
}

impl MockIdentity {
    pub fn new(user: UserIdentity) -> Self {
        Self {
            user: Some(user),
            sender: watch::channel(None).0,
        }
    }

    pub fn failing() -> Self {
        Self {
            user: None,
            sender: watch::channel(None).0,
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_in(&self, _provider: AuthProviderKind) -> Result<UserIdentity, AuthError> {
        let user = self.user.clone().ok_or(AuthError::Cancelled)?;
        self.sender.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_email(
        &self,
        _email: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError> {
        if password != "secret" {
            return Err(AuthError::InvalidCredentials);
        }
        self.sign_in(AuthProviderKind::Password).await
    }

    async fn sign_in_methods(&self, _email: &str) -> Result<Vec<String>, AuthError> {
        Ok(vec!["password".to_string()])
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sender.send_replace(None);
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.sender.subscribe()
    }
}

pub fn user() -> UserIdentity {
    UserIdentity::new("u1", AuthProviderKind::Github).with_display_name("Ada")
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

pub fn client_with() -> (Arc<SyncClient>, Arc<MockStore>, Arc<MockIdentity>) {
    let store = Arc::new(MockStore::default());
    let identity = Arc::new(MockIdentity::new(user()));
    let client = Arc::new(SyncClient::new(store.clone(), identity.clone(), clock()));
    (client, store, identity)
}

/// Polls `check` until it holds, failing the test after about a second.
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
