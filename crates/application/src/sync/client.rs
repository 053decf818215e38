//! Remote sync client.
//!
//! Mirrors the signed-in user's namespace of the document store into
//! read-only snapshots and writes local changes back. The client never
//! touches the local store; consumers copy snapshots in themselves.
//!
//! Six live subscriptions run while a user is signed in, one task each.
//! Signing out or switching users aborts them and bumps the session
//! counter, so a snapshot that was already in flight is dropped instead of
//! landing in the next session's caches.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use courier_domain::{
    AuthProviderKind, Collection, Environment, Feed, HistoryEntry, Project, Setting, SyncFlag,
    SyncMetadata, UserIdentity,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;

use super::error::{SyncError, SyncResult};
use super::events::SyncEvent;
use super::location::{CollectionsLocation, SYNC_DOCUMENT, UserNamespace};
use crate::ports::{
    BatchOp, Clock, Document, DocumentStore, Fields, IdentityProvider, Query, SortDirection,
    StoreError,
};

const EVENT_CAPACITY: usize = 64;

/// Snapshot caches of the signed-in user's remote data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// The signed-in user.
    pub user: Option<UserIdentity>,
    /// Activity feed, newest first.
    pub feeds: Vec<Feed>,
    /// Remote settings.
    pub settings: Vec<Setting>,
    /// Request history.
    pub history: Vec<HistoryEntry>,
    /// Collections of the top-level slot.
    pub collections: Vec<Collection>,
    /// Environments of the top-level slot.
    pub environments: Vec<Environment>,
    /// Projects, most recently updated first.
    pub projects: Vec<Project>,
    /// Project that collection and environment writes are routed to.
    pub current_project: Option<Project>,
    /// Collections of [`Self::current_project`].
    pub current_collections: Vec<Collection>,
}

/// The two array slots stored as a single `sync` document.
#[derive(Debug, Clone, Copy)]
enum SyncedArray {
    Collections,
    Environments,
}

impl SyncedArray {
    const fn slot(self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::Environments => "environments",
        }
    }

    const fn item_field(self) -> &'static str {
        match self {
            Self::Collections => "collection",
            Self::Environments => "environment",
        }
    }

    const fn operation(self) -> &'static str {
        match self {
            Self::Collections => "write collections",
            Self::Environments => "write environments",
        }
    }
}

/// Client for the remote document store.
pub struct SyncClient {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<ClientState>>,
    events: broadcast::Sender<SyncEvent>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
    session: Arc<AtomicU64>,
    auth_lock: Mutex<()>,
}

impl SyncClient {
    /// Creates a client with nobody signed in.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            identity,
            clock,
            state: Arc::new(RwLock::new(ClientState::default())),
            events,
            listeners: Mutex::new(Vec::new()),
            session: Arc::new(AtomicU64::new(0)),
            auth_lock: Mutex::new(()),
        }
    }

    /// Subscribes to snapshot events. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Returns a copy of every cache.
    pub async fn snapshot(&self) -> ClientState {
        self.state.read().await.clone()
    }

    /// Returns the signed-in user.
    pub async fn current_user(&self) -> Option<UserIdentity> {
        self.state.read().await.user.clone()
    }

    /// Number of subscription tasks still running.
    pub async fn active_listeners(&self) -> usize {
        self.listeners
            .lock()
            .await
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Follows the identity provider's auth state until it goes away.
    #[must_use]
    pub fn watch_auth(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        let mut receiver = self.identity.watch();
        tokio::spawn(async move {
            loop {
                let user = receiver.borrow_and_update().clone();
                if let Err(error) = client.handle_auth_change(user).await {
                    tracing::error!(%error, "failed to apply auth state change");
                }
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Applies an auth state transition.
    ///
    /// Signing in writes the profile document and opens the six
    /// subscriptions. Signing out releases them and clears every cache.
    /// Repeating the current state is a no-op.
    ///
    /// # Errors
    /// Returns [`SyncError::Subscribe`] when a subscription can't be opened.
    pub async fn handle_auth_change(&self, user: Option<UserIdentity>) -> SyncResult<()> {
        let _guard = self.auth_lock.lock().await;
        let current = self.current_user().await.map(|user| user.uid);
        if current.as_deref() == user.as_ref().map(|user| user.uid.as_str()) {
            return Ok(());
        }

        self.stop_listeners().await;
        {
            let mut state = self.state.write().await;
            *state = ClientState::default();
            state.user.clone_from(&user);
        }

        match user {
            None => {
                tracing::info!("signed out, remote caches cleared");
                Ok(())
            }
            Some(user) => {
                tracing::info!(uid = %user.uid, "signed in");
                self.write_profile(&user).await;
                self.start_listeners(&user).await
            }
        }
    }

    /// Signs in through an external provider.
    ///
    /// # Errors
    /// Returns [`SyncError::Auth`] when the provider fails.
    pub async fn sign_in(&self, provider: AuthProviderKind) -> SyncResult<UserIdentity> {
        let user = self.identity.sign_in(provider).await?;
        self.handle_auth_change(Some(user.clone())).await?;
        Ok(user)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// Returns [`SyncError::Auth`] when the credentials are refused.
    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> SyncResult<UserIdentity> {
        let user = self.identity.sign_in_with_email(email, password).await?;
        self.handle_auth_change(Some(user.clone())).await?;
        Ok(user)
    }

    /// Lists the sign-in methods registered for `email`.
    ///
    /// # Errors
    /// Returns [`SyncError::Auth`] when the provider fails.
    pub async fn sign_in_methods_for_email(&self, email: &str) -> SyncResult<Vec<String>> {
        Ok(self.identity.sign_in_methods(email).await?)
    }

    /// Signs the current user out.
    ///
    /// # Errors
    /// Returns [`SyncError::NoActiveSession`] when nobody is signed in.
    pub async fn sign_out(&self) -> SyncResult<()> {
        if self.current_user().await.is_none() {
            return Err(SyncError::NoActiveSession);
        }
        self.identity.sign_out().await?;
        self.handle_auth_change(None).await
    }

    /// Releases every subscription without signing out.
    pub async fn shutdown(&self) {
        self.stop_listeners().await;
    }

    /// Routes collection and environment writes to `project`, or to the
    /// top-level slots when `None`.
    pub async fn set_current_project(&self, project: Option<Project>) {
        let mut state = self.state.write().await;
        state.current_collections = project
            .as_ref()
            .map(|project| project.collections.clone())
            .unwrap_or_default();
        state.current_project = project;
    }

    /// Returns true when a user is signed in and `flag` is enabled remotely.
    pub async fn sync_enabled(&self, flag: SyncFlag) -> bool {
        let state = self.state.read().await;
        state.user.is_some()
            && state
                .settings
                .iter()
                .any(|setting| setting.name == flag.setting_name() && setting.is_enabled())
    }

    /// Looks a remote setting up by name.
    pub async fn setting(&self, name: &str) -> Option<Setting> {
        self.state
            .read()
            .await
            .settings
            .iter()
            .find(|setting| setting.name == name)
            .cloned()
    }

    /// Writes one project with fresh metadata.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_project(&self, project: &Project) -> SyncResult<()> {
        let user = self.require_user().await?;
        let mut project = project.clone();
        project.stamp(&self.metadata(&user));
        let fields = to_fields(&project)?;
        let document = UserNamespace::new(&user.uid).projects().doc(&project.id);
        self.store
            .set(&document, fields)
            .await
            .map_err(write_failed("write project"))
    }

    /// Makes the remote project set equal to `projects`.
    ///
    /// Remote projects missing from `projects` are deleted and the rest are
    /// upserted, all in one batch. Projects with pending local changes get
    /// fresh metadata.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_projects(&self, projects: &[Project]) -> SyncResult<()> {
        let user = self.require_user().await?;
        let collection = UserNamespace::new(&user.uid).projects();
        let remote = self
            .store
            .list(&collection)
            .await
            .map_err(write_failed("write projects"))?;

        let keep: HashSet<&str> = projects.iter().map(|project| project.id.as_str()).collect();
        let mut batch: Vec<BatchOp> = remote
            .iter()
            .filter(|document| !keep.contains(document.id.as_str()))
            .map(|document| BatchOp::Delete(collection.doc(&document.id)))
            .collect();
        let pruned = batch.len();

        let metadata = self.metadata(&user);
        for project in projects {
            let mut project = project.clone();
            if project.is_dirty() {
                project.stamp(&metadata);
            }
            batch.push(BatchOp::Set(collection.doc(&project.id), to_fields(&project)?));
        }

        tracing::debug!(upserted = projects.len(), pruned, "writing projects");
        self.store
            .commit(batch)
            .await
            .map_err(write_failed("write projects"))
    }

    /// Deletes a project document.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn delete_project(&self, id: &str) -> SyncResult<()> {
        let user = self.require_user().await?;
        let document = UserNamespace::new(&user.uid).projects().doc(id);
        self.store
            .delete(&document)
            .await
            .map_err(write_failed("delete project"))
    }

    /// Adds a feed entry and returns its id.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_feed(&self, message: &str, label: &str) -> SyncResult<String> {
        let user = self.require_user().await?;
        let feed = Feed {
            id: String::new(),
            message: message.to_string(),
            label: label.to_string(),
            created_on: Some(self.clock.now()),
            author: Some(user.author()),
        };
        let collection = UserNamespace::new(&user.uid).feeds();
        self.store
            .add(&collection, to_fields(&feed)?)
            .await
            .map_err(write_failed("write feed"))
    }

    /// Deletes a feed entry.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn delete_feed(&self, id: &str) -> SyncResult<()> {
        let user = self.require_user().await?;
        let document = UserNamespace::new(&user.uid).feeds().doc(id);
        self.store
            .delete(&document)
            .await
            .map_err(write_failed("delete feed"))
    }

    /// Writes a setting document named after the setting.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_setting(&self, name: &str, value: impl Into<Value> + Send) -> SyncResult<()> {
        let user = self.require_user().await?;
        let mut setting = Setting::new(name, value);
        setting.updated_on = Some(self.clock.now());
        setting.author = Some(user.author());
        let document = UserNamespace::new(&user.uid).settings().doc(name);
        self.store
            .set(&document, to_fields(&setting)?)
            .await
            .map_err(write_failed("write setting"))
    }

    /// Adds a history entry stamped with author and write time, and returns
    /// its id.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_history_entry(&self, entry: &HistoryEntry) -> SyncResult<String> {
        let user = self.require_user().await?;
        let mut fields = to_fields(entry)?;
        fields.extend(to_fields(&self.metadata(&user))?);
        let collection = UserNamespace::new(&user.uid).history();
        self.store
            .add(&collection, fields)
            .await
            .map_err(write_failed("write history"))
    }

    /// Deletes a history entry.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn delete_history_entry(&self, id: &str) -> SyncResult<()> {
        let user = self.require_user().await?;
        let document = UserNamespace::new(&user.uid).history().doc(id);
        self.store
            .delete(&document)
            .await
            .map_err(write_failed("delete history"))
    }

    /// Deletes every history entry.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn clear_history(&self) -> SyncResult<()> {
        let user = self.require_user().await?;
        let collection = UserNamespace::new(&user.uid).history();
        let entries = self
            .store
            .list(&collection)
            .await
            .map_err(write_failed("clear history"))?;
        let batch = entries
            .iter()
            .map(|entry| BatchOp::Delete(collection.doc(&entry.id)))
            .collect();
        self.store
            .commit(batch)
            .await
            .map_err(write_failed("clear history"))
    }

    /// Stars or unstars a history entry.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn toggle_star(&self, id: &str, value: bool) -> SyncResult<()> {
        let user = self.require_user().await?;
        let document = UserNamespace::new(&user.uid).history().doc(id);
        let mut fields = Fields::new();
        fields.insert("star".to_string(), Value::Bool(value));
        self.store
            .update(&document, fields)
            .await
            .map_err(write_failed("toggle star"))
    }

    /// Writes the collections to the slot of the current project, or to
    /// the top-level slot when no project is selected.
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_collections(&self, collections: &[Collection]) -> SyncResult<()> {
        let items = serde_json::to_value(collections)?;
        self.write_synced_array(SyncedArray::Collections, items).await
    }

    /// Writes the environments, routed like [`Self::write_collections`].
    ///
    /// # Errors
    /// Returns [`SyncError::NotSignedIn`] or [`SyncError::StoreWrite`].
    pub async fn write_environments(&self, environments: &[Environment]) -> SyncResult<()> {
        let items = serde_json::to_value(environments)?;
        self.write_synced_array(SyncedArray::Environments, items).await
    }

    async fn write_synced_array(&self, array: SyncedArray, items: Value) -> SyncResult<()> {
        let user = self.require_user().await?;
        let location = {
            let state = self.state.read().await;
            CollectionsLocation::resolve(state.current_project.as_ref())
        };

        let mut payload = to_fields(&user.author())?;
        payload.insert("updatedOn".to_string(), serde_json::to_value(self.clock.now())?);
        payload.insert(array.item_field().to_string(), items);

        let namespace = UserNamespace::new(&user.uid);
        let result = match location {
            CollectionsLocation::TopLevel => {
                let document = match array {
                    SyncedArray::Collections => namespace.collections(),
                    SyncedArray::Environments => namespace.environments(),
                }
                .doc(SYNC_DOCUMENT);
                self.store.set(&document, payload).await
            }
            CollectionsLocation::UnderProject(id) => {
                let mut slot = Fields::new();
                slot.insert(SYNC_DOCUMENT.to_string(), Value::Object(payload));
                let mut fields = Fields::new();
                fields.insert(array.slot().to_string(), Value::Object(slot));
                self.store
                    .update(&namespace.projects().doc(&id), fields)
                    .await
            }
        };
        result.map_err(write_failed(array.operation()))
    }

    async fn require_user(&self) -> SyncResult<UserIdentity> {
        self.current_user().await.ok_or(SyncError::NotSignedIn)
    }

    fn metadata(&self, user: &UserIdentity) -> SyncMetadata {
        SyncMetadata::new(user.author(), self.clock.now())
    }

    async fn write_profile(&self, user: &UserIdentity) {
        let mut fields = Fields::new();
        let now = serde_json::to_value(self.clock.now()).unwrap_or(Value::Null);
        fields.insert("updatedOn".to_string(), now);
        fields.insert("provider".to_string(), Value::String(user.provider_id.clone()));
        fields.insert("name".to_string(), optional(user.display_name.as_ref()));
        fields.insert("email".to_string(), optional(user.email.as_ref()));
        fields.insert("photoUrl".to_string(), optional(user.photo_url.as_ref()));
        fields.insert("uid".to_string(), Value::String(user.uid.clone()));

        let namespace = UserNamespace::new(&user.uid);
        if let Err(error) = self.store.set(namespace.profile(), fields).await {
            tracing::error!(uid = %user.uid, %error, "updating user profile failed");
        }
    }

    async fn start_listeners(&self, user: &UserIdentity) -> SyncResult<()> {
        let namespace = UserNamespace::new(&user.uid);
        let session = self.session.load(Ordering::SeqCst);

        self.listen(
            Query::new(namespace.feeds()).order_by("createdOn", SortDirection::Descending),
            session,
            |state, documents, _| state.feeds = decode_all(documents),
        )
        .await?;

        self.listen(
            Query::new(namespace.settings()),
            session,
            |state, documents, events| {
                state.settings = decode_all(documents)
                    .into_iter()
                    .map(Setting::named_by_id)
                    .collect();
                let _ = events.send(SyncEvent::SettingsLoaded(state.settings.clone()));
            },
        )
        .await?;

        self.listen(
            Query::new(namespace.history()),
            session,
            |state, documents, _| state.history = decode_all(documents),
        )
        .await?;

        self.listen(
            Query::new(namespace.collections()),
            session,
            |state, documents, _| {
                if let Some(collections) = unwrap_synced(documents, SyncedArray::Collections) {
                    state.collections = collections;
                }
            },
        )
        .await?;

        self.listen(
            Query::new(namespace.environments()),
            session,
            |state, documents, _| {
                if let Some(environments) = unwrap_synced(documents, SyncedArray::Environments) {
                    state.environments = environments;
                }
            },
        )
        .await?;

        self.listen(
            Query::new(namespace.projects()).order_by("updated_at", SortDirection::Descending),
            session,
            |state, documents, events| {
                state.projects = decode_all(documents);
                let _ = events.send(SyncEvent::ProjectsLoaded(state.projects.clone()));
            },
        )
        .await?;

        tracing::info!(uid = %user.uid, "remote subscriptions opened");
        Ok(())
    }

    async fn listen<F>(&self, query: Query, session: u64, apply: F) -> SyncResult<()>
    where
        F: Fn(&mut ClientState, &[Document], &broadcast::Sender<SyncEvent>) + Send + 'static,
    {
        let collection = query.collection.to_string();
        let mut receiver = self
            .store
            .subscribe(query)
            .await
            .map_err(|source| SyncError::Subscribe {
                collection: collection.clone(),
                source,
            })?;

        let state = Arc::clone(&self.state);
        let current_session = Arc::clone(&self.session);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            while let Some(documents) = receiver.recv().await {
                let mut state = state.write().await;
                if current_session.load(Ordering::SeqCst) != session {
                    break;
                }
                tracing::debug!(%collection, count = documents.len(), "snapshot received");
                apply(&mut state, &documents, &events);
            }
        });
        self.listeners.lock().await.push(handle);
        Ok(())
    }

    async fn stop_listeners(&self) {
        self.session.fetch_add(1, Ordering::SeqCst);
        let handles: Vec<_> = self.listeners.lock().await.drain(..).collect();
        for handle in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            tracing::info!(count = handles.len(), "remote subscriptions released");
        }
    }
}

fn write_failed(operation: &'static str) -> impl FnOnce(StoreError) -> SyncError {
    move |source| {
        tracing::error!(operation, error = %source, "remote write failed");
        SyncError::StoreWrite { operation, source }
    }
}

/// Serializes an entity as document fields. The id lives in the document
/// reference, not in the fields.
fn to_fields<T: Serialize + ?Sized>(value: &T) -> SyncResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        _ => Err(<serde_json::Error as serde::ser::Error>::custom(
            "document must serialize to an object",
        )
        .into()),
    }
}

fn optional(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |value| Value::String(value.clone()))
}

fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| match document.decode() {
            Ok(entity) => Some(entity),
            Err(error) => {
                tracing::warn!(id = %document.id, %error, "skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Reads the array held by the first document of a `sync` slot.
fn unwrap_synced<T: DeserializeOwned>(documents: &[Document], array: SyncedArray) -> Option<Vec<T>> {
    let items = documents.first()?.fields.get(array.item_field())?;
    match serde_json::from_value(items.clone()) {
        Ok(items) => Some(items),
        Err(error) => {
            tracing::warn!(slot = array.slot(), %error, "skipping undecodable sync document");
            None
        }
    }
}
