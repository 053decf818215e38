//! Collection and environment sync use cases.

use std::sync::Arc;

use courier_domain::SyncFlag;

use crate::store::SharedStore;
use crate::sync::{SyncClient, SyncResult};

/// Pushes the active collections and environments when their sync flag is on.
pub struct CollectionsService {
    client: Arc<SyncClient>,
    store: SharedStore,
}

impl CollectionsService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<SyncClient>, store: SharedStore) -> Self {
        Self { client, store }
    }

    /// Writes the active collections.
    ///
    /// # Errors
    /// Returns the failed remote write.
    pub async fn sync_collections(&self) -> SyncResult<()> {
        if !self.client.sync_enabled(SyncFlag::Collections).await {
            return Ok(());
        }
        let collections = self.store.lock().await.active_collections().to_vec();
        self.client.write_collections(&collections).await
    }

    /// Writes the active environments.
    ///
    /// # Errors
    /// Returns the failed remote write.
    pub async fn sync_environments(&self) -> SyncResult<()> {
        if !self.client.sync_enabled(SyncFlag::Environments).await {
            return Ok(());
        }
        let environments = self.store.lock().await.active_environments().to_vec();
        self.client.write_environments(&environments).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::test_support::{empty_state, store_with};
    use crate::sync::test_support::{client_with, wait_until};
    use courier_domain::{AuthProviderKind, Collection, Environment};
    use serde_json::json;

    #[tokio::test]
    async fn pushes_only_enabled_slots() {
        let (client, remote, _) = client_with();
        remote.seed(
            "users/u1/settings",
            "syncCollections",
            json!({"name": "syncCollections", "value": true}),
        );
        client.sign_in(AuthProviderKind::Google).await.unwrap();
        let c = &client;
        wait_until(|| async move { c.sync_enabled(SyncFlag::Collections).await }).await;

        let mut state = empty_state();
        state.collections.push(Collection::new("API"));
        state.environments.push(Environment::new("Dev"));
        let service = CollectionsService::new(client, store_with(state).0.into_shared());

        service.sync_collections().await.unwrap();
        service.sync_environments().await.unwrap();

        let synced = remote.get("users/u1/collections", "sync").unwrap();
        assert_eq!(synced["collection"][0]["name"], json!("API"));
        assert!(remote.get("users/u1/environments", "sync").is_none());
    }
}
