//! Remote settings lookup.

use std::sync::Arc;

use courier_domain::Setting;

use crate::sync::SyncClient;

/// Read access to the remote settings snapshot.
pub struct SettingsService {
    client: Arc<SyncClient>,
}

impl SettingsService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<SyncClient>) -> Self {
        Self { client }
    }

    /// Looks a remote setting up by name.
    pub async fn setting(&self, name: &str) -> Option<Setting> {
        self.client.setting(name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sync::test_support::{client_with, wait_until};
    use courier_domain::AuthProviderKind;
    use serde_json::json;

    #[tokio::test]
    async fn looks_settings_up_by_name() {
        let (client, remote, _) = client_with();
        remote.seed(
            "users/u1/settings",
            "syncHistory",
            json!({"name": "syncHistory", "value": false}),
        );
        let service = SettingsService::new(client.clone());
        assert!(service.setting("syncHistory").await.is_none());

        client.sign_in(AuthProviderKind::Google).await.unwrap();
        let c = &client;
        wait_until(|| async move { !c.snapshot().await.settings.is_empty() }).await;

        let setting = service.setting("syncHistory").await.unwrap();
        assert_eq!(setting.value, json!(false));
        assert!(!setting.is_enabled());
        assert!(service.setting("missing").await.is_none());
    }
}
