//! Identity provider backed by a configured local account.

use async_trait::async_trait;
use courier_application::ports::{AuthError, IdentityProvider};
use courier_domain::{AuthProviderKind, UserIdentity};
use tokio::sync::watch;

struct Credentials {
    email: String,
    password: String,
}

/// Signs in one preconfigured user without any external round trip.
///
/// External providers sign in the configured account directly; email
/// sign-in checks the configured credentials.
pub struct LocalIdentityProvider {
    account: Option<UserIdentity>,
    credentials: Option<Credentials>,
    state: watch::Sender<Option<UserIdentity>>,
}

impl LocalIdentityProvider {
    /// A provider that signs in `account`.
    #[must_use]
    pub fn new(account: UserIdentity) -> Self {
        Self {
            account: Some(account),
            credentials: None,
            state: watch::channel(None).0,
        }
    }

    /// A provider with no account; every sign-in fails.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            account: None,
            credentials: None,
            state: watch::channel(None).0,
        }
    }

    /// Enables email sign-in with the given password.
    #[must_use]
    pub fn with_password(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    fn account(&self) -> Result<&UserIdentity, AuthError> {
        self.account
            .as_ref()
            .ok_or_else(|| AuthError::ProviderUnavailable("no local account configured".to_string()))
    }

    fn publish(&self, user: Option<UserIdentity>) {
        self.state.send_replace(user);
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, provider: AuthProviderKind) -> Result<UserIdentity, AuthError> {
        let mut user = self.account()?.clone();
        user.provider_id = provider.provider_id().to_string();
        tracing::info!(uid = %user.uid, %provider, "signed in");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError> {
        let account = self.account()?;
        let Some(credentials) = &self.credentials else {
            return Err(AuthError::ProviderUnavailable(
                AuthProviderKind::Password.to_string(),
            ));
        };
        if !credentials.email.eq_ignore_ascii_case(email) || credentials.password != password {
            tracing::warn!(email, "rejected email sign-in");
            return Err(AuthError::InvalidCredentials);
        }

        let mut user = account.clone();
        user.provider_id = AuthProviderKind::Password.provider_id().to_string();
        if user.email.is_none() {
            user.email = Some(credentials.email.clone());
        }
        tracing::info!(uid = %user.uid, "signed in with email");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_methods(&self, email: &str) -> Result<Vec<String>, AuthError> {
        let registered = self
            .credentials
            .as_ref()
            .is_some_and(|credentials| credentials.email.eq_ignore_ascii_case(email));
        Ok(if registered {
            vec![AuthProviderKind::Password.provider_id().to_string()]
        } else {
            Vec::new()
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(UserIdentity::new("u1", AuthProviderKind::Google))
            .with_password("ada@example.com", "hunter2")
    }

    #[tokio::test]
    async fn sign_in_reports_the_chosen_provider() {
        let provider = provider();
        let watcher = provider.watch();
        let user = provider.sign_in(AuthProviderKind::Github).await.unwrap();
        assert_eq!(user.provider_id, "github.com");
        assert_eq!(watcher.borrow().as_ref().map(|u| u.uid.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn email_sign_in_checks_credentials() {
        let provider = provider();
        let err = provider
            .sign_in_with_email("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        let user = provider
            .sign_in_with_email("ADA@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.provider_id, "password");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn sign_in_methods_only_lists_registered_emails() {
        let provider = provider();
        assert_eq!(
            provider.sign_in_methods("ada@example.com").await.unwrap(),
            vec!["password".to_string()]
        );
        assert!(provider.sign_in_methods("bob@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_out_publishes_none() {
        let provider = provider();
        provider.sign_in(AuthProviderKind::Google).await.unwrap();
        provider.sign_out().await.unwrap();
        assert!(provider.watch().borrow().is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_sign_in() {
        let provider = LocalIdentityProvider::unconfigured();
        let err = provider.sign_in(AuthProviderKind::Google).await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }
}
