//! Identity provider port
//!
//! The sign-in flow itself is opaque: the provider signs a user in and
//! reports auth-state changes.

use async_trait::async_trait;
use courier_domain::{AuthProviderKind, UserIdentity};
use tokio::sync::watch;

/// Errors reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The user closed the sign-in flow.
    #[error("sign-in cancelled")]
    Cancelled,

    /// Email/password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The requested provider is not configured.
    #[error("provider not available: {0}")]
    ProviderUnavailable(String),

    /// Any other provider failure.
    #[error("identity provider error: {0}")]
    Backend(String),
}

/// Port for the authentication collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in through an external provider.
    async fn sign_in(&self, provider: AuthProviderKind) -> Result<UserIdentity, AuthError>;

    /// Signs in with email and password.
    async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError>;

    /// Lists the sign-in methods registered for an email.
    async fn sign_in_methods(&self, email: &str) -> Result<Vec<String>, AuthError>;

    /// Signs the current user out.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribes to auth-state changes. The receiver starts at the current state.
    fn watch(&self) -> watch::Receiver<Option<UserIdentity>>;
}
