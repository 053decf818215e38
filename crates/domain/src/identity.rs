//! Signed-in user identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::Author;

/// External sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    /// Google account.
    Google,
    /// GitHub account.
    Github,
    /// Email and password.
    Password,
}

impl AuthProviderKind {
    /// Returns the provider id as reported by the identity provider.
    #[must_use]
    pub const fn provider_id(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Github => "github.com",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for AuthProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

/// The identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable user id, also the key of the user's remote namespace.
    pub uid: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Provider the user signed in with.
    pub provider_id: String,
}

impl UserIdentity {
    /// Creates an identity with only a uid and provider.
    #[must_use]
    pub fn new(uid: impl Into<String>, provider: AuthProviderKind) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
            provider_id: provider.provider_id().to_string(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the author fields stamped onto this user's writes.
    #[must_use]
    pub fn author(&self) -> Author {
        Author {
            author: self.uid.clone(),
            author_name: self.display_name.clone(),
            author_image: self.photo_url.clone(),
        }
    }
}
