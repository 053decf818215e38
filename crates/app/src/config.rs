//! Runtime configuration read from environment variables.

use std::path::PathBuf;

use courier_domain::{AuthProviderKind, UserIdentity};

const STATE_PATH: &str = "COURIER_STATE_PATH";
const USER_ID: &str = "COURIER_USER_ID";
const USER_NAME: &str = "COURIER_USER_NAME";
const USER_EMAIL: &str = "COURIER_USER_EMAIL";

const DEFAULT_USER_ID: &str = "local";

/// Binary configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Overrides the state file location.
    pub state_path: Option<PathBuf>,
    /// Account signed in by the local identity provider.
    pub user: UserIdentity,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut user = UserIdentity::new(
            value(USER_ID).unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            AuthProviderKind::Google,
        );
        user.display_name = value(USER_NAME);
        user.email = value(USER_EMAIL);

        Self {
            state_path: value(STATE_PATH).map(PathBuf::from),
            user,
        }
    }
}
