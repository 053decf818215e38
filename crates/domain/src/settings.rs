//! Local application settings.
//!
//! Only documented keys may be applied. Adding a setting means adding a
//! variant to [`SettingKey`], so every setting stays documented.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Keys accepted by [`LocalSettings::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    /// Scroll to a section when certain actions are triggered.
    ScrollIntoEnabled,
    /// Color section frames differently.
    FrameColorsEnabled,
    /// Send requests through the proxy.
    ProxyEnabled,
    /// URL of the proxy.
    ProxyUrl,
    /// Security key of the proxy.
    ProxyKey,
    /// Properties to exclude from the URL (e.g. `auth`).
    UrlExcludes,
    /// Run requests through the browser extension.
    ExtensionsEnabled,
    /// Use the experimental URL bar.
    ExperimentalUrlBarEnabled,
}

impl SettingKey {
    /// Every documented key.
    pub const ALL: [Self; 8] = [
        Self::ScrollIntoEnabled,
        Self::FrameColorsEnabled,
        Self::ProxyEnabled,
        Self::ProxyUrl,
        Self::ProxyKey,
        Self::UrlExcludes,
        Self::ExtensionsEnabled,
        Self::ExperimentalUrlBarEnabled,
    ];

    /// Returns the stored key name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ScrollIntoEnabled => "SCROLL_INTO_ENABLED",
            Self::FrameColorsEnabled => "FRAME_COLORS_ENABLED",
            Self::ProxyEnabled => "PROXY_ENABLED",
            Self::ProxyUrl => "PROXY_URL",
            Self::ProxyKey => "PROXY_KEY",
            Self::UrlExcludes => "URL_EXCLUDES",
            Self::ExtensionsEnabled => "EXTENSIONS_ENABLED",
            Self::ExperimentalUrlBarEnabled => "EXPERIMENTAL_URL_BAR_ENABLED",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSetting(s.to_string()))
    }
}

/// Settings held by the local store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    /// Id of the selected project, if any.
    #[serde(default, rename = "currentProject")]
    pub current_project: Option<String>,

    /// Applied values keyed by [`SettingKey`] name.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl LocalSettings {
    /// Applies a `(key, value)` setting.
    ///
    /// # Errors
    /// Returns [`DomainError::UnknownSetting`] for undocumented keys.
    pub fn apply(&mut self, key: &str, value: Value) -> DomainResult<SettingKey> {
        let key: SettingKey = key.parse()?;
        self.values.insert(key.as_str().to_string(), value);
        Ok(key)
    }

    /// Returns the value of a setting, if it was applied.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.values.get(key.as_str())
    }
}
