//! Documents owned by the remote store and cached read-only on the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metadata::Author;

/// Remote setting that records whether the first sync has completed.
pub const SYNC_INITIALIZED: &str = "syncInitialized";

/// Per-feature sync switches stored as remote settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncFlag {
    /// Projects are mirrored remotely.
    Projects,
    /// History entries are mirrored remotely.
    History,
    /// Collections are mirrored remotely.
    Collections,
    /// Environments are mirrored remotely.
    Environments,
}

impl SyncFlag {
    /// Every flag, in the order they are enabled on first sync.
    pub const ALL: [Self; 4] = [
        Self::Projects,
        Self::History,
        Self::Collections,
        Self::Environments,
    ];

    /// Returns the setting name of the flag.
    #[must_use]
    pub const fn setting_name(&self) -> &'static str {
        match self {
            Self::Projects => "syncProjects",
            Self::History => "syncHistory",
            Self::Collections => "syncCollections",
            Self::Environments => "syncEnvironments",
        }
    }
}

/// Truthiness of a loosely typed setting value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A remote setting document. Its id is the setting name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Document id.
    #[serde(default)]
    pub id: String,

    /// Setting name. Documents written without one are named by their id.
    #[serde(default)]
    pub name: String,

    /// Setting value.
    #[serde(default)]
    pub value: Value,

    /// Time of the last write.
    #[serde(default, rename = "updatedOn", skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,

    /// Author of the last write.
    #[serde(flatten)]
    pub author: Option<Author>,
}

impl Setting {
    /// Creates an unsaved setting.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            value: value.into(),
            updated_on: None,
            author: None,
        }
    }

    /// Names the setting after its document id when the name is missing.
    #[must_use]
    pub fn named_by_id(mut self) -> Self {
        if self.name.is_empty() {
            self.name.clone_from(&self.id);
        }
        self
    }

    /// Returns true if the value is truthy.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        is_truthy(&self.value)
    }
}

/// An activity feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Store-assigned document id.
    #[serde(default)]
    pub id: String,

    /// Message body.
    #[serde(default)]
    pub message: String,

    /// Short label.
    #[serde(default)]
    pub label: String,

    /// Creation time; feeds are listed newest first.
    #[serde(default, rename = "createdOn", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    /// Author of the entry.
    #[serde(flatten)]
    pub author: Option<Author>,
}

/// A request history entry.
///
/// The payload is opaque; only the id and star flag are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Store-assigned document id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Whether the entry is starred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star: Option<bool>,

    /// The rest of the entry.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_loose_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([])));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn setting_without_name_falls_back_to_id() {
        let setting: Setting =
            serde_json::from_value(json!({"id": "syncInitialized", "value": true})).unwrap();
        assert_eq!(setting.named_by_id().name, "syncInitialized");

        let named: Setting =
            serde_json::from_value(json!({"id": "doc1", "name": "syncProjects"})).unwrap();
        assert_eq!(named.named_by_id().name, "syncProjects");
    }

    #[test]
    fn setting_reads_remote_shape() {
        let setting: Setting = serde_json::from_value(json!({
            "name": "syncProjects",
            "value": true,
            "updatedOn": "2024-01-01T00:00:00Z",
            "author": "u1",
            "author_name": null,
            "author_image": null
        }))
        .unwrap();
        assert!(setting.is_enabled());
        assert_eq!(setting.author.unwrap().author, "u1");
    }

    #[test]
    fn flag_names() {
        let names: Vec<_> = SyncFlag::ALL.iter().map(SyncFlag::setting_name).collect();
        assert_eq!(
            names,
            ["syncProjects", "syncHistory", "syncCollections", "syncEnvironments"]
        );
    }
}
