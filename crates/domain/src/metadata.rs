//! Authorship metadata stamped onto entities written to the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a remote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// User id of the author.
    pub author: String,

    /// Display name of the author, if the identity provider exposes one.
    #[serde(default)]
    pub author_name: Option<String>,

    /// Avatar URL of the author.
    #[serde(default)]
    pub author_image: Option<String>,
}

/// Metadata stamped onto any entity written remotely while sync is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// Author fields.
    #[serde(flatten)]
    pub author: Author,

    /// Time of the write (RFC 3339 on the wire).
    pub updated_at: DateTime<Utc>,
}

impl SyncMetadata {
    /// Creates metadata for a write performed by `author` at `updated_at`.
    #[must_use]
    pub const fn new(author: Author, updated_at: DateTime<Utc>) -> Self {
        Self { author, updated_at }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_flat() {
        let meta = SyncMetadata::new(
            Author {
                author: "u1".to_string(),
                author_name: Some("Ada".to_string()),
                author_image: None,
            },
            DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["author"], "u1");
        assert_eq!(json["author_name"], "Ada");
        assert_eq!(json["updated_at"], "2024-05-01T10:00:00Z");
    }
}
