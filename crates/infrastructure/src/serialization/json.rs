//! JSON encoding of the saved state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),
}

/// Serializes a value as pretty JSON with 2-space indentation and a
/// trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    to_json_stable_bytes(value).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Same as [`to_json_stable`], as bytes ready to be written.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Deserializes JSON bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}
