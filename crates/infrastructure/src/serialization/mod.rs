//! Pretty, newline-terminated JSON for files written to disk.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
