//! Wire codec
//!
//! The persisted form of a tree is plain JSON. Dates are the only value with
//! no JSON counterpart; they are written as a single-field marker object
//! `{"__SO_date": <epoch milliseconds>}` and turned back into dates on decode.

use crate::error::StoreError;
use crate::value::{Map, Value};
use tracing::debug;

/// Field name identifying a date marker object.
pub const DATE_MARKER: &str = "__SO_date";

/// Encode a tree to its JSON string.
pub fn encode(tree: &Map) -> Result<String, StoreError> {
    Ok(serde_json::to_string(tree)?)
}

/// Decode a stored JSON string into a tree.
///
/// Returns `None` only for malformed JSON; callers fall back to their
/// initial values then. Well-formed JSON whose top level is not an object
/// (`null`, `42`, `[1]`, `"s"`) contributes no fields and decodes to an
/// empty tree.
pub fn decode(raw: &str) -> Option<Map> {
    match serde_json::from_str::<serde_json::Value>(raw).ok()? {
        serde_json::Value::Object(map) => {
            Some(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
        }
        other => {
            debug!(kind = crate::value::Value::from(other).kind(), "Stored entry is not an object");
            Some(Map::new())
        }
    }
}
