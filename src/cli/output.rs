//! CLI output: value rendering and error mapping for the CLI surface.

use crate::error::StoreError;
use crate::value::Value;
use chrono::SecondsFormat;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &StoreError) -> String {
    match e {
        StoreError::PathNotFound(path) => format!("Nothing at '{}'", path),
        other => other.to_string(),
    }
}

/// Pretty JSON for display. Dates render as RFC 3339 strings rather than
/// as the persisted marker.
pub fn render_value(value: &Value) -> String {
    let display = to_display_json(value);
    serde_json::to_string_pretty(&display).unwrap_or_else(|_| display.to_string())
}

fn to_display_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Date(instant) => {
            serde_json::Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_display_json).collect())
        }
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_display_json(v)))
                .collect(),
        ),
        scalar => serde_json::Value::from(scalar.clone()),
    }
}
