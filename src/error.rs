//! Error types for the storage object system.

use thiserror::Error;

/// Errors raised by storage objects, their backing stores, and the CLI surface.
///
/// A stored entry that fails to decode is not an error: the object silently
/// starts from its initial values instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Cannot address into {found} at '{path}'")]
    NotAContainer { path: String, found: &'static str },

    #[error("Invalid array index '{segment}' at '{path}'")]
    InvalidIndex { path: String, segment: String },

    #[error("Array index {index} at '{path}' exceeds the limit of {limit} slots")]
    IndexTooLarge {
        path: String,
        index: usize,
        limit: usize,
    },

    #[error("Failed to convert value: {0}")]
    Convert(String),

    #[error("Failed to encode tree: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backing store error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::Config(err.to_string())
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(format!("sled: {}", err))
    }
}
