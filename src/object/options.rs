//! Storage object options

use crate::debounce::DebounceMode;
use crate::error::StoreError;
use crate::value::{to_value, Map, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default debounce time in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Per-object configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectOptions {
    /// Tree used when no valid stored entry exists, and restored by `clear()`
    #[serde(default)]
    pub initial_values: Map,

    /// Debounce time in milliseconds; 0 writes synchronously on every change
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Fixed windows when true, sliding otherwise
    #[serde(default)]
    pub debounce_fixed: bool,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ObjectOptions {
    fn default() -> Self {
        Self {
            initial_values: Map::new(),
            debounce_ms: default_debounce_ms(),
            debounce_fixed: false,
        }
    }
}

impl ObjectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_values(mut self, initial_values: Map) -> Self {
        self.initial_values = initial_values;
        self
    }

    /// Use a serializable value as the initial tree.
    ///
    /// The value must serialize to an object; anything else, or anything with
    /// no JSON form, is rejected as an unsupported type.
    pub fn with_initial<T: Serialize + ?Sized>(mut self, initial: &T) -> Result<Self, StoreError> {
        match to_value(initial)? {
            Value::Object(map) => {
                self.initial_values = map;
                Ok(self)
            }
            other => Err(StoreError::UnsupportedType(format!(
                "initial values must be an object, got {}",
                other.kind()
            ))),
        }
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_debounce_fixed(mut self, fixed: bool) -> Self {
        self.debounce_fixed = fixed;
        self
    }

    pub fn debounce_time(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn debounce_mode(&self) -> DebounceMode {
        DebounceMode::from_fixed(self.debounce_fixed)
    }
}
