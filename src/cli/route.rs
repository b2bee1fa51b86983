//! CLI route: single route table and run context. Dispatches to storage objects and output.

use crate::cli::output::render_value;
use crate::cli::parse::Commands;
use crate::config::{BackendKind, ConfigLoader, StorobjConfig};
use crate::error::StoreError;
use crate::lifecycle::ShutdownHooks;
use crate::object::path::{display_path, parse_path};
use crate::object::{PathSegment, StorageObject};
use crate::store::KeyValueStore;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: effective config, opened backing store,
/// and the shutdown registry the binary fires before exiting.
pub struct RunContext {
    config: StorobjConfig,
    store: Arc<dyn KeyValueStore>,
    hooks: ShutdownHooks,
}

impl RunContext {
    /// Load config (optional explicit file), apply CLI overrides, and open the store.
    pub fn new(
        config_path: Option<PathBuf>,
        backend: Option<BackendKind>,
        store_path: Option<PathBuf>,
    ) -> Result<Self, StoreError> {
        let mut config = ConfigLoader::load(config_path.as_deref())?;
        if let Some(kind) = backend {
            config.backend.kind = kind;
        }
        if let Some(path) = store_path {
            config.backend.path = Some(path);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: StorobjConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let store = config.backend.open()?;
        Ok(Self {
            config,
            store,
            hooks: ShutdownHooks::new(),
        })
    }

    pub fn config(&self) -> &StorobjConfig {
        &self.config
    }

    pub fn shutdown_hooks(&self) -> &ShutdownHooks {
        &self.hooks
    }

    /// Open the storage object under `key` with the configured options.
    pub fn open(&self, key: &str) -> Result<StorageObject, StoreError> {
        StorageObject::builder(key, Arc::clone(&self.store))
            .options(self.config.object.clone())
            .shutdown_hooks(&self.hooks)
            .open()
    }

    /// Flush every object that still has a pending write. Returns how many hooks ran.
    pub fn shutdown(&self) -> usize {
        self.hooks.fire()
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, StoreError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command.name(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, StoreError> {
        match command {
            Commands::Get { key, path } => self.handle_get(key, path.as_deref()),
            Commands::Set {
                key,
                path,
                value,
                date,
            } => self.handle_set(key, path, value, *date),
            Commands::Delete { key, path } => self.handle_delete(key, path),
            Commands::Clear { key } => {
                let object = self.open(key)?;
                object.clear()?;
                Ok(format!("Cleared '{}'", key))
            }
            Commands::Dump { key } => Ok(self.store.get(key)?.unwrap_or_default()),
            Commands::Config => self.config.to_toml(),
        }
    }

    fn handle_get(&self, key: &str, path: Option<&str>) -> Result<String, StoreError> {
        let object = self.open(key)?;
        let segments = path.map(parse_path).unwrap_or_default();
        let Some((last, parent)) = segments.split_last() else {
            return Ok(render_value(&Value::Object(object.snapshot())));
        };
        let value = object
            .at_path(parent.iter().cloned())
            .get(last.clone())?
            .ok_or_else(|| StoreError::PathNotFound(display_path(&segments)))?;
        Ok(render_value(&value))
    }

    fn handle_set(
        &self,
        key: &str,
        path: &str,
        raw: &str,
        as_date: bool,
    ) -> Result<String, StoreError> {
        let segments = parse_path(path);
        let (last, parent) = split_target(&segments)?;
        let value = if as_date {
            parse_date(raw)?
        } else {
            parse_cli_value(raw)
        };
        debug!(key, path, kind = value.kind(), "Setting value");

        let object = self.open(key)?;
        object.at_path(parent.iter().cloned()).set(last.clone(), value)?;
        object.flush_pending()?;
        Ok(render_value(&Value::Object(object.snapshot())))
    }

    fn handle_delete(&self, key: &str, path: &str) -> Result<String, StoreError> {
        let segments = parse_path(path);
        let (last, parent) = split_target(&segments)?;

        let object = self.open(key)?;
        let removed = object.at_path(parent.iter().cloned()).delete(last.clone())?;
        object.flush_pending()?;
        match removed {
            Some(value) => Ok(render_value(&value)),
            None => Err(StoreError::PathNotFound(display_path(&segments))),
        }
    }
}

fn split_target(segments: &[PathSegment]) -> Result<(&PathSegment, &[PathSegment]), StoreError> {
    segments
        .split_last()
        .ok_or_else(|| StoreError::PathNotFound("a non-empty path is required".to_string()))
}

/// JSON when it parses, a plain string otherwise.
fn parse_cli_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

fn parse_date(raw: &str) -> Result<Value, StoreError> {
    let instant = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| StoreError::Convert(format!("'{}' is not an RFC 3339 timestamp: {}", raw, e)))?;
    Ok(Value::date(instant.with_timezone(&Utc)))
}
