//! Configuration System
//!
//! Layered configuration for the `storobj` binary and for embedders who want
//! file-driven object options. Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. Global file: `$XDG_CONFIG_HOME/storobj/config.toml`
//! 3. An explicit file (`--config`)
//! 4. `STOROBJ__`-prefixed environment variables (`STOROBJ__BACKEND__KIND=sled`)

use crate::error::StoreError;
use crate::logging::LoggingConfig;
use crate::object::ObjectOptions;
use crate::store::{FileStore, KeyValueStore, MemoryStore, SledStore};
use config::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::{global_config_path, project_dirs};

/// Prefix of environment overrides; nested keys are joined with `__`.
pub const ENV_PREFIX: &str = "STOROBJ";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorobjConfig {
    /// Backing store selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Options applied to every object opened through the binary
    #[serde(default)]
    pub object: ObjectOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kind of backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local; nothing survives exit
    Memory,
    /// One file per key under a directory
    #[default]
    File,
    /// A sled database
    Sled,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::File => "file",
            BackendKind::Sled => "sled",
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Store location; defaults to a per-kind directory under the data dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl BackendConfig {
    /// Location the backend will use, if it has one.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, StoreError> {
        if self.kind == BackendKind::Memory {
            return Ok(None);
        }
        if let Some(path) = &self.path {
            return Ok(Some(path.clone()));
        }
        let dirs = project_dirs().ok_or_else(|| {
            StoreError::Config("Cannot determine a data directory; set backend.path".to_string())
        })?;
        let leaf = match self.kind {
            BackendKind::Sled => "db",
            _ => "objects",
        };
        Ok(Some(dirs.data_dir().join(leaf)))
    }

    /// Open the configured backing store.
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let path = self.resolved_path()?;
        debug!(backend = self.kind.as_str(), path = ?path, "Opening backing store");
        let store: Arc<dyn KeyValueStore> = match (self.kind, path) {
            (BackendKind::File, Some(path)) => Arc::new(FileStore::new(path)?),
            (BackendKind::Sled, Some(path)) => Arc::new(SledStore::new(path)?),
            _ => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

impl StorobjConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.backend.path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::Config("backend.path cannot be empty".to_string()));
            }
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(StoreError::Config(format!(
                "Invalid log format: {}",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Render as TOML, the format config files are read in.
    pub fn to_toml(&self) -> Result<String, StoreError> {
        toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to render config: {}", e)))
    }
}

/// Loads [`StorobjConfig`] from the layered sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    global: Option<PathBuf>,
    file: Option<PathBuf>,
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            global: global_config_path(),
            file: None,
            use_env: true,
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit file on top of the global one.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skip the global config file.
    pub fn without_global(mut self) -> Self {
        self.global = None;
        self
    }

    /// Skip environment overrides.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Load from defaults, the global file, an optional explicit file and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<StorobjConfig, StoreError> {
        let mut loader = Self::new();
        if let Some(path) = explicit {
            loader = loader.with_file(path);
        }
        loader.build()
    }

    /// Load from defaults and a single file, ignoring the global file and environment.
    pub fn load_from_file(path: &Path) -> Result<StorobjConfig, StoreError> {
        Self::new().without_global().without_env().with_file(path).build()
    }

    pub fn build(&self) -> Result<StorobjConfig, StoreError> {
        let mut builder = merge::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder, self.global.as_ref())?;
        if let Some(path) = &self.file {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: StorobjConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
