//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources replace earlier values key by key; tables merge. The
//! `object.initial_values` table is the one exception worth knowing: it merges
//! like any other table, so a file can add keys to defaults but not remove them.

use crate::object::DEFAULT_DEBOUNCE_MS;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("backend.kind", "file")?
        .set_default("object.debounce_ms", DEFAULT_DEBOUNCE_MS as i64)?
        .set_default("object.debounce_fixed", false)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
