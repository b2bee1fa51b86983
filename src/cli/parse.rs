//! CLI parse: clap types for storobj. No behavior; definitions only.

use crate::config::BackendKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// storobj - inspect and edit persistent storage objects
#[derive(Parser, Debug)]
#[command(name = "storobj")]
#[command(about = "Inspect and edit storage objects held in a key-value store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backing store kind (overrides config)
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    /// Backing store location (overrides config)
    #[arg(long = "path", global = true)]
    pub store_path: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Print the tree stored under a key, or the value at a dotted path
    Get {
        /// Store key
        key: String,
        /// Dotted path into the tree (e.g. `d.e` or `f.0.g`)
        path: Option<String>,
    },
    /// Set the value at a dotted path
    Set {
        /// Store key
        key: String,
        /// Dotted path into the tree
        path: String,
        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
        /// Parse the value as an RFC 3339 timestamp and store a date
        #[arg(long)]
        date: bool,
    },
    /// Delete the value at a dotted path
    Delete {
        /// Store key
        key: String,
        /// Dotted path into the tree
        path: String,
    },
    /// Reset a key to the configured initial values
    Clear {
        /// Store key
        key: String,
    },
    /// Print the raw persisted string for a key
    Dump {
        /// Store key
        key: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    /// Command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Get { .. } => "get",
            Commands::Set { .. } => "set",
            Commands::Delete { .. } => "delete",
            Commands::Clear { .. } => "clear",
            Commands::Dump { .. } => "dump",
            Commands::Config => "config",
        }
    }
}
