//! storobj CLI Binary
//!
//! Command-line interface for inspecting and editing storage objects.

use anyhow::Context;
use clap::Parser;
use std::process;
use storage_object::cli::{Cli, RunContext};
use storage_object::config::ConfigLoader;
use storage_object::logging::{init_logging, LoggingConfig};
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    debug!(command = cli.command.name(), "storobj starting");

    match run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.config.clone(), cli.backend, cli.store_path.clone())
        .context("Failed to open backing store")?;
    let result = context
        .execute(&cli.command)
        .map_err(|e| anyhow::anyhow!(storage_object::cli::map_error(&e)));
    // Flush whatever is still pending before the process goes away.
    let flushed = context.shutdown();
    debug!(hooks = flushed, "Shutdown hooks fired");
    result
}

/// Build logging configuration from CLI args and config files.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }

    config
}
