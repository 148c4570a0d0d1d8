//! Command implementations

mod config;
mod locate;
mod nearby;
mod operations;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proximity_core::config::LayeredConfig;
use proximity_host::MemorySink;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let layered = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Nearby(args) => nearby::execute(args, layered, &output).await,
        Commands::Locate(args) => locate::execute(args, layered, &output).await,
        Commands::Operations => operations::execute(layered, &output),
        Commands::Config => config::execute(layered, &output),
    }
}

/// Defaults, then the file when one is given, then the environment
fn load_config(path: Option<&Path>) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();
    let config = match path {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => config,
    };
    Ok(config.load_from_env())
}

/// Print what the operations told the user
fn show_notifications(sink: &MemorySink, output: &OutputWriter) {
    for notification in sink.take() {
        output.notification(&notification);
    }
}
