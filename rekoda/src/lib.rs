//! Rekoda CLI library, shared by the `rekoda` and `rekoda-setup` binaries.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use rekoda_core::config::{ObservabilityConfig, PathsConfig};
use rekoda_core::observability::{init_tracing, TracingMode};
use std::path::PathBuf;

/// Default recorder log file, relative to the workdir.
const RECORD_LOG_FILE: &str = "log.log";

/// Parse args and dispatch. Returns the process exit code.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Setup => {
            init_tracing(TracingMode::Default);
            commands::setup::cmd_setup()
        }
        Commands::Record { workdir } => {
            let mut paths = PathsConfig::from_env();
            if let Some(dir) = workdir {
                paths.workdir = PathBuf::from(dir);
            }
            let log_file = ObservabilityConfig::from_env()
                .log_file
                .clone()
                .unwrap_or_else(|| RECORD_LOG_FILE.to_string());
            init_tracing(TracingMode::Record {
                log_file: paths.resolve(&log_file),
            });
            commands::record::cmd_record(&paths)?;
            Ok(0)
        }
    }
}

/// Entry for `rekoda-setup`: no arguments, just the bootstrap pipeline.
pub fn run_setup_only() -> Result<i32> {
    init_tracing(TracingMode::Default);
    commands::setup::cmd_setup()
}
