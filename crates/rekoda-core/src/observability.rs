//! Observability: tracing init for the setup and recorder entry points.
//!
//! Uses config::ObservabilityConfig for REKODA_QUIET, LOG_LEVEL, LOG_JSON, LOG_FILE.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{prelude::*, EnvFilter, Layer, Registry};

use crate::config::ObservabilityConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Tracing initialization mode.
#[derive(Clone, Debug)]
pub enum TracingMode {
    /// Console only, level from REKODA_LOG_LEVEL / REKODA_QUIET
    Default,
    /// Console plus a debug-level log file at `log_file`.
    Record { log_file: PathBuf },
}

/// Initialize tracing. Call once at process startup.
/// When REKODA_QUIET=1 only WARN and above reach the console.
pub fn init_tracing(mode: TracingMode) {
    let cfg = ObservabilityConfig::from_env();
    let mut layers: Vec<BoxedLayer> = vec![console_layer(cfg)];

    if let TracingMode::Record { log_file: path } = mode {
        match file_layer(&path) {
            Ok(layer) => layers.push(layer),
            Err(e) => eprintln!("⚠ Could not open log file {}: {}", path.display(), e),
        }
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();
}

fn console_level(cfg: &ObservabilityConfig) -> String {
    if cfg.quiet {
        "rekoda=warn".to_string()
    } else {
        cfg.log_level.clone()
    }
}

fn console_layer(cfg: &ObservabilityConfig) -> BoxedLayer {
    let level = console_level(cfg);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    if cfg.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    }
}

fn file_layer(path: &Path) -> std::io::Result<BoxedLayer> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::new("rekoda=debug"))
        .boxed())
}
