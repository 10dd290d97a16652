//! `rekoda record`: run the recorder on a multi-threaded tokio runtime.

use anyhow::{Context, Result};

use rekoda_core::config::PathsConfig;

pub fn cmd_record(paths: &PathsConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(rekoda_recorder::run(paths))
}
