//! `rekoda setup`: bootstrap the Python toolchain in the current directory.

use anyhow::{Context, Result};

/// Returns the exit code: 0 once the settings script was reached, 1 on a failed gate.
pub fn cmd_setup() -> Result<i32> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(rekoda_env::run_setup(&cwd))
}
