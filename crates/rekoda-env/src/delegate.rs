//! Hand-off to the interactive settings script.
//!
//! The script's result is reported, never propagated: once the pipeline gets here
//! the process exits 0.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Name of the settings script run after provisioning.
#[cfg(not(windows))]
pub const SETTINGS_SCRIPT: &str = "settings.sh";
#[cfg(windows)]
pub const SETTINGS_SCRIPT: &str = "settings.bat";

/// What happened when the settings script ran.
#[derive(Debug)]
pub enum DelegateOutcome {
    Exited(ExitStatus),
    NotStarted(std::io::Error),
}

impl DelegateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DelegateOutcome::Exited(s) if s.success())
    }
}

/// `<work_dir>/<name>` when that file exists, otherwise the bare name for PATH lookup.
pub fn resolve_script(work_dir: &Path, name: &str) -> PathBuf {
    let local = work_dir.join(name);
    if local.is_file() {
        return local;
    }
    match which::which(name) {
        Ok(found) => found,
        Err(_) => PathBuf::from(name),
    }
}

/// Local `*.sh` scripts go through `sh`, so neither the exec bit nor a shebang is
/// required. PATH hits and `.bat` files are executed directly.
fn script_command(work_dir: &Path, script: &Path) -> Command {
    let is_local_shell_script = cfg!(unix)
        && script.starts_with(work_dir)
        && script.extension().is_some_and(|ext| ext == "sh");
    if is_local_shell_script {
        let mut cmd = Command::new("sh");
        cmd.arg(script);
        cmd
    } else {
        Command::new(script)
    }
}

/// Run the settings script with no arguments, inheriting stdio and environment.
pub fn run_settings_script(work_dir: &Path, name: &str) -> DelegateOutcome {
    let script = resolve_script(work_dir, name);
    tracing::debug!(script = %script.display(), "running settings script");
    match script_command(work_dir, &script).current_dir(work_dir).status() {
        Ok(status) => DelegateOutcome::Exited(status),
        Err(e) => DelegateOutcome::NotStarted(e),
    }
}
