//! Build the isolated Python environment and install the recorder's packages into it.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::BootstrapError;
use crate::runtime_resolver::ResolvedInterpreter;

/// Environment directory name, created under the invocation directory.
pub const VENV_DIR_NAME: &str = "venv";

/// Packages installed (and upgraded) on every run. Deliberately unpinned.
pub const REQUIRED_PACKAGES: &[&str] = &["streamlink", "aiohttp", "aiofiles", "orjson", "uvloop"];

/// `<work_dir>/venv`
pub fn venv_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(VENV_DIR_NAME)
}

/// Directory holding the environment's executables (`bin/` or `Scripts/`).
pub fn scripts_dir(env_dir: &Path) -> PathBuf {
    let bin = env_dir.join("bin");
    let scripts = env_dir.join("Scripts");
    if !bin.exists() && scripts.exists() {
        return scripts;
    }
    if cfg!(windows) && !bin.exists() {
        scripts
    } else {
        bin
    }
}

/// Executable file name for `tool` on this platform.
fn exe_name(tool: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    }
}

/// Run `<interpreter> -m venv <env_dir>` and check the directory is there afterwards.
///
/// The tool's own exit status is only logged: the directory check is the gate.
pub fn create_venv(
    interpreter: &ResolvedInterpreter,
    env_dir: &Path,
    cwd: &Path,
) -> Result<(), BootstrapError> {
    let status = Command::new(&interpreter.program)
        .arg("-m")
        .arg("venv")
        .arg(env_dir)
        .current_dir(cwd)
        .status();
    match status {
        Ok(s) if s.success() => {
            tracing::debug!(env_dir = %env_dir.display(), "venv created");
        }
        Ok(s) => {
            tracing::warn!(env_dir = %env_dir.display(), status = %s, "venv creation exited unsuccessfully");
        }
        Err(e) => {
            tracing::warn!(
                program = %interpreter.program.display(),
                error = %e,
                "failed to start venv creation"
            );
        }
    }

    if env_dir.is_dir() {
        Ok(())
    } else {
        Err(BootstrapError::EnvironmentMissing(env_dir.to_path_buf()))
    }
}

/// An activated environment: what `source venv/bin/activate` would put in the
/// shell, carried as a value. Commands built from it see the venv first on PATH.
/// Dropping it is the deactivation.
#[derive(Debug)]
pub struct ActivatedEnv {
    env_dir: PathBuf,
    scripts_dir: PathBuf,
    path_var: OsString,
}

impl ActivatedEnv {
    pub fn activate(env_dir: &Path) -> Result<Self> {
        let scripts_dir = scripts_dir(env_dir);
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let path_var = std::env::join_paths(
            std::iter::once(scripts_dir.clone()).chain(std::env::split_paths(&inherited)),
        )
        .with_context(|| format!("Build PATH for {}", scripts_dir.display()))?;
        tracing::debug!(env_dir = %env_dir.display(), "environment activated");
        Ok(Self {
            env_dir: env_dir.to_path_buf(),
            scripts_dir,
            path_var,
        })
    }

    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Path of `tool` inside the environment (may not exist).
    pub fn tool_path(&self, tool: &str) -> PathBuf {
        self.scripts_dir.join(exe_name(tool))
    }

    /// A command for `program` running with this environment's variables.
    pub fn command(&self, program: impl AsRef<std::ffi::OsStr>) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("VIRTUAL_ENV", &self.env_dir)
            .env("PATH", &self.path_var)
            .env_remove("PYTHONHOME");
        cmd
    }

    /// `pip` inside the environment, or `python -m pip` when no pip script exists.
    fn pip_command(&self) -> Command {
        let pip = self.tool_path("pip");
        if pip.exists() {
            self.command(pip)
        } else {
            let mut cmd = self.command(self.tool_path("python"));
            cmd.arg("-m").arg("pip");
            cmd
        }
    }
}

impl Drop for ActivatedEnv {
    fn drop(&mut self) {
        tracing::debug!(env_dir = %self.env_dir.display(), "environment deactivated");
    }
}

/// How the package install went. Never fatal for the pipeline.
#[derive(Debug)]
pub enum InstallOutcome {
    Installed,
    Failed(ExitStatus),
    NotStarted(std::io::Error),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Installed)
    }
}

/// `pip install --upgrade <packages>` inside `env`, output streamed to the terminal.
pub fn install_packages(env: &ActivatedEnv, packages: &[&str], cwd: &Path) -> InstallOutcome {
    let mut cmd = env.pip_command();
    cmd.arg("install").arg("--upgrade").args(packages).current_dir(cwd);
    match cmd.status() {
        Ok(s) if s.success() => InstallOutcome::Installed,
        Ok(s) => InstallOutcome::Failed(s),
        Err(e) => InstallOutcome::NotStarted(e),
    }
}
