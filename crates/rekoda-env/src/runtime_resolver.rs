//! Interpreter resolution: pick the Python 3 that will build the venv.
//!
//! `VersionProbe` is the seam between the resolution rule and the processes it
//! runs; the pipeline uses [`SystemProbe`], tests substitute their own.

use std::path::PathBuf;
use std::process::Command;

use crate::error::BootstrapError;

/// Preferred interpreter name.
pub const PRIMARY_INTERPRETER: &str = "python3";

/// Fallback name, accepted only when it reports a 3.x version.
pub const FALLBACK_INTERPRETER: &str = "python";

/// Substring the fallback's version banner must contain.
const PY3_MARKER: &str = "3.";

/// What `<program> --version` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    pub success: bool,
    /// stdout followed by stderr (Python 2 prints its banner on stderr)
    pub banner: String,
}

/// Runs `--version` against a candidate. `None` means the program could not be started.
pub trait VersionProbe {
    fn probe(&self, program: &str) -> Option<ProbeOutput>;
}

/// Probe that actually spawns the candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl VersionProbe for SystemProbe {
    fn probe(&self, program: &str) -> Option<ProbeOutput> {
        let out = Command::new(program).arg("--version").output().ok()?;
        let mut banner = String::from_utf8_lossy(&out.stdout).into_owned();
        banner.push_str(&String::from_utf8_lossy(&out.stderr));
        Some(ProbeOutput {
            success: out.status.success(),
            banner: banner.trim().to_string(),
        })
    }
}

/// Primary and fallback interpreter names (or paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterCandidates {
    pub primary: String,
    pub fallback: String,
}

impl Default for InterpreterCandidates {
    fn default() -> Self {
        Self {
            primary: PRIMARY_INTERPRETER.to_string(),
            fallback: FALLBACK_INTERPRETER.to_string(),
        }
    }
}

/// The interpreter chosen for venv creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterpreter {
    pub program: PathBuf,
    pub version: String,
}

/// Pick the interpreter. The fallback is probed only when the primary cannot be run.
pub fn resolve_interpreter<P: VersionProbe + ?Sized>(
    probe: &P,
    candidates: &InterpreterCandidates,
) -> Result<ResolvedInterpreter, BootstrapError> {
    if let Some(out) = probe.probe(&candidates.primary).filter(|o| o.success) {
        tracing::debug!(program = %candidates.primary, version = %out.banner, "primary interpreter found");
        return Ok(ResolvedInterpreter {
            program: PathBuf::from(&candidates.primary),
            version: out.banner,
        });
    }

    if let Some(out) = probe
        .probe(&candidates.fallback)
        .filter(|o| o.banner.contains(PY3_MARKER))
    {
        tracing::debug!(program = %candidates.fallback, version = %out.banner, "fallback interpreter accepted");
        return Ok(ResolvedInterpreter {
            program: PathBuf::from(&candidates.fallback),
            version: out.banner,
        });
    }

    Err(BootstrapError::InterpreterNotFound {
        primary: candidates.primary.clone(),
        fallback: candidates.fallback.clone(),
    })
}
