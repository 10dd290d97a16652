use std::path::PathBuf;

use thiserror::Error;

/// The two ways the bootstrap pipeline gives up. Every other failure is logged and
/// the pipeline carries on.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Neither the primary nor the fallback interpreter was acceptable.
    #[error("no usable Python 3 interpreter found (tried '{primary}' and '{fallback}')")]
    InterpreterNotFound { primary: String, fallback: String },

    /// The environment directory is not there after the creation step.
    #[error("virtual environment directory {} was not created", .0.display())]
    EnvironmentMissing(PathBuf),
}

impl BootstrapError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::InterpreterNotFound { .. } | BootstrapError::EnvironmentMissing(_) => 1,
        }
    }
}
