//! Environment variable keys and their aliases.
//!
//! The `REKODA_*` names win; `CHZZK_*` names from older deployments are still read.

/// Observability and logging
pub mod observability {
    pub const REKODA_QUIET: &str = "REKODA_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["CHZZK_QUIET"];

    pub const REKODA_LOG_LEVEL: &str = "REKODA_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["CHZZK_LOG_LEVEL"];

    pub const REKODA_LOG_JSON: &str = "REKODA_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &["CHZZK_LOG_JSON"];

    /// Recorder log file. Relative paths resolve against the workdir.
    pub const REKODA_LOG_FILE: &str = "REKODA_LOG_FILE";
    pub const LOG_FILE_ALIASES: &[&str] = &["CHZZK_LOG_FILE"];
}

/// Working directory for the recorder (settings files, venv, plugin dir)
pub mod paths {
    pub const REKODA_WORKDIR: &str = "REKODA_WORKDIR";
    pub const WORKDIR_ALIASES: &[&str] = &["CHZZK_WORKDIR"];
}
