//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, paths as path_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Observability: quiet, log_level, log_json, log_file
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub log_file: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self::read_env()
        })
    }

    fn read_env() -> Self {
        Self {
            quiet: env_bool(obv_keys::REKODA_QUIET, obv_keys::QUIET_ALIASES, false),
            log_level: env_or(
                obv_keys::REKODA_LOG_LEVEL,
                obv_keys::LOG_LEVEL_ALIASES,
                || "rekoda=info".to_string(),
            ),
            log_json: env_bool(obv_keys::REKODA_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            log_file: env_optional(obv_keys::REKODA_LOG_FILE, obv_keys::LOG_FILE_ALIASES),
        }
    }
}

/// Where the recorder looks for its settings files, venv and plugins.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub workdir: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let workdir = env_optional(path_keys::REKODA_WORKDIR, path_keys::WORKDIR_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self { workdir }
    }

    /// Resolve `path` against the workdir unless it is already absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = PathBuf::from(path);
        if p.is_absolute() {
            p
        } else {
            self.workdir.join(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_relative_and_absolute() {
        let paths = PathsConfig {
            workdir: PathBuf::from("/srv/rekoda"),
        };
        assert_eq!(paths.resolve("log.log"), PathBuf::from("/srv/rekoda/log.log"));
        #[cfg(unix)]
        assert_eq!(paths.resolve("/var/log/r.log"), PathBuf::from("/var/log/r.log"));
    }
}
