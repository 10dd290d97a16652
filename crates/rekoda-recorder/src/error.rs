use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to read settings file {}: {source}", path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid JSON: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings file {}: '{key}' must be a non-negative integer", path.display())]
    SettingsValue { path: PathBuf, key: &'static str },

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),
}
