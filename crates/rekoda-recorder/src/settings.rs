//! Recorder settings: the JSON files the settings script writes into the workdir.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::RecorderError;

pub const TIME_FILE: &str = "time_sleep.txt";
pub const THREAD_FILE: &str = "thread.txt";
pub const CHANNELS_FILE: &str = "channels.json";
pub const DELAYS_FILE: &str = "delays.json";
pub const COOKIE_FILE: &str = "cookie.json";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SEGMENT_THREADS: u64 = 2;
const DEFAULT_OUTPUT_DIR: &str = "./recordings";

/// One entry of `channels.json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    /// "on" unless set to "off"
    #[serde(default)]
    pub active: Option<String>,
}

impl Channel {
    pub fn is_active(&self) -> bool {
        self.active.as_deref() != Some("off")
    }

    pub fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)
    }
}

/// `cookie.json`: the two Naver session cookies.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Cookies {
    #[serde(rename = "NID_AUT", default)]
    pub nid_aut: String,
    #[serde(rename = "NID_SES", default)]
    pub nid_ses: String,
}

impl Cookies {
    /// Value for a `Cookie:` header.
    pub fn header_value(&self) -> String {
        format!("NID_AUT={}; NID_SES={}", self.nid_aut, self.nid_ses)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Seconds between recording attempts
    pub timeout_secs: u64,
    pub stream_segment_threads: u64,
    pub channels: Vec<Channel>,
    /// identifier → start delay in seconds
    pub delays: HashMap<String, u64>,
}

impl Settings {
    pub fn delay_for(&self, channel: &Channel) -> u64 {
        channel
            .identifier
            .as_ref()
            .and_then(|id| self.delays.get(id))
            .copied()
            .unwrap_or(0)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RecorderError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| RecorderError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| RecorderError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// A bare integer, or an object holding `key` (number or numeric string).
fn number_setting(
    value: &Value,
    key: &'static str,
    default: u64,
    path: &Path,
) -> Result<u64, RecorderError> {
    let invalid = || RecorderError::SettingsValue {
        path: path.to_path_buf(),
        key,
    };
    let field = match value {
        Value::Object(map) => match map.get(key) {
            Some(v) => v,
            None => return Ok(default),
        },
        other => other,
    };
    match field {
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub async fn load_settings(workdir: &Path) -> Result<Settings, RecorderError> {
    let time_path = workdir.join(TIME_FILE);
    let time_value: Value = read_json(&time_path).await?;
    let timeout_secs = number_setting(&time_value, "timeout", DEFAULT_TIMEOUT_SECS, &time_path)?;

    let thread_path = workdir.join(THREAD_FILE);
    let thread_value: Value = read_json(&thread_path).await?;
    let stream_segment_threads =
        number_setting(&thread_value, "threads", DEFAULT_SEGMENT_THREADS, &thread_path)?;

    let channels: Vec<Channel> = read_json(&workdir.join(CHANNELS_FILE)).await?;
    let delays: HashMap<String, u64> = read_json(&workdir.join(DELAYS_FILE)).await?;

    Ok(Settings {
        timeout_secs,
        stream_segment_threads,
        channels,
        delays,
    })
}

/// Re-read on every attempt so refreshed cookies are picked up without a restart.
pub async fn load_cookies(workdir: &Path) -> Result<Cookies, RecorderError> {
    read_json(&cookie_path(workdir)).await
}

pub fn cookie_path(workdir: &Path) -> PathBuf {
    workdir.join(COOKIE_FILE)
}
