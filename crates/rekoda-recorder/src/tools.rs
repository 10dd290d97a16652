//! Locate streamlink (inside the bootstrapped venv) and ffmpeg.

use std::path::{Path, PathBuf};

use crate::error::RecorderError;

#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub streamlink: PathBuf,
    /// `None` when ffmpeg could not be found; attempts fail and are retried.
    pub ffmpeg: Option<PathBuf>,
}

impl ToolPaths {
    pub fn detect(workdir: &Path) -> Result<Self, RecorderError> {
        Self::detect_for(std::env::consts::OS, workdir, || which::which("ffmpeg").ok())
    }

    /// `find_ffmpeg` is only consulted on Linux and macOS.
    pub fn detect_for<F>(os: &str, workdir: &Path, find_ffmpeg: F) -> Result<Self, RecorderError>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        match os {
            "windows" => {
                tracing::info!("Running on Windows.");
                Ok(Self {
                    streamlink: workdir.join("venv").join("Scripts").join("streamlink.exe"),
                    ffmpeg: Some(workdir.join("ffmpeg").join("bin").join("ffmpeg.exe")),
                })
            }
            "linux" | "macos" => {
                let ffmpeg = find_ffmpeg();
                match &ffmpeg {
                    Some(p) => tracing::info!("Running on {}. ffmpeg found at: {}", os, p.display()),
                    None => tracing::error!("ffmpeg not found in PATH on {}.", os),
                }
                Ok(Self {
                    streamlink: workdir.join("venv").join("bin").join("streamlink"),
                    ffmpeg,
                })
            }
            other => Err(RecorderError::UnsupportedOs(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_layout_uses_venv_bin() {
        let tools =
            ToolPaths::detect_for("linux", Path::new("/w"), || Some(PathBuf::from("/usr/bin/ffmpeg")))
                .unwrap();
        assert_eq!(tools.streamlink, Path::new("/w").join("venv").join("bin").join("streamlink"));
        assert_eq!(tools.ffmpeg, Some(PathBuf::from("/usr/bin/ffmpeg")));
    }

    #[test]
    fn test_missing_ffmpeg_is_not_fatal() {
        let tools = ToolPaths::detect_for("macos", Path::new("/w"), || None).unwrap();
        assert!(tools.ffmpeg.is_none());
    }

    #[test]
    fn test_windows_layout_bundles_ffmpeg() {
        let tools = ToolPaths::detect_for("windows", Path::new("C"), || {
            panic!("PATH lookup is not used on Windows")
        })
        .unwrap();
        assert!(tools.streamlink.ends_with("venv/Scripts/streamlink.exe"));
        assert!(tools.ffmpeg.unwrap().ends_with("ffmpeg/bin/ffmpeg.exe"));
    }

    #[test]
    fn test_unsupported_os() {
        let err = ToolPaths::detect_for("freebsd", Path::new("/w"), || None).unwrap_err();
        assert_eq!(err.to_string(), "unsupported operating system: freebsd");
    }
}
