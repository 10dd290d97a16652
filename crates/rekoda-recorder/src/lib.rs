//! Chzzk live-stream recorder.
//!
//! Reads the settings the setup step produced, then runs one task per channel that
//! keeps trying to record it. Ctrl-C stops everything.

pub mod api;
pub mod error;
pub mod naming;
pub mod progress;
pub mod recorder;
pub mod settings;
pub mod tools;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

pub use error::RecorderError;
use rekoda_core::config::PathsConfig;

const BANNER: &str = "Chzzk Rekoda made by munsy0227\n\
If you encounter any bugs or errors, please report them on the Radiyu Shelter or GitHub issues!\n\
버그나 에러가 발생하면 라디유 쉘터나 깃허브 이슈에 제보해 주세요!";

/// Record every configured channel until Ctrl-C.
pub async fn run(paths: &PathsConfig) -> Result<()> {
    println!("{}", BANNER);

    let workdir = paths.workdir.clone();
    let settings = settings::load_settings(&workdir)
        .await
        .context("Failed to load recorder settings")?;
    // fail early on a missing or broken cookie file
    settings::load_cookies(&workdir)
        .await
        .context("Failed to load cookies")?;
    let tools = tools::ToolPaths::detect(&workdir)?;
    let client = api::LiveDetailClient::new()?;

    let ctx = Arc::new(recorder::RecorderContext {
        workdir,
        tools,
        client,
        retry_interval: Duration::from_secs(settings.timeout_secs),
        stream_segment_threads: settings.stream_segment_threads,
    });

    let mut tasks = JoinSet::new();
    for channel in settings.channels.iter().cloned() {
        let delay = Duration::from_secs(settings.delay_for(&channel));
        tasks.spawn(recorder::record_channel(Arc::clone(&ctx), channel, delay));
    }

    tokio::select! {
        _ = async { while tasks.join_next().await.is_some() {} } => {
            tracing::info!("All channels finished.");
        }
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Recording stopped by user.");
        }
    }
    // aborting the tasks drops their children, which kills them
    tasks.shutdown().await;
    Ok(())
}
