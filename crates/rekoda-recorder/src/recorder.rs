//! Per-channel recording loop: streamlink → pipe → ffmpeg, retried every `timeout`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::api::{auth_header_pairs, LiveDetailClient};
use crate::naming;
use crate::progress::{LineAction, ProgressTracker, StreamKind};
use crate::settings::{self, Channel, Cookies};
use crate::tools::ToolPaths;

pub const PLUGIN_DIR: &str = "plugin";
const LIVE_PAGE_BASE: &str = "https://chzzk.naver.com/live";

/// Shared, read-only state for all channel tasks.
pub struct RecorderContext {
    pub workdir: PathBuf,
    pub tools: ToolPaths,
    pub client: LiveDetailClient,
    pub retry_interval: Duration,
    pub stream_segment_threads: u64,
}

pub fn stream_url(channel_id: &str) -> String {
    format!("{}/{}", LIVE_PAGE_BASE, channel_id)
}

/// streamlink arguments, `--http-header` pairs included.
pub fn streamlink_args(
    url: &str,
    plugin_dir: &Path,
    stream_segment_threads: u64,
    cookies: &Cookies,
    ffmpeg: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--stdout".into(),
        url.into(),
        "best".into(),
        "--hls-live-restart".into(),
        "--plugin-dirs".into(),
        plugin_dir.to_string_lossy().into_owned(),
        "--stream-segment-threads".into(),
        stream_segment_threads.to_string(),
    ];
    for (name, value) in auth_header_pairs(cookies) {
        args.push("--http-header".into());
        args.push(format!("{}={}", name, value));
    }
    args.extend([
        "--ffmpeg-ffmpeg".into(),
        ffmpeg.to_string_lossy().into_owned(),
        "--ffmpeg-copyts".into(),
        "--hls-segment-stream-data".into(),
    ]);
    args
}

/// ffmpeg remux from stdin to `output`, progress on stdout.
pub fn ffmpeg_args(output: &Path) -> Vec<String> {
    let mut args: Vec<String> = [
        "-i",
        "pipe:0",
        "-c",
        "copy",
        "-progress",
        "pipe:1",
        "-copy_unknown",
        "-map_metadata:s:a",
        "0:g",
        "-bsf",
        "setts=pts=PTS-STARTPTS",
        "-y",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(output.to_string_lossy().into_owned());
    args
}

fn resolve_against(workdir: &Path, dir: &str) -> PathBuf {
    let p = PathBuf::from(dir);
    if p.is_absolute() {
        p
    } else {
        workdir.join(p)
    }
}

/// Log ffmpeg output line by line until the pipe closes. Invalid UTF-8 is tolerated
/// so the pipe is always drained.
async fn read_stream<R: AsyncRead + Unpin>(reader: R, channel_name: &str, kind: StreamKind) {
    let mut reader = BufReader::new(reader);
    let mut tracker = ProgressTracker::new(Instant::now());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                match tracker.feed(&line, kind, Instant::now()) {
                    LineAction::Debug(l) => {
                        tracing::debug!("{} ffmpeg stderr: {}", channel_name, l)
                    }
                    LineAction::Report(msg) => {
                        tracing::info!("{} {}: {}", channel_name, kind.as_str(), msg)
                    }
                    LineAction::Skip | LineAction::Quiet => {}
                }
            }
            Err(e) => {
                tracing::debug!("{} ffmpeg {} read error: {}", channel_name, kind.as_str(), e);
                break;
            }
        }
    }
}

/// One recording attempt. Returns the output path once both processes have exited.
///
/// Children are spawned with `kill_on_drop`, so an attempt that errors out (or a
/// task that is aborted) never leaves a streamlink or ffmpeg behind.
pub async fn record_once(
    ctx: &RecorderContext,
    channel: &Channel,
    recording_started: &mut bool,
) -> Result<PathBuf> {
    let cookies = settings::load_cookies(&ctx.workdir).await?;
    let timestamp = naming::timestamp_now();
    let live = ctx.client.fetch_live_content(channel, &cookies).await;
    let output_dir = resolve_against(&ctx.workdir, channel.output_dir());
    let file_name = naming::recording_file_name(
        &timestamp,
        &channel.name,
        live.live_title.as_deref().unwrap_or(""),
    );
    let output_path = output_dir.join(file_name);

    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Create output dir {}", output_dir.display()))?;

    if !*recording_started {
        tracing::info!("Recording started for {} at {}.", channel.name, timestamp);
        *recording_started = true;
    }

    let ffmpeg = ctx
        .tools
        .ffmpeg
        .as_deref()
        .context("ffmpeg is not available")?;

    let mut stream_process = Command::new(&ctx.tools.streamlink)
        .args(streamlink_args(
            &stream_url(&channel.id),
            &ctx.workdir.join(PLUGIN_DIR),
            ctx.stream_segment_threads,
            &cookies,
            ffmpeg,
        ))
        .current_dir(&ctx.workdir)
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", ctx.tools.streamlink.display()))?;

    let pipe: Stdio = stream_process
        .stdout
        .take()
        .context("streamlink stdout not captured")?
        .try_into()
        .context("Failed to hand streamlink output to ffmpeg")?;

    let mut ffmpeg_process = Command::new(ffmpeg)
        .args(ffmpeg_args(&output_path))
        .current_dir(&ctx.workdir)
        .stdin(pipe)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", ffmpeg.display()))?;

    let stdout = ffmpeg_process.stdout.take().context("ffmpeg stdout not captured")?;
    let stderr = ffmpeg_process.stderr.take().context("ffmpeg stderr not captured")?;

    let (_, _, ffmpeg_status) = tokio::join!(
        read_stream(stdout, &channel.name, StreamKind::Stdout),
        read_stream(stderr, &channel.name, StreamKind::Stderr),
        ffmpeg_process.wait(),
    );
    let ffmpeg_status = ffmpeg_status.context("Failed to wait for ffmpeg")?;
    tracing::info!(
        "ffmpeg process for {} exited with return code {}.",
        channel.name,
        exit_code_label(ffmpeg_status.code())
    );
    if *recording_started {
        tracing::info!("Recording stopped for {}.", channel.name);
        *recording_started = false;
    }

    let stream_status = stream_process
        .wait()
        .await
        .context("Failed to wait for streamlink")?;
    tracing::info!(
        "Stream recording process for {} exited with return code {}.",
        channel.name,
        exit_code_label(stream_status.code())
    );

    Ok(output_path)
}

fn exit_code_label(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Record `channel` forever: wait `delay`, then retry every `retry_interval`.
pub async fn record_channel(ctx: Arc<RecorderContext>, channel: Channel, delay: Duration) {
    tracing::info!("Attempting to record stream for channel: {}", channel.name);
    tokio::time::sleep(delay).await;

    if !channel.is_active() {
        tracing::info!("{} channel is inactive. Skipping recording.", channel.name);
        return;
    }

    let mut recording_started = false;
    loop {
        tracing::debug!("Found stream URL for channel: {}", channel.name);
        if let Err(e) = record_once(&ctx, &channel, &mut recording_started).await {
            tracing::error!("Error occurred while recording {}: {:#}", channel.name, e);
            if recording_started {
                tracing::info!("Recording stopped for {}.", channel.name);
                recording_started = false;
            }
        }
        tokio::time::sleep(ctx.retry_interval).await;
    }
}
