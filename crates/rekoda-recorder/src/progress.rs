//! ffmpeg `-progress` parsing and periodic summaries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum gap between two progress summaries for one stream.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(5);

const GREEN: u8 = 32;

/// Which ffmpeg pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// Wrap `message` in an ANSI color escape.
pub fn colorize(message: &str, color_code: u8) -> String {
    format!("\x1b[{}m{}\x1b[0m", color_code, message)
}

/// Human-readable size: `B KB MB GB TB`, two decimals, negatives as `0 B`.
pub fn format_size(size_bytes: i64) -> String {
    if size_bytes < 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut i = 0;
    while size >= 1024.0 && i < UNITS.len() - 1 {
        size /= 1024.0;
        i += 1;
    }
    format!("{:.2} {}", size, UNITS[i])
}

/// Timestamp noise ffmpeg prints for live HLS input.
fn is_timestamp_noise(line: &str) -> bool {
    line.contains("Invalid DTS") || line.contains("Invalid PTS")
}

/// What to do with one line of ffmpeg output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Drop the line entirely
    Skip,
    /// Nothing to report yet
    Quiet,
    /// A stderr line worth a debug log
    Debug(String),
    /// Periodic summary (already colored)
    Report(String),
}

/// Collects `key=value` pairs and emits a summary at most every [`REPORT_INTERVAL`].
#[derive(Debug)]
pub struct ProgressTracker {
    summary: HashMap<String, String>,
    last_report: Instant,
    interval: Duration,
}

impl ProgressTracker {
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, REPORT_INTERVAL)
    }

    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            summary: HashMap::new(),
            last_report: now,
            interval,
        }
    }

    /// Feed one raw line. A stderr line yields `Debug`; a summary wins over it.
    pub fn feed(&mut self, raw: &str, kind: StreamKind, now: Instant) -> LineAction {
        let line = raw.trim();
        let mut action = LineAction::Quiet;

        if kind == StreamKind::Stderr && !line.is_empty() {
            if is_timestamp_noise(line) {
                return LineAction::Skip;
            }
            action = LineAction::Debug(line.to_string());
        }

        let parts: Vec<&str> = line.split('=').collect();
        if let [key, value] = parts.as_slice() {
            self.summary
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        if self.summary.contains_key("progress")
            && now.duration_since(self.last_report) >= self.interval
        {
            let report = self.render();
            self.last_report = now;
            self.summary.clear();
            return LineAction::Report(colorize(&report, GREEN));
        }
        action
    }

    fn field(&self, key: &str) -> &str {
        self.summary.get(key).map(String::as_str).unwrap_or("N/A")
    }

    fn render(&self) -> String {
        let total_size = self
            .summary
            .get("total_size")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0);
        format!(
            "Bitrate={} Total Size={} Out Time={} Speed={} Progress={}",
            self.field("bitrate"),
            format_size(total_size),
            self.field("out_time"),
            self.field("speed"),
            self.field("progress"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(-5), "0 B");
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024_i64.pow(5)), "3072.00 TB");
    }

    #[test]
    fn test_colorize() {
        assert_eq!(colorize("ok", 32), "\x1b[32mok\x1b[0m");
    }

    #[test]
    fn test_stderr_noise_skipped() {
        let start = Instant::now();
        let mut t = ProgressTracker::new(start);
        assert_eq!(
            t.feed("[mpegts] Invalid DTS: 123", StreamKind::Stderr, start),
            LineAction::Skip
        );
        assert_eq!(
            t.feed("Stream mapping:", StreamKind::Stderr, start),
            LineAction::Debug("Stream mapping:".to_string())
        );
        assert_eq!(t.feed("", StreamKind::Stderr, start), LineAction::Quiet);
    }

    #[test]
    fn test_report_waits_for_interval_and_progress_key() {
        let start = Instant::now();
        let mut t = ProgressTracker::new(start);
        assert_eq!(t.feed("bitrate=6000.0kbits/s", StreamKind::Stdout, start), LineAction::Quiet);
        assert_eq!(t.feed("total_size=1048576", StreamKind::Stdout, start), LineAction::Quiet);
        // progress present but interval not elapsed
        assert_eq!(
            t.feed("progress=continue", StreamKind::Stdout, start + Duration::from_secs(1)),
            LineAction::Quiet
        );
        let later = start + Duration::from_secs(6);
        match t.feed("speed=1.01x", StreamKind::Stdout, later) {
            LineAction::Report(msg) => {
                assert_eq!(
                    msg,
                    colorize(
                        "Bitrate=6000.0kbits/s Total Size=1.00 MB Out Time=N/A Speed=1.01x Progress=continue",
                        32
                    )
                );
            }
            other => panic!("expected report, got {:?}", other),
        }
        // summary was reset
        assert_eq!(
            t.feed("out_time=00:00:10", StreamKind::Stdout, later + Duration::from_secs(10)),
            LineAction::Quiet
        );
    }

    #[test]
    fn test_lines_with_extra_equals_are_ignored() {
        let start = Instant::now();
        let mut t = ProgressTracker::with_interval(start, Duration::ZERO);
        assert_eq!(t.feed("a=b=c", StreamKind::Stdout, start), LineAction::Quiet);
        assert!(matches!(
            t.feed("progress=end", StreamKind::Stdout, start),
            LineAction::Report(_)
        ));
    }
}
