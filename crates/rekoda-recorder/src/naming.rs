//! Output file naming: sanitized titles and a byte cap on file names.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Longest file name (in UTF-8 bytes) written as-is.
pub const MAX_FILENAME_BYTES: usize = 150;

/// Characters of the stem kept when a name is shortened.
const SHORTENED_STEM_CHARS: usize = MAX_FILENAME_BYTES - 75;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H_%M_%S";

fn special_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[\\/:*?"<>|\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{1F600}-\x{1F64F}]"#)
            .expect("static pattern")
    })
}

/// Strip characters that are illegal in file names (and common emoji) from a title.
pub fn sanitize_title(title: &str) -> String {
    special_chars().replace_all(title.trim_end(), "").into_owned()
}

/// Local-time stamp used at the front of recording names.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `[timestamp] channel title.ts`, shortened if needed.
pub fn recording_file_name(timestamp: &str, channel_name: &str, live_title: &str) -> String {
    shorten_filename(&format!(
        "[{}] {} {}.ts",
        timestamp,
        channel_name,
        sanitize_title(live_title)
    ))
}

/// Split at the last dot that is not the first character (like `os.path.splitext`).
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Names over [`MAX_FILENAME_BYTES`] become `<first 75 chars>_<8 hex of sha256><ext>`.
pub fn shorten_filename(filename: &str) -> String {
    if filename.len() <= MAX_FILENAME_BYTES {
        return filename.to_string();
    }
    let digest = hex::encode(Sha256::digest(filename.as_bytes()));
    let (stem, extension) = split_extension(filename);
    let head: String = stem.chars().take(SHORTENED_STEM_CHARS).collect();
    let shortened = format!("{}_{}{}", head, &digest[..8], extension);
    tracing::warn!("Filename {} is too long. Shortening to {}.", filename, shortened);
    shortened
}
