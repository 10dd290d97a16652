//! Environment variable loading.
//!
//! Keeps the primary-then-alias fallback chain in one place so callers never
//! repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Deprecated variable → recommended variable
const DEPRECATED_PAIRS: &[(&str, &str)] = &[
    ("CHZZK_QUIET", "REKODA_QUIET"),
    ("CHZZK_LOG_LEVEL", "REKODA_LOG_LEVEL"),
    ("CHZZK_LOG_JSON", "REKODA_LOG_JSON"),
    ("CHZZK_LOG_FILE", "REKODA_LOG_FILE"),
    ("CHZZK_WORKDIR", "REKODA_WORKDIR"),
];

/// Print a migration hint once when only the deprecated name is set.
fn warn_deprecated_env_vars() {
    use std::sync::Once;
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        let hints: Vec<String> = DEPRECATED_PAIRS
            .iter()
            .filter(|(deprecated, recommended)| {
                env::var(deprecated).is_ok() && env::var(recommended).is_err()
            })
            .map(|(deprecated, recommended)| format!("{} → {}", deprecated, recommended))
            .collect();
        if !hints.is_empty() {
            tracing::warn!(
                "[DEPRECATED] these environment variables should be renamed:\n   {}",
                hints.join("\n   ")
            );
        }
    });
}

/// Load `.env` from the current directory (existing variables are kept).
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
        warn_deprecated_env_vars();
    });
}

/// Load `<dir>/.env` without overriding variables that are already set.
pub fn load_dotenv_from_dir(dir: &Path) {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return;
    };
    for (key, value) in content.lines().filter_map(parse_dotenv_line) {
        if env::var(key).is_err() {
            set_env_var(key, value);
        }
    }
}

/// Parse one `KEY=value` line. Blank lines and `#` comments yield `None`.
fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let mut value = value.trim();
    // Strip inline comment (# not inside quotes)
    if let Some(hash_pos) = value.find('#') {
        let before_hash = value[..hash_pos].trim_end();
        if !before_hash.contains('"') && !before_hash.contains('\'') {
            value = before_hash;
        }
    }
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    if key.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` for unset or blank values.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Boolean variable: 0/false/no/off are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

// Callers must invoke this before any worker threads exist (before the tokio
// runtime is built).
#[allow(unsafe_code)]
fn set_env_var(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // set_var races with concurrent env reads, so tests that write take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_parse_dotenv_line_plain_and_quoted() {
        assert_eq!(parse_dotenv_line("A=1"), Some(("A", "1")));
        assert_eq!(parse_dotenv_line("  B = \"two words\" "), Some(("B", "two words")));
        assert_eq!(parse_dotenv_line("C='x'"), Some(("C", "x")));
    }

    #[test]
    fn test_parse_dotenv_line_skips_comments_and_blanks() {
        assert_eq!(parse_dotenv_line(""), None);
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line("no_equals_sign"), None);
        assert_eq!(parse_dotenv_line("=value"), None);
    }

    #[test]
    fn test_parse_dotenv_line_strips_inline_comment() {
        assert_eq!(
            parse_dotenv_line("REKODA_LOG_LEVEL=rekoda=debug # verbose"),
            Some(("REKODA_LOG_LEVEL", "rekoda=debug"))
        );
    }

    #[test]
    fn test_env_or_uses_alias_then_default() {
        let _guard = env_guard();
        set_env_var("REKODA_TEST_ENV_OR_ALIAS", "from-alias");
        let v = env_or("REKODA_TEST_ENV_OR_PRIMARY", &["REKODA_TEST_ENV_OR_ALIAS"], || {
            "default".to_string()
        });
        assert_eq!(v, "from-alias");
        let d = env_or("REKODA_TEST_ENV_OR_UNSET", &[], || "default".to_string());
        assert_eq!(d, "default");
    }

    #[test]
    fn test_env_bool_values() {
        let _guard = env_guard();
        set_env_var("REKODA_TEST_BOOL_OFF", "off");
        set_env_var("REKODA_TEST_BOOL_ON", "1");
        assert!(!env_bool("REKODA_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("REKODA_TEST_BOOL_ON", &[], false));
        assert!(env_bool("REKODA_TEST_BOOL_UNSET", &[], true));
    }

    #[test]
    fn test_env_optional_blank_is_none() {
        let _guard = env_guard();
        set_env_var("REKODA_TEST_OPTIONAL_BLANK", "   ");
        assert_eq!(env_optional("REKODA_TEST_OPTIONAL_BLANK", &[]), None);
    }

    #[test]
    fn test_load_dotenv_from_dir_keeps_existing() {
        let _guard = env_guard();
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "REKODA_TEST_DOTENV_NEW=fresh\nREKODA_TEST_DOTENV_KEEP=overwritten\n",
        )
        .unwrap();
        set_env_var("REKODA_TEST_DOTENV_KEEP", "original");
        load_dotenv_from_dir(tmp.path());
        assert_eq!(env::var("REKODA_TEST_DOTENV_NEW").unwrap(), "fresh");
        assert_eq!(env::var("REKODA_TEST_DOTENV_KEEP").unwrap(), "original");
    }
}
