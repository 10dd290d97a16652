//! Quiet-mode aware logging. When REKODA_QUIET=1, suppress [INFO].
//! Uses `tracing::info!` so output is captured by the tracing subscriber.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

/// Step banner printed to stderr; silenced together with [INFO] in quiet mode.
#[macro_export]
macro_rules! step {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            eprintln!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    rekoda_core::config::ObservabilityConfig::from_env().quiet
}
