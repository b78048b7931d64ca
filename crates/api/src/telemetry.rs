//! Tracing/logging initialization for the admin surface.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for the process.
///
/// Filtering is controlled by `RUST_LOG` (default `info`). Set
/// `LOG_FORMAT=json` for machine-readable output; the default is a compact
/// human format. Safe to call more than once (later calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init();
    }
}
