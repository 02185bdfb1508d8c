//! Tracing/logging initialization for embedding applications.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. The `log` facade is bridged into
/// the same stream, so `log::` and `tracing::` records end up together.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .try_init();
}
