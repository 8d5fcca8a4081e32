//! Logging initialization
//!
//! Sets up the tracing subscriber with an environment-driven filter.
//! The host application calls this once at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging. Safe to call at most once per process.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notesync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize logging for tests, ignoring double-init errors from
/// parallel test binaries.
pub fn try_init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notesync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
