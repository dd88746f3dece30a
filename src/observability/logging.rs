//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Route panics through the error pipeline
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level, so operators can raise
//!   verbosity without touching config

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `log_level` is the configured default; the `RUST_LOG` environment
/// variable takes precedence when set.
pub fn init_tracing(log_level: &str) {
    let default_directive = format!("nibblix_edge={log_level},tower_http={log_level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Report panics as structured error events before the default hook runs.
///
/// Stands in for the error-reporting SDK hook: anything that would page in
/// production at least lands in the logs with a location.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        tracing::error!(panic = %info, location = %location, "Panic captured");
        previous(info);
    }));
}
