//! Shared tracing/logging initialization.
//!
//! Every Chatlock process sets up `tracing_subscriber` the same way: an
//! env-filter seeded from `RUST_LOG` (falling back to the configured
//! default) and either human-readable or JSON output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Initialise the global tracing subscriber from logging settings.
///
/// `RUST_LOG` always wins over `config.default_filter`. Calling this a
/// second time in one process panics (the global subscriber is already
/// set), so do it once at startup.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.default_filter.clone()),
    );
    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
