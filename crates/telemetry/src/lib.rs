//! Tracing initialization shared by the upwatch binaries.

use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber at the default `info` level.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Initialize the global subscriber with an explicit base level.
///
/// `RUST_LOG` still overrides the level per target, and
/// `RUST_LOG_FORMAT=json` switches the output to newline-delimited JSON for
/// log shippers.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
