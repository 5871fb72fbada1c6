//! Tracing initialization.

use tracing_subscriber::{fmt, EnvFilter, prelude::*};

const DEFAULT_FILTER: &str = "info,pairs=debug,tower_http=info,axum=info";

/// Install the global subscriber.
///
/// RUST_LOG overrides the default filter, e.g. `RUST_LOG=pairs=trace,tower_http=debug`.
/// LOG_FORMAT=compact switches to single-line output for container logs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let compact = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("compact"));
    let fmt_layer = if compact {
        fmt::layer().compact().with_target(false).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
