//! Tracing subscriber setup for the binary.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Install a stdout fmt subscriber. Respects `RUST_LOG`, otherwise logs at
/// `info`. Calling it twice is harmless.
pub fn init_logging(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
