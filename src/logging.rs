//! # Logging
//!
//! `tracing` subscriber setup for the binary. Logs go to stderr so command
//! output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Env var selecting the log format; `json` enables structured output.
pub const LOG_FORMAT_ENV: &str = "VISITLOG_LOG_FORMAT";

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // a second call keeps the first subscriber
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
