use anyhow::{anyhow, Result};
use std::env;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `POWERGEN_LOGGING_LEVEL`, which defaults to `info`.
/// `POWERGEN_LOGGING_FORMAT` selects `pretty` (default) or `compact` output.  Logs go to stderr so
/// that stdout only carries command output.
pub fn init() -> Result<()> {
    let log_level = env::var("POWERGEN_LOGGING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("POWERGEN_LOGGING_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match log_format.as_str() {
        "compact" => tracing_subscriber::fmt()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .try_init(),
    };

    result.map_err(|e| anyhow!("Failed to install the tracing subscriber: {e}"))
}
