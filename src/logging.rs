// ABOUTME: Installs the stderr tracing subscriber for the service and the CLI
// ABOUTME: HOTSWITCH_LOG takes precedence over the configured level

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "HOTSWITCH_LOG";

/// Builds the filter from `HOTSWITCH_LOG`, or from `level` when the variable is unset or invalid.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(level: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
