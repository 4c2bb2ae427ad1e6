//! Tracing initialization for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with the given filter
/// directives (e.g. `"shortfall=debug"`). Safe to call more than once;
/// later calls are ignored.
pub fn initialize(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}
