//! Logging setup for the binary.
//!
//! Events go to stderr so stdout stays clean for results. `CONQUEST_LOG`
//! takes any `EnvFilter` directive and overrides the `-v` count.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity flag.
pub(crate) const LOG_ENV: &str = "CONQUEST_LOG";

/// Map a `-v` count to a tracing directive.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"`
pub(crate) const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Uses `try_init()`, so a second call is ignored.
pub(crate) fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
