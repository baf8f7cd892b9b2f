//! Tracing subscriber setup.
//!
//! Filter precedence: `THREADKEY_LOG`, then `-v` (debug), then the
//! `log_level` config value, then `warn`. Output goes to stderr so stdout
//! stays clean for JSON.

use std::io;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "THREADKEY_LOG";

pub fn init(verbose: bool, configured: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(configured.unwrap_or("warn"))
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
