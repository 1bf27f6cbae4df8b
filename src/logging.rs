//! Tracing subscriber setup
//!
//! Logs go to stderr so command output on stdout stays machine readable.

use std::io;
use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

/// Filter used when `--verbose` is not given: `RUST_LOG`, falling back to info
fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, as plain text or JSON lines
pub fn init_logging(verbose: bool, json: bool) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(filter(verbose));

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init()
    }
}
