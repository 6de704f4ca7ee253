//! Logging setup built on `tracing-subscriber`
//!
//! The level comes from `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=pricelist_core=debug`.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for a binary
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Install a debug-level subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
