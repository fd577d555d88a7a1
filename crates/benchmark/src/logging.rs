//! Logging initialization for the CLI.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` selects the filter (default: `info`), e.g.
/// `RUST_LOG=u_cutstock_guillotine=debug`. Records emitted through the `log`
/// facade by the optimizer crates are forwarded to the subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Subscriber for tests; ignores repeated initialization.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
