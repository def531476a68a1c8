//! Diagnostic logging setup.
//!
//! Logs go to stderr so that progress and JSON output on stdout stay
//! clean.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `--verbose` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "debug";

/// Build the log filter. `--verbose` wins over `RUST_LOG`.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_tracing(verbose: bool) {
    let installed = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();

    if installed.is_ok() {
        tracing::debug!(verbose, "logging initialized");
    }
}
