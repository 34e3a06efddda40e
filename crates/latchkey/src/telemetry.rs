//! Logging setup for binaries.
//!
//! Library crates only emit `tracing` events. Whoever owns `main` decides
//! whether and how they're printed, usually by calling [`init_tracing`].

use tracing_subscriber::EnvFilter;

/// The filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,rustls=warn";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once: only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init fails only if a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
