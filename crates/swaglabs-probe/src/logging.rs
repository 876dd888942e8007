//! Tracing subscriber setup for scenario runs.
//!
//! `RUST_LOG` wins when set; otherwise the page layer logs at `info`.
//! Safe to call from every test: only the first call installs a subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "swaglabs_probe=info";

/// Install a compact fmt subscriber writing to the test writer.
///
/// Returns `true` if this call installed it.
pub fn init() -> bool {
    init_with(DEFAULT_FILTER)
}

/// Same as [`init`] with a caller-chosen fallback filter
pub fn init_with(fallback: &str) -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .compact()
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(fallback, "tracing initialized");
    }
    installed
}

/// Install a JSON subscriber, for CI runs that ship logs elsewhere
pub fn init_json() -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).json().try_init().is_ok()
}
