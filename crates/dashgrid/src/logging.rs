#![forbid(unsafe_code)]

//! Optional subscriber bootstrap.
//!
//! Libraries never install a subscriber. Hosts that want one can call
//! [`init`]; filtering follows `RUST_LOG` and defaults to `dashgrid=info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "dashgrid=info";

/// Install a global JSON subscriber.
///
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    init_with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    )
}

/// Install a global JSON subscriber with an explicit filter.
pub fn init_with_filter(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
