//! Structured logging setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=estoque_inventory=trace` - Mirror writes and more
//! - Default: [`DEFAULT_FILTER`]

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,estoque=debug,sqlx=warn";

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `filter`, which wins over [`DEFAULT_FILTER`].
/// Returns `false` if a subscriber was already installed (e.g. by a test
/// harness); that is not an error.
pub fn init_tracing(filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
