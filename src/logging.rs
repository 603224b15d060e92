//! Tracing setup for the binaries. The library only emits events.

use tracing_subscriber::EnvFilter;

use crate::env_config::log_filter;

/// Install a `fmt` subscriber filtered by `GEMCOST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_new(log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
