//! Shared environment configuration for the gemcost binaries.
//!
//! Consolidates `GEMCOST_PORT`, `GEMCOST_SEED`, `GEMCOST_LOG` and
//! `RAYON_NUM_THREADS` reads.

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
/// Builds the rayon global thread pool, tolerating one that already exists.
/// Returns thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    if rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .is_err()
    {
        tracing::warn!("rayon global pool already initialized");
    }
    tracing::info!(num_threads, "rayon threads");
    num_threads
}

/// Read `GEMCOST_PORT` (default 9100).
pub fn server_port() -> u16 {
    std::env::var("GEMCOST_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9100)
}

/// Read `GEMCOST_SEED`: a fixed seed applied to requests that do not carry one.
pub fn default_seed() -> Option<u64> {
    std::env::var("GEMCOST_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Read `GEMCOST_LOG` (default `info`), an `EnvFilter` directive string.
pub fn log_filter() -> String {
    std::env::var("GEMCOST_LOG").unwrap_or_else(|_| "info".to_string())
}
