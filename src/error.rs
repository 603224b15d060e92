//! Request validation errors.
//!
//! The engine itself cannot fail; these are raised only by the outer
//! surfaces (HTTP, CLI) before a run is started.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    #[error("gem_unit_price must be a positive number, got {0}")]
    NonPositiveGemPrice(f64),

    #[error("fee_base_unit_price must be a positive number when the fee surcharge or restart is enabled")]
    MissingFeeBasePrice,

    #[error("simulation_runs must be at least 1")]
    NoRuns,

    #[error("simulation_runs must not exceed {max}, got {requested}")]
    TooManyRuns { requested: usize, max: usize },
}
