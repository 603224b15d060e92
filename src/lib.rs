//! # gemcost — gem processing policy and cost-per-point estimator
//!
//! Estimates what one net point of gem quality really costs when gems are
//! processed with an optimal stop/reroll/restart policy.
//!
//! ## Pipeline
//!
//! | Step | Module | Description |
//! |------|--------|-------------|
//! | options | [`option_model`] | Weighted transitions available from a stat vector |
//! | valuation | [`value_function`] | Memoized optimal-stopping value of every reachable state at a price per point |
//! | rollouts | [`simulation::engine`] | One gem played under the presented-subset rule, many in parallel |
//! | calibration | [`calibration`] | Price per point iterated until valuation and simulation agree |
//! | report | [`simulation::statistics`] | Histogram and per-point cost breakdown of the final batch |
//!
//! [`api_computations::run`] ties the steps together for one request.
//!
//! ## State representation
//!
//! A processing state S = (a, r, v) where:
//! - `a`: attempts remaining
//! - `r`: rerolls remaining
//! - `v`: four stats in [1, 5]; the first two score, net(v) = v₀ + v₁ − 8
//!
//! States are keyed directly by [`types::ProcessState`] in a per-round hash map.

pub mod api_computations;
pub mod calibration;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod logging;
pub mod option_model;
pub mod server;
pub mod simulation;
pub mod types;
pub mod value_function;
