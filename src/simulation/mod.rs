//! Gem lifecycle simulation and statistics.
//!
//! - [`engine`]: rollouts under the presented-subset decision rule
//! - [`statistics`]: batch totals, implied price and the final report

pub mod engine;
pub mod statistics;

pub use engine::{rollout, simulate_batch, Action, Decision, RolloutParams, RolloutState, Step};
pub use statistics::{
    aggregate_outcomes, build_report, BatchTotals, CostBreakdown, OutcomeHistogram, Report,
};
