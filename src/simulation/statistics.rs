//! Aggregate statistics over a batch of rollouts.
//!
//! [`aggregate_outcomes`] reduces outcomes to [`BatchTotals`]; the calibration
//! loop reads the implied price from them, and [`build_report`] turns the
//! final batch into the per-point [`Report`]. Every per-point figure is
//! `f64::INFINITY` when no run finished with a positive score.

use serde::Serialize;

use crate::types::RolloutOutcome;

/// Final net scores bucketed as +2, +1, 0 and negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeHistogram {
    pub two_points: usize,
    pub one_point: usize,
    pub zero_points: usize,
    pub negative_points: usize,
}

impl OutcomeHistogram {
    pub fn record(&mut self, final_score: i32) {
        match final_score {
            s if s >= 2 => self.two_points += 1,
            1 => self.one_point += 1,
            0 => self.zero_points += 1,
            _ => self.negative_points += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.two_points + self.one_point + self.zero_points + self.negative_points
    }
}

/// Sums over one batch of rollouts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatchTotals {
    /// Gems consumed: one per rollout.
    pub runs: usize,
    pub processing_cost: f64,
    pub restart_cost: f64,
    /// Σ final score over runs that ended above zero.
    pub positive_score: u64,
    pub histogram: OutcomeHistogram,
}

pub fn aggregate_outcomes(outcomes: &[RolloutOutcome]) -> BatchTotals {
    let mut totals = BatchTotals::default();
    for out in outcomes {
        totals.runs += 1;
        totals.processing_cost += out.processing_cost;
        totals.restart_cost += out.restart_cost;
        if out.final_score > 0 {
            totals.positive_score += out.final_score as u64;
        }
        totals.histogram.record(out.final_score);
    }
    totals
}

impl BatchTotals {
    /// `amount / positive_score`, or infinity when nothing scored.
    #[inline(always)]
    pub fn per_point(&self, amount: f64) -> f64 {
        if self.positive_score == 0 {
            f64::INFINITY
        } else {
            amount / self.positive_score as f64
        }
    }

    /// Everything spent on the batch: gems (with fees), processing and restarts.
    pub fn total_cost(&self, gem_cost_per_run: f64) -> f64 {
        self.runs as f64 * gem_cost_per_run + self.processing_cost + self.restart_cost
    }

    /// Currency actually paid per positive net point.
    pub fn implied_price(&self, gem_cost_per_run: f64) -> f64 {
        self.per_point(self.total_cost(gem_cost_per_run))
    }
}

/// Per-positive-point split of the total cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub gem: f64,
    pub fee: f64,
    pub processing: f64,
    pub restart: f64,
}

/// Summary of a settled calibration. Infinite figures serialize as `null`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Gems consumed per positive net point.
    pub gems_per_point: f64,
    /// Total currency per positive net point.
    pub currency_per_point: f64,
    /// Processing plus restart currency per positive net point.
    pub processing_currency_per_point: f64,
    pub cost_breakdown: CostBreakdown,
    pub outcome_histogram: OutcomeHistogram,
    pub runs: usize,
    pub calibration_rounds: usize,
}

pub fn build_report(
    totals: &BatchTotals,
    gem_unit_price: f64,
    fee_per_unit: f64,
    calibration_rounds: usize,
) -> Report {
    let runs = totals.runs as f64;
    Report {
        gems_per_point: totals.per_point(runs),
        currency_per_point: totals.implied_price(gem_unit_price + fee_per_unit),
        processing_currency_per_point: totals
            .per_point(totals.processing_cost + totals.restart_cost),
        cost_breakdown: CostBreakdown {
            gem: totals.per_point(runs * gem_unit_price),
            fee: totals.per_point(runs * fee_per_unit),
            processing: totals.per_point(totals.processing_cost),
            restart: totals.per_point(totals.restart_cost),
        },
        outcome_histogram: totals.histogram,
        runs: totals.runs,
        calibration_rounds,
    }
}
