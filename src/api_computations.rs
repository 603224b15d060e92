//! Entry point shared by the HTTP server and the CLI: validate a request,
//! derive the grade-dependent prices, calibrate, and build the report.

use rand::Rng;
use serde::Deserialize;

use crate::calibration::{calibrate, Calibration, CalibrationParams};
use crate::constants::*;
use crate::error::RequestError;
use crate::option_model::{enumerate_options, WeightedOption};
use crate::simulation::statistics::{build_report, Report};
use crate::types::{Grade, ProcessState, StatVector};
use crate::value_function::ValueTable;

/// Raw run request as sent by a client. Nothing here is trusted until [`RunRequest::validate`].
#[derive(Clone, Debug, Deserialize)]
pub struct RunRequest {
    pub grade: Grade,
    pub gem_unit_price: f64,
    #[serde(default)]
    pub use_restart: bool,
    #[serde(default)]
    pub use_fee_surcharge: bool,
    #[serde(default)]
    pub fee_base_unit_price: Option<f64>,
    #[serde(default = "default_simulation_runs")]
    pub simulation_runs: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_simulation_runs() -> usize {
    1000
}

/// Validated inputs of [`run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunParams {
    pub grade: Grade,
    pub gem_unit_price: f64,
    pub use_restart: bool,
    pub use_fee_surcharge: bool,
    /// Only read when the fee surcharge or restart is enabled.
    pub fee_base_unit_price: f64,
    pub simulation_runs: usize,
    /// Fixed seed, or `None` to draw one per run.
    pub seed: Option<u64>,
}

impl RunRequest {
    pub fn validate(&self) -> Result<RunParams, RequestError> {
        let price_ok = self.gem_unit_price.is_finite() && self.gem_unit_price > 0.0;
        if !price_ok {
            return Err(RequestError::NonPositiveGemPrice(self.gem_unit_price));
        }

        let needs_fee_base = self.use_fee_surcharge || self.use_restart;
        let fee_base_unit_price = match self.fee_base_unit_price {
            Some(p) if p > 0.0 && p.is_finite() => p,
            _ if needs_fee_base => return Err(RequestError::MissingFeeBasePrice),
            _ => 0.0,
        };

        if self.simulation_runs == 0 {
            return Err(RequestError::NoRuns);
        }
        if self.simulation_runs > MAX_SIMULATION_RUNS {
            return Err(RequestError::TooManyRuns {
                requested: self.simulation_runs,
                max: MAX_SIMULATION_RUNS,
            });
        }

        Ok(RunParams {
            grade: self.grade,
            gem_unit_price: self.gem_unit_price,
            use_restart: self.use_restart,
            use_fee_surcharge: self.use_fee_surcharge,
            fee_base_unit_price,
            simulation_runs: self.simulation_runs,
            seed: self.seed,
        })
    }
}

/// Fee charged per gem of `grade`, derived from the crystal base price.
pub fn fee_per_unit(grade: Grade, fee_base_unit_price: f64) -> f64 {
    fee_base_unit_price / CRYSTAL_BUNDLE * FEE_CRYSTALS_PER_UNIT * grade.fee_multiplier()
}

/// Cost of one restart, derived from the crystal base price.
pub fn restart_unit_cost(fee_base_unit_price: f64) -> f64 {
    fee_base_unit_price / CRYSTAL_BUNDLE * RESTART_CRYSTALS
}

impl RunParams {
    pub fn fee_per_unit(&self) -> f64 {
        if self.use_fee_surcharge {
            fee_per_unit(self.grade, self.fee_base_unit_price)
        } else {
            0.0
        }
    }

    pub fn calibration_params(&self) -> CalibrationParams {
        let (attempts, rerolls) = self.grade.budget();
        CalibrationParams {
            attempts,
            rerolls,
            unit_price: self.gem_unit_price,
            fee_per_unit: self.fee_per_unit(),
            restart_enabled: self.use_restart,
            restart_unit_cost: if self.use_restart {
                restart_unit_cost(self.fee_base_unit_price)
            } else {
                0.0
            },
            run_count: self.simulation_runs,
        }
    }
}

/// Calibrate and return the full [`Calibration`] alongside the report.
pub fn run_with_calibration(params: &RunParams) -> (Report, Calibration) {
    let seed = params.seed.unwrap_or_else(|| rand::rng().random());
    let cal_params = params.calibration_params();
    tracing::debug!(?params, seed, "starting run");

    let calibration = calibrate(&cal_params, seed);
    let report = build_report(
        &calibration.totals,
        cal_params.unit_price,
        cal_params.fee_per_unit,
        calibration.rounds(),
    );
    (report, calibration)
}

/// Estimate the cost per net point for one configuration.
pub fn run(params: &RunParams) -> Report {
    run_with_calibration(params).0
}

/// Optimal value of a single state for `grade` at a fixed price per point.
///
/// Builds the grade's table from its root; states not reachable from the
/// root are solved on demand.
pub fn compute_state_value(grade: Grade, price: f64, state: ProcessState) -> f64 {
    let (attempts, rerolls) = grade.budget();
    let mut table = ValueTable::build(ProcessState::root(attempts, rerolls), price);
    table.value(state)
}

/// Options on offer from `stats`, with their weights renormalized to sum to 1.
pub fn compute_option_distribution(stats: &StatVector) -> Vec<(WeightedOption, f64)> {
    let options = enumerate_options(stats);
    let total: f64 = options.iter().map(|o| o.probability).sum();
    options
        .into_iter()
        .map(|o| {
            let share = if total > 0.0 { o.probability / total } else { 0.0 };
            (o, share)
        })
        .collect()
}
