//! Game-balance constants and tier budgets.
//!
//! Maps the processing rules to concrete values:
//! - |dims| = [`STAT_COUNT`] = 4 (two scoring, two non-scoring)
//! - stat range = [`STAT_MIN`]..=[`STAT_MAX`] = 1..=5
//! - NetScore = v[0] + v[1] − [`NET_SCORE_OFFSET`]
//! - cost of one attempt = [`BASE_PROCESSING_COST`] (before multipliers)

/// Number of stat dimensions on a gem.
pub const STAT_COUNT: usize = 4;

/// Number of leading dimensions that contribute to the net score.
pub const SCORING_DIMS: usize = 2;

/// Lowest legal stat value.
pub const STAT_MIN: u8 = 1;

/// Highest legal stat value.
pub const STAT_MAX: u8 = 5;

/// Subtracted from the scoring sum to get the net score (range −6..=+2).
pub const NET_SCORE_OFFSET: i32 = 8;

/// Currency charged per processing attempt.
pub const BASE_PROCESSING_COST: f64 = 900.0;

/// One row of the per-dimension delta table.
#[derive(Clone, Copy, Debug)]
pub struct DeltaRule {
    pub delta: i8,
    pub probability: f64,
    /// Current value must be strictly below this to offer the delta.
    /// A ceiling of 0 disables the rule.
    pub ceiling: u8,
}

/// Delta rules applied to every stat dimension, in emission order.
pub const DELTA_RULES: [DeltaRule; 5] = [
    DeltaRule { delta: 1, probability: 0.1165, ceiling: 6 },
    DeltaRule { delta: 2, probability: 0.0440, ceiling: 4 },
    DeltaRule { delta: 3, probability: 0.0175, ceiling: 3 },
    DeltaRule { delta: 4, probability: 0.0045, ceiling: 2 },
    DeltaRule { delta: -1, probability: 0.0300, ceiling: 0 },
];

/// "Change effect" options that leave the gem untouched.
pub const CHANGE_EFFECT_PROBABILITY: f64 = 0.0325;

/// Attempt cost doubled.
pub const COST_INCREASE_PROBABILITY: f64 = 0.0175;
pub const COST_INCREASE_FACTOR: f64 = 2.0;

/// Attempt is free.
pub const COST_DECREASE_PROBABILITY: f64 = 0.0175;
pub const COST_DECREASE_FACTOR: f64 = 0.0;

/// Gem state maintained as-is.
pub const MAINTAIN_PROBABILITY: f64 = 0.0175;

/// +1 reroll charge.
pub const REROLL_PLUS_ONE_PROBABILITY: f64 = 0.0250;

/// +2 reroll charges.
pub const REROLL_PLUS_TWO_PROBABILITY: f64 = 0.0075;

/// Number of options revealed to the player per attempt.
pub const PRESENTED_OPTION_COUNT: usize = 4;

/// Best reachable scoring sum below which a restart is forced (net score +1 needs 9).
pub const RESTART_TARGET_SUM: i32 = 9;

/// Largest single-step gain on one scoring dimension.
pub const MAX_GAIN_PER_ATTEMPT: i32 = 4;

/// Tolerance under which two action values are treated as tied.
pub const TIE_EPSILON: f64 = 1e-9;

/// Upper bound on calibration rounds.
pub const MAX_CALIBRATION_ROUNDS: usize = 10;

/// Calibration stops once the price moves by less than this (currency units).
pub const PRICE_TOLERANCE: f64 = 100.0;

/// Crystal-to-currency conversion divisor shared by fee and restart pricing.
pub const CRYSTAL_BUNDLE: f64 = 95.0;

/// Crystals per unit of processing fee.
pub const FEE_CRYSTALS_PER_UNIT: f64 = 8.5;

/// Crystals per restart ticket.
pub const RESTART_CRYSTALS: f64 = 100.0;

/// Largest batch a single request may ask for.
pub const MAX_SIMULATION_RUNS: usize = 1_000_000;
