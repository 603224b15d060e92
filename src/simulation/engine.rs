//! Gem lifecycle simulation: plays one gem from fresh stats to the end using the
//! solved [`ValueTable`] for decisions.
//!
//! Unlike the value recursion, which weighs every option by its probability,
//! a simulated attempt only sees a *presented subset* of at most
//! [`PRESENTED_OPTION_COUNT`] options drawn without replacement. The decision
//! compares stopping, spending a reroll, and rolling on the unweighted mean of
//! the presented options; a roll then applies one presented option chosen
//! uniformly.
//!
//! The rollout is a loop over immutable [`RolloutState`] values: [`decide`]
//! picks an action, [`apply_decision`] returns the next state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::constants::*;
use crate::option_model::{enumerate_options, net_score, WeightedOption};
use crate::types::{ProcessState, RolloutOutcome};
use crate::value_function::{stop_value, ValueTable};

/// Fixed inputs of every rollout in a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloutParams {
    pub attempts: u32,
    pub rerolls: u32,
    pub restart_enabled: bool,
    pub restart_unit_cost: f64,
}

impl RolloutParams {
    pub fn root(&self) -> ProcessState {
        ProcessState::root(self.attempts, self.rerolls)
    }
}

/// What the player does with the current attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Stop,
    Reroll,
    Restart,
    Roll,
}

/// An action together with the options that were on the table when it was taken.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub presented: Vec<WeightedOption>,
}

/// Values compared when choosing an action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionValues {
    pub stop: f64,
    pub reroll: f64,
    pub roll: f64,
}

/// Gem state plus the costs accumulated so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloutState {
    pub process: ProcessState,
    pub processing_cost: f64,
    pub restart_cost: f64,
}

impl RolloutState {
    pub fn fresh(params: &RolloutParams) -> Self {
        Self {
            process: params.root(),
            processing_cost: 0.0,
            restart_cost: 0.0,
        }
    }

    pub fn outcome(&self) -> RolloutOutcome {
        RolloutOutcome {
            final_score: net_score(&self.process.stats),
            processing_cost: self.processing_cost,
            restart_cost: self.restart_cost,
        }
    }
}

/// Result of applying one decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Stopped(RolloutState),
    Continue(RolloutState),
}

/// Early-restart heuristic: give up when even +4 on a scoring stat every
/// remaining attempt cannot reach net score +1.
pub fn should_restart(params: &RolloutParams, state: &ProcessState) -> bool {
    if !params.restart_enabled || state.attempts <= 1 {
        return false;
    }
    let ceiling = state.stats.scoring_sum() + MAX_GAIN_PER_ATTEMPT * (state.attempts as i32 - 1);
    ceiling < RESTART_TARGET_SUM
}

/// Draw up to [`PRESENTED_OPTION_COUNT`] distinct options, each draw
/// proportional to the remaining options' probabilities.
pub fn sample_presented(
    mut pool: Vec<WeightedOption>,
    rng: &mut SmallRng,
) -> Vec<WeightedOption> {
    let mut presented = Vec::with_capacity(PRESENTED_OPTION_COUNT);
    while presented.len() < PRESENTED_OPTION_COUNT && !pool.is_empty() {
        let total: f64 = pool.iter().map(|o| o.probability).sum();
        let mut ticket = rng.random::<f64>() * total;
        // rounding can leave the ticket just past the last weight
        let mut chosen = pool.len() - 1;
        for (i, opt) in pool.iter().enumerate() {
            ticket -= opt.probability;
            if ticket < 0.0 {
                chosen = i;
                break;
            }
        }
        presented.push(pool.remove(chosen));
    }
    presented
}

/// Stop/reroll/roll values of `state` given the presented options.
///
/// Meant for states with `attempts > 0`. At `attempts == 0` the children are
/// looked up at zero attempts, so the roll value is not meaningful there.
pub fn action_values(
    table: &ValueTable,
    state: &ProcessState,
    presented: &[WeightedOption],
) -> ActionValues {
    let stop = stop_value(&state.stats, table.price());

    let reroll = if state.rerolls > 0 {
        table
            .get(&ProcessState {
                rerolls: state.rerolls - 1,
                ..*state
            })
            .unwrap_or(f64::NEG_INFINITY)
    } else {
        f64::NEG_INFINITY
    };

    let roll = if presented.is_empty() {
        f64::NEG_INFINITY
    } else {
        let sum: f64 = presented
            .iter()
            .map(|opt| {
                let child = ProcessState {
                    attempts: state.attempts.saturating_sub(1),
                    rerolls: state.rerolls,
                    stats: opt.option.next_stats(&state.stats),
                };
                table.get(&child).unwrap_or(f64::NEG_INFINITY) - opt.charged_cost()
            })
            .sum();
        sum / presented.len() as f64
    };

    ActionValues { stop, reroll, roll }
}

/// Best action; near-ties prefer Stop, then Reroll, then Roll.
pub fn choose_action(values: &ActionValues) -> Action {
    let best = values.stop.max(values.reroll).max(values.roll);
    if (best - values.stop).abs() < TIE_EPSILON {
        Action::Stop
    } else if (best - values.reroll).abs() < TIE_EPSILON {
        Action::Reroll
    } else {
        Action::Roll
    }
}

/// Decide what to do with the current attempt. Requires `state.attempts > 0`.
pub fn decide(
    table: &ValueTable,
    params: &RolloutParams,
    state: &ProcessState,
    rng: &mut SmallRng,
) -> Decision {
    if should_restart(params, state) {
        return Decision {
            action: Action::Restart,
            presented: Vec::new(),
        };
    }

    let presented = sample_presented(enumerate_options(&state.stats), rng);
    let values = action_values(table, state, &presented);
    Decision {
        action: choose_action(&values),
        presented,
    }
}

/// Apply `decision` to `state`. Roll draws its option uniformly from the presented subset.
pub fn apply_decision(
    params: &RolloutParams,
    state: RolloutState,
    decision: &Decision,
    rng: &mut SmallRng,
) -> Step {
    match decision.action {
        Action::Stop => Step::Stopped(state),
        Action::Reroll => Step::Continue(RolloutState {
            process: ProcessState {
                rerolls: state.process.rerolls.saturating_sub(1),
                ..state.process
            },
            ..state
        }),
        Action::Restart => Step::Continue(RolloutState {
            process: params.root(),
            restart_cost: state.restart_cost + params.restart_unit_cost,
            ..state
        }),
        Action::Roll => {
            if decision.presented.is_empty() {
                return Step::Continue(RolloutState {
                    process: ProcessState {
                        attempts: state.process.attempts.saturating_sub(1),
                        ..state.process
                    },
                    ..state
                });
            }
            let pick = &decision.presented[rng.random_range(0..decision.presented.len())];
            Step::Continue(RolloutState {
                process: pick.option.apply(&state.process),
                processing_cost: state.processing_cost + pick.charged_cost(),
                ..state
            })
        }
    }
}

/// Play one gem to completion.
pub fn rollout(table: &ValueTable, params: &RolloutParams, rng: &mut SmallRng) -> RolloutOutcome {
    let mut state = RolloutState::fresh(params);
    while state.process.attempts > 0 {
        let decision = decide(table, params, &state.process, rng);
        match apply_decision(params, state, &decision, rng) {
            Step::Stopped(last) => {
                state = last;
                break;
            }
            Step::Continue(next) => state = next,
        }
    }
    state.outcome()
}

/// Play `num_runs` independent gems in parallel. Run `i` is seeded with `seed + i`,
/// so the outcome sequence depends only on `seed`, never on thread scheduling.
pub fn simulate_batch(
    table: &ValueTable,
    params: &RolloutParams,
    num_runs: usize,
    seed: u64,
) -> Vec<RolloutOutcome> {
    (0..num_runs)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            rollout(table, params, &mut rng)
        })
        .collect()
}
