//! Processing options: which transitions a gem can be offered from a given state.
//!
//! [`enumerate_options`] is the only source of transitions for both the value
//! recursion and the simulator. Probabilities are independent weights from the
//! balance table and do not sum to 1; every consumer renormalizes over the
//! subset it looks at.

use serde::Serialize;

use crate::constants::*;
use crate::types::{ProcessState, StatVector};

/// Options that do nothing to the gem beyond spending the attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoEffectKind {
    ChangeEffectFirst,
    ChangeEffectSecond,
    Maintain,
}

/// Effect of spending one attempt on a particular option.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionOption {
    StatDelta { dimension: usize, delta: i8 },
    RerollGain { gain: u32 },
    CostMultiplier { factor: f64 },
    NoEffect { kind: NoEffectKind },
}

/// An option together with its balance-table weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WeightedOption {
    pub option: TransitionOption,
    pub probability: f64,
}

impl WeightedOption {
    /// Currency charged when this option is the one applied.
    #[inline(always)]
    pub fn charged_cost(&self) -> f64 {
        match self.option {
            TransitionOption::CostMultiplier { factor } => BASE_PROCESSING_COST * factor,
            _ => BASE_PROCESSING_COST,
        }
    }
}

impl TransitionOption {
    /// Stats after applying this option. Only `StatDelta` changes anything.
    pub fn next_stats(&self, stats: &StatVector) -> StatVector {
        match *self {
            TransitionOption::StatDelta { dimension, delta } => {
                // enumerate_options only emits in-range deltas
                stats.with_delta(dimension, delta).unwrap_or(*stats)
            }
            _ => *stats,
        }
    }

    /// Successor state: one attempt spent, stats and rerolls updated.
    pub fn apply(&self, state: &ProcessState) -> ProcessState {
        let rerolls = match *self {
            TransitionOption::RerollGain { gain } => state.rerolls + gain,
            _ => state.rerolls,
        };
        ProcessState {
            attempts: state.attempts.saturating_sub(1),
            rerolls,
            stats: self.next_stats(&state.stats),
        }
    }
}

/// Net benefit of a gem: scoring sum minus [`NET_SCORE_OFFSET`]. Ranges −6..=+2.
#[inline(always)]
pub fn net_score(stats: &StatVector) -> i32 {
    stats.scoring_sum() - NET_SCORE_OFFSET
}

/// Options that are always on offer regardless of the stats, in emission order.
const OTHER_OPTIONS: [WeightedOption; 7] = [
    WeightedOption {
        option: TransitionOption::NoEffect { kind: NoEffectKind::ChangeEffectFirst },
        probability: CHANGE_EFFECT_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::NoEffect { kind: NoEffectKind::ChangeEffectSecond },
        probability: CHANGE_EFFECT_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::CostMultiplier { factor: COST_INCREASE_FACTOR },
        probability: COST_INCREASE_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::CostMultiplier { factor: COST_DECREASE_FACTOR },
        probability: COST_DECREASE_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::NoEffect { kind: NoEffectKind::Maintain },
        probability: MAINTAIN_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::RerollGain { gain: 1 },
        probability: REROLL_PLUS_ONE_PROBABILITY,
    },
    WeightedOption {
        option: TransitionOption::RerollGain { gain: 2 },
        probability: REROLL_PLUS_TWO_PROBABILITY,
    },
];

/// All options available from `stats`: admissible stat deltas per dimension
/// (in dimension order, then rule order) followed by the 7 unconditional options.
pub fn enumerate_options(stats: &StatVector) -> Vec<WeightedOption> {
    let mut options = Vec::with_capacity(STAT_COUNT * DELTA_RULES.len() + OTHER_OPTIONS.len());

    for dimension in 0..STAT_COUNT {
        let current = stats.get(dimension);
        for rule in &DELTA_RULES {
            let below_ceiling = current < rule.ceiling;
            if below_ceiling && stats.with_delta(dimension, rule.delta).is_some() {
                options.push(WeightedOption {
                    option: TransitionOption::StatDelta {
                        dimension,
                        delta: rule.delta,
                    },
                    probability: rule.probability,
                });
            }
        }
    }

    options.extend_from_slice(&OTHER_OPTIONS);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(v: [u8; 4]) -> StatVector {
        StatVector::new(v).unwrap()
    }

    fn deltas_for(options: &[WeightedOption], dim: usize) -> Vec<i8> {
        options
            .iter()
            .filter_map(|o| match o.option {
                TransitionOption::StatDelta { dimension, delta } if dimension == dim => {
                    Some(delta)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fresh_gem_options() {
        let options = enumerate_options(&StatVector::FRESH);
        // +1..+4 on each dimension plus 7 others
        assert_eq!(options.len(), 4 * 4 + 7);
        for dim in 0..4 {
            assert_eq!(deltas_for(&options, dim), vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_ceilings_gate_large_deltas() {
        let options = enumerate_options(&stats([2, 3, 4, 5]));
        assert_eq!(deltas_for(&options, 0), vec![1, 2, 3]);
        assert_eq!(deltas_for(&options, 1), vec![1, 2]);
        assert_eq!(deltas_for(&options, 2), vec![1]);
        assert!(deltas_for(&options, 3).is_empty());
    }

    #[test]
    fn test_negative_delta_never_offered() {
        let mut checked = 0;
        for a in 1..=5u8 {
            for b in 1..=5u8 {
                for c in 1..=5u8 {
                    for d in 1..=5u8 {
                        let options = enumerate_options(&stats([a, b, c, d]));
                        assert!(!options.iter().any(|o| matches!(
                            o.option,
                            TransitionOption::StatDelta { delta, .. } if delta < 0
                        )));
                        checked += 1;
                    }
                }
            }
        }
        assert_eq!(checked, 625);

        // a maxed gem only has the unconditional options left
        assert_eq!(enumerate_options(&stats([5, 5, 5, 5])), OTHER_OPTIONS.to_vec());
    }

    #[test]
    fn test_other_options_always_present() {
        for s in [[1, 1, 1, 1], [5, 5, 5, 5], [3, 1, 4, 2]] {
            let options = enumerate_options(&stats(s));
            let tail = &options[options.len() - 7..];
            assert_eq!(tail, &OTHER_OPTIONS[..]);
        }
    }

    #[test]
    fn test_charged_cost() {
        let doubled = OTHER_OPTIONS[2];
        let free = OTHER_OPTIONS[3];
        assert_eq!(doubled.charged_cost(), 1800.0);
        assert_eq!(free.charged_cost(), 0.0);
        assert_eq!(OTHER_OPTIONS[0].charged_cost(), BASE_PROCESSING_COST);
    }

    #[test]
    fn test_apply_spends_attempt() {
        let state = ProcessState {
            attempts: 3,
            rerolls: 1,
            stats: StatVector::FRESH,
        };
        let gain = TransitionOption::RerollGain { gain: 2 }.apply(&state);
        assert_eq!((gain.attempts, gain.rerolls, gain.stats), (2, 3, StatVector::FRESH));

        let bump = TransitionOption::StatDelta { dimension: 1, delta: 3 }.apply(&state);
        assert_eq!(bump.stats.values(), [1, 4, 1, 1]);
        assert_eq!(bump.rerolls, 1);

        let cost = TransitionOption::CostMultiplier { factor: 2.0 }.apply(&state);
        assert_eq!(cost.stats, state.stats);
        assert_eq!(cost.attempts, 2);
    }

    #[test]
    fn test_net_score_range() {
        assert_eq!(net_score(&StatVector::FRESH), -6);
        assert_eq!(net_score(&stats([5, 5, 1, 1])), 2);
        assert_eq!(net_score(&stats([4, 5, 5, 5])), 1);
    }
}
