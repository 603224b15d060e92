//! Optimal-stopping valuation of every reachable processing state.
//!
//! For a fixed price per net point `p`, the value of a state S = (a, r, v) is
//!
//! ```text
//! V(0, r, v) = net(v)·p
//! V(a, r, v) = max( net(v)·p,                                      stop
//!                   Σ_o (P_o / ΣP) · (V(o(S)) − cost_o),           roll
//!                   V(a, r−1, v)  if r > 0 )                       reroll
//! ```
//!
//! The recursion is memoized in a [`ValueTable`] keyed by [`ProcessState`].
//! A table is built once per calibration round from the root state and then
//! read, immutably, by every rollout of that round.

use std::collections::HashMap;
use std::time::Instant;

use crate::option_model::{enumerate_options, net_score};
use crate::types::{ProcessState, StatVector};

/// Value of stopping now: the net score monetized at `price`.
#[inline(always)]
pub fn stop_value(stats: &StatVector, price: f64) -> f64 {
    net_score(stats) as f64 * price
}

/// Memo table of optimal state values at one assumed price per point.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueTable {
    price: f64,
    values: HashMap<ProcessState, f64>,
}

impl ValueTable {
    /// Empty table at `price`. Entries are filled lazily by [`ValueTable::value`].
    pub fn new(price: f64) -> Self {
        Self {
            price,
            values: HashMap::new(),
        }
    }

    /// Solve the full state space reachable from `root`.
    pub fn build(root: ProcessState, price: f64) -> Self {
        let start = Instant::now();
        let mut table = Self::new(price);
        let root_value = table.value(root);
        tracing::debug!(
            states = table.len(),
            root_value,
            price,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "value table built"
        );
        table
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read-only lookup of an already solved state.
    #[inline(always)]
    pub fn get(&self, state: &ProcessState) -> Option<f64> {
        self.values.get(state).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProcessState, &f64)> {
        self.values.iter()
    }

    /// Optimal value of `state`, solving and memoizing it (and everything below it) on demand.
    pub fn value(&mut self, state: ProcessState) -> f64 {
        if let Some(v) = self.get(&state) {
            return v;
        }

        let stop = stop_value(&state.stats, self.price);
        let best = if state.attempts == 0 {
            stop
        } else {
            let roll = self.roll_value(&state);
            let reroll = if state.rerolls > 0 {
                self.value(ProcessState {
                    rerolls: state.rerolls - 1,
                    ..state
                })
            } else {
                f64::NEG_INFINITY
            };
            stop.max(roll).max(reroll)
        };

        self.values.insert(state, best);
        best
    }

    /// Probability-weighted value of spending one attempt, net of its cost.
    fn roll_value(&mut self, state: &ProcessState) -> f64 {
        let options = enumerate_options(&state.stats);
        let total_p: f64 = options.iter().map(|o| o.probability).sum();
        if total_p <= 0.0 {
            return 0.0;
        }

        let mut expected = 0.0;
        for opt in &options {
            let child = opt.option.apply(state);
            expected += (opt.probability / total_p) * (self.value(child) - opt.charged_cost());
        }
        expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_PROCESSING_COST;

    fn state(attempts: u32, rerolls: u32, v: [u8; 4]) -> ProcessState {
        ProcessState {
            attempts,
            rerolls,
            stats: StatVector::new(v).unwrap(),
        }
    }

    #[test]
    fn test_terminal_state_is_stop_value() {
        let mut table = ValueTable::new(1000.0);
        let s = state(0, 3, [5, 4, 1, 1]);
        assert_eq!(table.value(s), 1000.0);
        // no recursion below a terminal state
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_value_at_least_stop_value() {
        let table = ValueTable::build(ProcessState::root(5, 1), 5000.0);
        for (s, &v) in table.iter() {
            assert!(v >= stop_value(&s.stats, 5000.0), "state {s:?} value {v}");
        }
    }

    #[test]
    fn test_zero_price_values_are_zero() {
        // At p = 0 stopping is free and worth nothing; rolling never pays.
        let table = ValueTable::build(ProcessState::root(5, 0), 0.0);
        for (_, &v) in table.iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_single_attempt_roll_value() {
        // One attempt from [5,4,1,1] at a huge price: rolling can only reach +2 via +1 on dim 1,
        // so the value is the better of stopping and the weighted roll.
        let price = 1_000_000.0;
        let mut table = ValueTable::new(price);
        let s = state(1, 0, [5, 4, 1, 1]);
        let v = table.value(s);
        assert!(v >= price);

        let options = enumerate_options(&s.stats);
        let total_p: f64 = options.iter().map(|o| o.probability).sum();
        let expected_roll: f64 = options
            .iter()
            .map(|o| {
                let child = o.option.apply(&s);
                (o.probability / total_p) * (stop_value(&child.stats, price) - o.charged_cost())
            })
            .sum();
        assert!((v - price.max(expected_roll)).abs() < 1e-6);
    }

    #[test]
    fn test_reroll_chain_is_memoized() {
        let table = ValueTable::build(ProcessState::root(2, 2), 3000.0);
        for r in 0..=2 {
            assert!(table.get(&state(2, r, [1, 1, 1, 1])).is_some());
        }
        // rerolls are free, so more of them can never hurt
        let v0 = table.get(&state(2, 0, [1, 1, 1, 1])).unwrap();
        let v2 = table.get(&state(2, 2, [1, 1, 1, 1])).unwrap();
        assert!(v2 >= v0);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let a = ValueTable::build(ProcessState::root(5, 0), 12_345.0);
        let b = ValueTable::build(ProcessState::root(5, 0), 12_345.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_charges_base_cost() {
        // From +2 with one attempt, rolling is strictly worse than stopping at any price:
        // the score cannot rise and the attempt costs something on average.
        let mut table = ValueTable::new(BASE_PROCESSING_COST);
        let s = state(1, 0, [5, 5, 1, 1]);
        assert_eq!(table.value(s), 2.0 * BASE_PROCESSING_COST);
    }
}
