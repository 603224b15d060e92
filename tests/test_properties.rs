//! Property-based tests for the option model and the value recursion.

use proptest::prelude::*;

use gemcost::constants::*;
use gemcost::option_model::{enumerate_options, net_score, TransitionOption};
use gemcost::types::{ProcessState, StatVector};
use gemcost::value_function::{stop_value, ValueTable};

/// Strategy: generate a legal stat vector (each stat 1-5).
fn stats_strategy() -> impl Strategy<Value = StatVector> {
    prop::array::uniform4(STAT_MIN..=STAT_MAX).prop_map(|v| StatVector::new(v).unwrap())
}

/// Strategy: a small state so each case solves quickly.
fn small_state_strategy() -> impl Strategy<Value = ProcessState> {
    (0..=3u32, 0..=2u32, stats_strategy()).prop_map(|(attempts, rerolls, stats)| ProcessState {
        attempts,
        rerolls,
        stats,
    })
}

proptest! {
    // 1. Every offered stat delta is an increase that keeps all components in [1, 5]
    #[test]
    fn stat_deltas_stay_in_range(stats in stats_strategy()) {
        for opt in enumerate_options(&stats) {
            if let TransitionOption::StatDelta { delta, .. } = opt.option {
                prop_assert!(delta > 0, "stats={stats:?} opt={opt:?}");
                let next = opt.option.next_stats(&stats);
                for v in next.values() {
                    prop_assert!((STAT_MIN..=STAT_MAX).contains(&v), "stats={stats:?} opt={opt:?}");
                }
                prop_assert_ne!(next, stats);
            }
        }
    }

    // 2. The seven unconditional options are always offered
    #[test]
    fn other_options_always_offered(stats in stats_strategy()) {
        let others = enumerate_options(&stats)
            .iter()
            .filter(|o| !matches!(o.option, TransitionOption::StatDelta { .. }))
            .count();
        prop_assert_eq!(others, 7);
    }

    // 3. Net score ignores the non-scoring dimensions
    #[test]
    fn net_score_ignores_non_scoring(stats in stats_strategy(), c in STAT_MIN..=STAT_MAX, d in STAT_MIN..=STAT_MAX) {
        let v = stats.values();
        let other = StatVector::new([v[0], v[1], c, d]).unwrap();
        prop_assert_eq!(net_score(&stats), net_score(&other));
        prop_assert!((-6..=2).contains(&net_score(&stats)));
    }

    // 4. Attempts = 0 returns the stop value without recursing
    #[test]
    fn terminal_state_is_stop_value(stats in stats_strategy(), rerolls in 0..5u32, price in 0.0..1e6f64) {
        let mut table = ValueTable::new(price);
        let v = table.value(ProcessState { attempts: 0, rerolls, stats });
        prop_assert_eq!(v, stop_value(&stats, price));
        prop_assert_eq!(table.len(), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // 5. Every solved state is worth at least stopping
    #[test]
    fn value_bounded_below_by_stop(state in small_state_strategy(), price in 0.0..1e5f64) {
        let table = ValueTable::build(state, price);
        for (s, &v) in table.iter() {
            prop_assert!(v >= stop_value(&s.stats, price), "state={s:?} v={v}");
        }
    }

    // 6. For states that already score ≥ 0, value never falls as the price rises
    #[test]
    fn value_monotone_in_price_for_non_negative_scores(
        state in small_state_strategy(),
        p1 in 0.0..5e4f64,
        dp in 0.0..5e4f64,
    ) {
        prop_assume!(net_score(&state.stats) >= 0);
        let p2 = p1 + dp;
        let v1 = ValueTable::build(state, p1).get(&state).unwrap();
        let v2 = ValueTable::build(state, p2).get(&state).unwrap();
        prop_assert!(v1 <= v2 + 1e-6 * (1.0 + v2.abs()), "p1={p1} v1={v1} p2={p2} v2={v2}");
    }

    // 7. Table content depends only on (root, price)
    #[test]
    fn rebuild_is_identical(state in small_state_strategy(), price in 0.0..1e5f64) {
        let a = ValueTable::build(state, price);
        let b = ValueTable::build(state, price);
        prop_assert_eq!(a, b);
    }
}
