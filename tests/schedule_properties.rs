//! Property-based tests for schedules and the loops they drive.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use millrace::schedule::Decision;
use millrace::{eff, Eff, Fin, Schedule};
use proptest::prelude::*;

fn delays(schedule: &Schedule) -> Vec<Duration> {
    schedule.decisions().collect()
}

fn base() -> impl Strategy<Value = Duration> {
    (1u64..500).prop_map(Duration::from_millis)
}

proptest! {
    #[test]
    fn prop_recurs_yields_exactly_n(n in 0u32..200) {
        prop_assert_eq!(delays(&Schedule::recurs(n)).len(), n as usize);
    }

    #[test]
    fn prop_take_bounds_length(n in 0u32..50, delay in base()) {
        let s = Schedule::spaced(delay).take(n);
        let all = delays(&s);
        prop_assert_eq!(all.len(), n as usize);
        prop_assert!(all.iter().all(|d| *d == delay));
    }

    #[test]
    fn prop_exponential_never_shrinks(n in 1u32..20, delay in base()) {
        let all = delays(&Schedule::exponential(delay).take(n));
        prop_assert!(all.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(all[0], delay);
    }

    #[test]
    fn prop_max_delay_caps_every_delay(n in 1u32..30, delay in base(), cap in base()) {
        let all = delays(&Schedule::exponential(delay).take(n).max_delay(cap));
        prop_assert_eq!(all.len(), n as usize);
        prop_assert!(all.iter().all(|d| *d <= cap));
    }

    #[test]
    fn prop_max_cumulative_delay_bounds_total(delay in base(), bound in 0u64..5_000) {
        let bound = Duration::from_millis(bound);
        let all = delays(&Schedule::linear(delay).max_cumulative_delay(bound));
        let total: Duration = all.iter().sum();
        prop_assert!(total <= bound);
    }

    #[test]
    fn prop_union_and_intersect_lengths(a in 0u32..40, b in 0u32..40) {
        let union = Schedule::recurs(a) | Schedule::recurs(b);
        let intersect = Schedule::recurs(a) & Schedule::recurs(b);
        prop_assert_eq!(delays(&union).len(), a.max(b) as usize);
        prop_assert_eq!(delays(&intersect).len(), a.min(b) as usize);
    }

    #[test]
    fn prop_then_concatenates(a in 0u32..40, b in 0u32..40, delay in base()) {
        let s = Schedule::recurs(a).then(Schedule::spaced(delay).take(b));
        let all = delays(&s);
        prop_assert_eq!(all.len(), (a + b) as usize);
        prop_assert!(all[a as usize..].iter().all(|d| *d == delay));
    }

    #[test]
    fn prop_repeat_multiplies(a in 0u32..20, times in 0u32..10) {
        let s = Schedule::recurs(a).repeat(times);
        prop_assert_eq!(delays(&s).len(), (a * times) as usize);
    }

    #[test]
    fn prop_jitter_preserves_length(n in 0u32..30, delay in base()) {
        let s = Schedule::spaced(delay).take(n).with_full_jitter();
        let all = delays(&s);
        prop_assert_eq!(all.len(), n as usize);
        prop_assert!(all.iter().all(|d| *d <= delay));
    }

    #[test]
    fn prop_done_is_final(n in 0u32..10, extra in 1usize..10) {
        let mut decisions = Schedule::recurs(n).decisions();
        for _ in 0..n {
            prop_assert_eq!(decisions.decide(), Decision::Delay(Duration::ZERO));
        }
        for _ in 0..extra {
            prop_assert_eq!(decisions.decide(), Decision::Done);
        }
    }

    #[test]
    fn prop_fold_runs_once_per_decision_plus_one(n in 0u32..100) {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let make = move || {
            let counter = Arc::clone(&counter);
            Eff::lift(move || counter.fetch_add(1, Ordering::SeqCst))
        };
        let count: Eff<u32> = eff::fold(Schedule::recurs(n), make, 0, |s, _| s + 1);
        prop_assert_eq!(count.run_standalone(), Fin::Succ(n + 1));
        prop_assert_eq!(runs.load(Ordering::SeqCst), n + 1);
    }
}
