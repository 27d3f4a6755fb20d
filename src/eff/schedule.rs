//! Schedule-driven loops over synchronous effects.
//!
//! Each loop takes a factory so every iteration runs a fresh effect. Waits block
//! the calling thread in slices of at most 10ms, checking for cancellation
//! between slices.

use std::time::Duration;

use super::Eff;
use crate::predicate::Predicate;
use crate::runtime::HasCancel;
use crate::schedule::{Decision, Schedule};
use crate::{Error, Fin};

/// Longest a blocking wait sleeps before looking at the token again.
const WAIT_SLICE: Duration = Duration::from_millis(10);

fn pause<RT: HasCancel>(rt: &RT, delay: Duration) -> Result<(), Error> {
    let mut remaining = delay;
    loop {
        if rt.is_cancelled() {
            return Err(Error::cancelled());
        }
        if remaining.is_zero() {
            return Ok(());
        }
        let slice = remaining.min(WAIT_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
}

fn fold_loop<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, mut f: F, mut stop: P) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    Eff::new(move |rt| {
        let mut decisions = schedule.decisions();
        let mut state = state;
        let mut iteration = 0u64;
        loop {
            let value = match make().run(rt) {
                Fin::Succ(value) => value,
                Fin::Fail(e) => return Fin::Fail(e),
                Fin::Bottom => return Fin::Bottom,
            };
            iteration += 1;
            let done = stop(&value);
            state = f(state, value);
            #[cfg(feature = "tracing")]
            tracing::debug!(iteration, done, "fold iteration");
            if done {
                return Fin::Succ(state);
            }
            match decisions.decide() {
                Decision::Done => return Fin::Succ(state),
                Decision::Delay(delay) => {
                    if let Err(e) = pause(rt, delay) {
                        return Fin::Fail(e);
                    }
                }
            }
        }
    })
}

/// Run `make()` once, then again after every schedule decision, folding each
/// value into `state`.
///
/// Stops with `Succ(state)` when the schedule is exhausted. A `Fail` or `Bottom`
/// from any run is returned as is; cancellation during a wait gives
/// `Fail(CANCELLED)`.
///
/// ```
/// use millrace::{eff, Eff, Fin, Schedule};
///
/// let total: Eff<i32> = eff::fold(Schedule::recurs(4), || Eff::pure(1), 0, |s, v| s + v);
/// assert_eq!(total.run_standalone(), Fin::Succ(5));
/// ```
pub fn fold<A, S, RT, M, F>(schedule: Schedule, make: M, state: S, f: F) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
{
    fold_loop(schedule, make, state, f, |_| false)
}

/// Like [`fold`], stopping after the first value for which `predicate` is false.
/// That value is folded in.
pub fn fold_while<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, f: F, mut predicate: P) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, state, f, move |a| !predicate(a))
}

/// Like [`fold`], stopping after the first value for which `predicate` is true.
/// That value is folded in.
pub fn fold_until<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, f: F, predicate: P) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, state, f, predicate)
}

/// [`fold`] seeded with `S::default()`.
pub fn reduce<A, S, RT, M, F>(schedule: Schedule, make: M, f: F) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
{
    fold(schedule, make, S::default(), f)
}

/// [`fold_while`] seeded with `S::default()`.
pub fn reduce_while<A, S, RT, M, F, P>(schedule: Schedule, make: M, f: F, predicate: P) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_while(schedule, make, S::default(), f, predicate)
}

/// [`fold_until`] seeded with `S::default()`.
pub fn reduce_until<A, S, RT, M, F, P>(schedule: Schedule, make: M, f: F, predicate: P) -> Eff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_until(schedule, make, S::default(), f, predicate)
}

/// Run `make()` according to `schedule`, returning the latest value.
pub fn repeat<A, RT, M>(schedule: Schedule, make: M) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), |_| false).and_then(latest)
}

/// [`repeat`] while `predicate` holds for the latest value.
pub fn repeat_while<A, RT, M, P>(schedule: Schedule, make: M, mut predicate: P) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), move |a| !predicate(a)).and_then(latest)
}

/// [`repeat`] until `predicate` holds for the latest value.
pub fn repeat_until<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), predicate).and_then(latest)
}

fn latest<A: Send + 'static, RT: HasCancel>(value: Option<A>) -> Eff<A, RT> {
    Eff::from_fin(Fin::from_option(value))
}

fn retry_loop<A, RT, M, P>(schedule: Schedule, make: M, should_retry: P) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    P: Fn(&Error) -> bool + Send + 'static,
{
    Eff::new(move |rt| {
        let mut decisions = schedule.decisions();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error = match make().run(rt) {
                Fin::Fail(e) => e,
                other => return other,
            };
            if error.is_cancelled() || !should_retry(&error) {
                return Fin::Fail(error);
            }
            match decisions.decide() {
                Decision::Done => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt, error = %error, "retries exhausted");
                    return Fin::Fail(error);
                }
                Decision::Delay(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, ?delay, error = %error, "retrying");
                    if let Err(e) = pause(rt, delay) {
                        return Fin::Fail(e);
                    }
                }
            }
        }
    })
}

/// Re-run `make()` on failure while the schedule allows.
///
/// `Bottom` is returned without retrying, and so is the cancellation error.
///
/// ```
/// use millrace::{eff, Eff, Error, Fin, Schedule};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let attempts = Arc::new(AtomicU32::new(0));
/// let counter = Arc::clone(&attempts);
/// let flaky: Eff<u32> = eff::retry(Schedule::recurs(5), move || {
///     let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
///     if n < 3 { Eff::fail(Error::new("transient")) } else { Eff::pure(n) }
/// });
///
/// assert_eq!(flaky.run_standalone(), Fin::Succ(3));
/// ```
pub fn retry<A, RT, M>(schedule: Schedule, make: M) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
{
    retry_loop(schedule, make, |_| true)
}

/// [`retry`] only while `predicate` matches the error.
pub fn retry_while<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    P: Predicate<Error> + 'static,
{
    retry_loop(schedule, make, move |e| predicate.check(e))
}

/// [`retry`] until `predicate` matches the error.
pub fn retry_until<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Eff<A, RT> + Send + 'static,
    P: Predicate<Error> + 'static,
{
    retry_loop(schedule, make, move |e| !predicate.check(e))
}
