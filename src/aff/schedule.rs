//! Schedule-driven loops over asynchronous effects.
//!
//! Same semantics as the synchronous loops in [`eff`](crate::eff); waits
//! suspend instead of blocking and end early when the runtime is cancelled.

use std::time::Duration;

use super::Aff;
use crate::predicate::Predicate;
use crate::runtime::HasCancel;
use crate::schedule::{Decision, Schedule};
use crate::{Error, Fin};

async fn pause<RT: HasCancel>(rt: &RT, delay: Duration) -> Result<(), Error> {
    let token = rt.cancellation();
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
    if token.is_cancelled() {
        Err(Error::cancelled())
    } else {
        Ok(())
    }
}

fn fold_loop<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, mut f: F, mut stop: P) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    Aff::new(move |rt: RT| async move {
        let mut decisions = schedule.decisions();
        let mut state = state;
        let mut iteration = 0u64;
        loop {
            let value = match make().run(&rt).await {
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
                    if let Err(e) = pause(&rt, delay).await {
                        return Fin::Fail(e);
                    }
                }
            }
        }
    })
}

/// Asynchronous [`eff::fold`](crate::eff::fold).
///
/// ```
/// use millrace::{aff, Aff, Fin, Schedule};
///
/// # tokio_test::block_on(async {
/// let total: Aff<i32> = aff::fold(Schedule::recurs(2), || Aff::pure(5), 0, |s, v| s + v);
/// assert_eq!(total.run_standalone().await, Fin::Succ(15));
/// # });
/// ```
pub fn fold<A, S, RT, M, F>(schedule: Schedule, make: M, state: S, f: F) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
{
    fold_loop(schedule, make, state, f, |_| false)
}

/// Asynchronous [`eff::fold_while`](crate::eff::fold_while).
pub fn fold_while<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, f: F, mut predicate: P) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, state, f, move |a| !predicate(a))
}

/// Asynchronous [`eff::fold_until`](crate::eff::fold_until).
pub fn fold_until<A, S, RT, M, F, P>(schedule: Schedule, make: M, state: S, f: F, predicate: P) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, state, f, predicate)
}

/// [`fold`] seeded with `S::default()`.
pub fn reduce<A, S, RT, M, F>(schedule: Schedule, make: M, f: F) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
{
    fold(schedule, make, S::default(), f)
}

/// [`fold_while`] seeded with `S::default()`.
pub fn reduce_while<A, S, RT, M, F, P>(schedule: Schedule, make: M, f: F, predicate: P) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_while(schedule, make, S::default(), f, predicate)
}

/// [`fold_until`] seeded with `S::default()`.
pub fn reduce_until<A, S, RT, M, F, P>(schedule: Schedule, make: M, f: F, predicate: P) -> Aff<S, RT>
where
    A: Send + 'static,
    S: Default + Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    F: FnMut(S, A) -> S + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_until(schedule, make, S::default(), f, predicate)
}

/// Run `make()` according to `schedule`, returning the latest value.
pub fn repeat<A, RT, M>(schedule: Schedule, make: M) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), |_| false).and_then(latest)
}

/// [`repeat`] while `predicate` holds for the latest value.
pub fn repeat_while<A, RT, M, P>(schedule: Schedule, make: M, mut predicate: P) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), move |a| !predicate(a)).and_then(latest)
}

/// [`repeat`] until `predicate` holds for the latest value.
pub fn repeat_until<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    P: FnMut(&A) -> bool + Send + 'static,
{
    fold_loop(schedule, make, None, |_, a| Some(a), predicate).and_then(latest)
}

fn latest<A: Send + 'static, RT: HasCancel>(value: Option<A>) -> Aff<A, RT> {
    Aff::from_fin(Fin::from_option(value))
}

fn retry_loop<A, RT, M, P>(schedule: Schedule, make: M, should_retry: P) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    P: Fn(&Error) -> bool + Send + 'static,
{
    Aff::new(move |rt: RT| async move {
        let mut decisions = schedule.decisions();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error = match make().run(&rt).await {
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
                    if let Err(e) = pause(&rt, delay).await {
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
pub fn retry<A, RT, M>(schedule: Schedule, make: M) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
{
    retry_loop(schedule, make, |_| true)
}

/// [`retry`] only while `predicate` matches the error.
pub fn retry_while<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    P: Predicate<Error> + 'static,
{
    retry_loop(schedule, make, move |e| predicate.check(e))
}

/// [`retry`] until `predicate` matches the error.
pub fn retry_until<A, RT, M, P>(schedule: Schedule, make: M, predicate: P) -> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
    M: Fn() -> Aff<A, RT> + Send + 'static,
    P: Predicate<Error> + 'static,
{
    retry_loop(schedule, make, move |e| !predicate.check(e))
}
