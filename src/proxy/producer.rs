//! Sources and the ways to drain them.

use super::{absurd, yield_, Lift, Producer, Proxy};
use crate::aff::Aff;
use crate::eff::Eff;
use crate::error::Error;
use crate::fin::Fin;
use crate::runtime::HasCancel;

/// Emit every item of `items`, then finish.
///
/// The iterator is not touched until the pipeline runs.
pub fn each<RT, A1, A, I>(items: I) -> Proxy<RT, A1, A, (), I::Item, ()>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    I: IntoIterator + Send + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    Proxy::defer(move || emit(items.into_iter()))
}

fn emit<RT, A1, A, I>(mut iter: I) -> Proxy<RT, A1, A, (), I::Item, ()>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    match iter.next() {
        Some(item) => Proxy::Respond(item, Box::new(move |()| emit(iter))),
        None => Proxy::Pure(()),
    }
}

/// Run `make()` and emit its value, forever.
///
/// The first failure ends the pipeline.
pub fn repeat_eff<RT, B, R, M>(make: M) -> Producer<RT, B, R>
where
    RT: HasCancel,
    B: Send + 'static,
    R: Send + 'static,
    M: Fn() -> Eff<B, RT> + Send + Sync + 'static,
{
    Proxy::defer(move || {
        Proxy::lift_eff(make()).and_then(move |b| yield_(b).and_then(move |()| repeat_eff(make)))
    })
}

/// Asynchronous [`repeat_eff`].
pub fn repeat_aff<RT, B, R, M>(make: M) -> Producer<RT, B, R>
where
    RT: HasCancel,
    B: Send + 'static,
    R: Send + 'static,
    M: Fn() -> Aff<B, RT> + Send + Sync + 'static,
{
    Proxy::defer(move || {
        Proxy::lift_aff(make()).and_then(move |b| yield_(b).and_then(move |()| repeat_aff(make)))
    })
}

/// Fold every emitted value into a state, finishing with it when the
/// producer ends.
///
/// The producer's own result is discarded. Cancellation is checked before
/// every value. Asynchronous steps fail with
/// [`codes::ASYNC_IN_SYNC`](crate::error::codes::ASYNC_IN_SYNC); use
/// [`fold_async`] for those.
///
/// ```
/// use millrace::proxy::producer;
/// use millrace::{Eff, Fin};
///
/// let sum: Eff<i32> = producer::fold(producer::each([1, 2, 3]), 0, |s, x| s + x);
/// assert_eq!(sum.run_standalone(), Fin::Succ(6));
/// ```
pub fn fold<RT, B, R, S, F>(producer: Producer<RT, B, R>, init: S, mut f: F) -> Eff<S, RT>
where
    RT: HasCancel,
    B: Send + 'static,
    R: Send + 'static,
    S: Send + 'static,
    F: FnMut(S, B) -> S + Send + 'static,
{
    Eff::new(move |rt: &RT| {
        let mut state = init;
        let mut current = producer;
        loop {
            current = match current {
                Proxy::Respond(b, k) => {
                    if rt.is_cancelled() {
                        return Fin::Fail(Error::cancelled());
                    }
                    state = f(state, b);
                    k(())
                }
                Proxy::M(Lift::Sync(step)) => match step.run(rt) {
                    Fin::Succ(next) => next,
                    Fin::Fail(e) => return Fin::Fail(e),
                    Fin::Bottom => return Fin::Bottom,
                },
                Proxy::M(Lift::Async(_)) => return Fin::Fail(Error::async_in_sync()),
                Proxy::Request(void, _) => absurd(void),
                Proxy::Pure(_) => return Fin::Succ(state),
            };
        }
    })
}

/// [`fold`] that also awaits asynchronous steps.
pub fn fold_async<RT, B, R, S, F>(producer: Producer<RT, B, R>, init: S, mut f: F) -> Aff<S, RT>
where
    RT: HasCancel,
    B: Send + 'static,
    R: Send + 'static,
    S: Send + 'static,
    F: FnMut(S, B) -> S + Send + 'static,
{
    Aff::new(move |rt: RT| async move {
        let mut state = init;
        let mut current = producer;
        loop {
            current = match current {
                Proxy::Respond(b, k) => {
                    if rt.is_cancelled() {
                        return Fin::Fail(Error::cancelled());
                    }
                    state = f(state, b);
                    k(())
                }
                Proxy::M(step) => match step.into_aff().run(&rt).await {
                    Fin::Succ(next) => next,
                    Fin::Fail(e) => return Fin::Fail(e),
                    Fin::Bottom => return Fin::Bottom,
                },
                Proxy::Request(void, _) => absurd(void),
                Proxy::Pure(_) => return Fin::Succ(state),
            };
        }
    })
}

/// Gather every emitted value.
pub fn collect<RT, B, R>(producer: Producer<RT, B, R>) -> Eff<Vec<B>, RT>
where
    RT: HasCancel,
    B: Send + 'static,
    R: Send + 'static,
{
    fold(producer, Vec::new(), |mut all, b| {
        all.push(b);
        all
    })
}
