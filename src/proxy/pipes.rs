//! Stages that sit between a producer and a consumer.
//!
//! Stages that never finish on their own are generic in their result so they
//! can be piped with producers and consumers of any result type.

use std::sync::Arc;

use super::{await_, compose, pull, yield_, Pipe, Proxy};
use crate::aff::Aff;
use crate::eff::Eff;
use crate::runtime::HasCancel;

/// Pass every value through unchanged.
pub fn cat<RT, A, R>() -> Pipe<RT, A, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
{
    pull(())
}

/// Transform every value with `f`.
pub fn map<RT, A, B, R, F>(f: F) -> Pipe<RT, A, B, R>
where
    RT: HasCancel,
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    compose(cat(), move |a| yield_(f(a)))
}

/// Transform every value with a synchronous effect.
pub fn map_eff<RT, A, B, R, F>(f: F) -> Pipe<RT, A, B, R>
where
    RT: HasCancel,
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A) -> Eff<B, RT> + Send + Sync + 'static,
{
    compose(cat(), move |a| Proxy::lift_eff(f(a)).and_then(|b| yield_(b)))
}

/// Transform every value with an asynchronous effect.
pub fn map_aff<RT, A, B, R, F>(f: F) -> Pipe<RT, A, B, R>
where
    RT: HasCancel,
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A) -> Aff<B, RT> + Send + Sync + 'static,
{
    compose(cat(), move |a| Proxy::lift_aff(f(a)).and_then(|b| yield_(b)))
}

/// Forward only the values matching `predicate`.
pub fn filter<RT, A, R, P>(predicate: P) -> Pipe<RT, A, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
    P: Fn(&A) -> bool + Send + Sync + 'static,
{
    compose(cat(), move |a| {
        if predicate(&a) {
            yield_(a)
        } else {
            Proxy::Pure(())
        }
    })
}

/// Call `f` on every value, then forward it.
pub fn chain<RT, A, R, F>(f: F) -> Pipe<RT, A, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
    F: Fn(&A) + Send + Sync + 'static,
{
    compose(cat(), move |a| {
        f(&a);
        yield_(a)
    })
}

/// Forward the first `n` values, then finish.
pub fn take<RT, A>(n: usize) -> Pipe<RT, A, A, ()>
where
    RT: HasCancel,
    A: Send + 'static,
{
    if n == 0 {
        return Proxy::Pure(());
    }
    await_().and_then(move |a| yield_(a).and_then(move |()| take(n - 1)))
}

/// Forward values while `predicate` holds; the first failing value is
/// dropped and the stage finishes.
pub fn take_while<RT, A, P>(predicate: P) -> Pipe<RT, A, A, ()>
where
    RT: HasCancel,
    A: Send + 'static,
    P: Fn(&A) -> bool + Send + Sync + 'static,
{
    take_while_shared(Arc::new(predicate))
}

fn take_while_shared<RT, A, P>(predicate: Arc<P>) -> Pipe<RT, A, A, ()>
where
    RT: HasCancel,
    A: Send + 'static,
    P: Fn(&A) -> bool + Send + Sync + 'static,
{
    await_().and_then(move |a| {
        if predicate(&a) {
            yield_(a).and_then(move |()| take_while_shared(predicate))
        } else {
            Proxy::Pure(())
        }
    })
}

/// Discard the first `n` values, then pass the rest through.
pub fn drop<RT, A, R>(n: usize) -> Pipe<RT, A, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
{
    if n == 0 {
        return cat();
    }
    await_().and_then(move |_| drop(n - 1))
}

/// Emit every intermediate state of a running fold.
pub fn scan<RT, A, S, R, F>(init: S, f: F) -> Pipe<RT, A, S, R>
where
    RT: HasCancel,
    A: Send + 'static,
    S: Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(S, A) -> S + Send + Sync + 'static,
{
    scan_shared(init, Arc::new(f))
}

fn scan_shared<RT, A, S, R, F>(state: S, f: Arc<F>) -> Pipe<RT, A, S, R>
where
    RT: HasCancel,
    A: Send + 'static,
    S: Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(S, A) -> S + Send + Sync + 'static,
{
    await_().and_then(move |a| {
        let next = f(state, a);
        yield_(next.clone()).and_then(move |()| scan_shared(next, f))
    })
}
