//! Bidirectional streaming pipelines
//!
//! A [`Proxy<RT, A1, A, B1, B, R>`](Proxy) is a suspended conversation with two
//! neighbours. Upstream it sends `A1` requests and receives `A` answers;
//! downstream it receives `B1` requests and sends `B` answers. It finishes with
//! an `R`. A proxy is plain data: a tree of
//!
//! - `Request(a1, k)`: ask upstream, continue with `k(a)`
//! - `Respond(b, k)`: answer downstream, continue with `k(b1)`
//! - `M(step)`: run an [`Eff`] or [`Aff`] step, continue with its result
//! - `Pure(r)`: done
//!
//! Nothing runs until an [`Effect`] (a proxy with both ends closed) is handed to
//! [`run_effect`] or [`run_effect_async`].
//!
//! The usual shapes have aliases: [`Producer`], [`Consumer`], [`Pipe`],
//! [`Client`], [`Server`] and [`Effect`]. Closed ends carry [`Void`], so the
//! interpreter never has to handle a `Request` or `Respond` on them.
//!
//! # Examples
//!
//! ```
//! use millrace::proxy::{self, consumer, pipes, producer};
//! use millrace::{Eff, Fin, Runtime};
//!
//! let evens = proxy::pipe(
//!     producer::each(1..=10),
//!     pipes::filter(|x: &i32| x % 2 == 0),
//! );
//! let doubled = proxy::pipe(evens, pipes::map(|x: i32| x * 2));
//! let total: Eff<i32> = producer::fold(doubled, 0, |s, x| s + x);
//! assert_eq!(total.run_standalone(), Fin::Succ(60));
//!
//! // the same pipeline closed with a consumer and run as an effect
//! let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
//! let sink = std::sync::Arc::clone(&seen);
//! let effect = proxy::pipe(
//!     producer::each(vec!["a", "b"]),
//!     consumer::sink(move |s| sink.lock().unwrap().push(s)),
//! );
//! let fin = proxy::run_effect::<Runtime, ()>(effect).run_standalone();
//! assert_eq!(fin, Fin::Succ(()));
//! assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
//! ```

mod compose;
pub mod consumer;
pub mod pipes;
pub mod producer;
mod run;

use std::fmt;

use crate::aff::Aff;
use crate::eff::Eff;
use crate::runtime::{HasCancel, Runtime};

pub use compose::{
    compose, pipe, pull_compose, pull_then, push_compose, push_then, request_compose,
    EXCHANGE_BUDGET,
};
pub use run::{run_effect, run_effect_async};

/// The uninhabited type closing an unused end of a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Void {}

/// Eliminate a value that cannot exist.
pub fn absurd<T>(void: Void) -> T {
    match void {}
}

/// A one-shot continuation.
pub type Next<T, P> = Box<dyn FnOnce(T) -> P + Send>;

/// An effect step embedded in a proxy.
pub enum Lift<RT, T> {
    /// A synchronous step.
    Sync(Eff<T, RT>),
    /// An asynchronous step.
    Async(Aff<T, RT>),
}

impl<RT, T> fmt::Debug for Lift<RT, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lift::Sync(_) => f.write_str("Lift::Sync(<effect>)"),
            Lift::Async(_) => f.write_str("Lift::Async(<effect>)"),
        }
    }
}

impl<RT, T> Lift<RT, T>
where
    RT: HasCancel,
    T: Send + 'static,
{
    /// Transform the step's result.
    pub fn map<U, F>(self, f: F) -> Lift<RT, U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Lift::Sync(eff) => Lift::Sync(eff.map(f)),
            Lift::Async(aff) => Lift::Async(aff.map(f)),
        }
    }

    /// View the step as an asynchronous effect.
    pub fn into_aff(self) -> Aff<T, RT> {
        match self {
            Lift::Sync(eff) => eff.to_aff(),
            Lift::Async(aff) => aff,
        }
    }
}

/// A suspended bidirectional conversation.
///
/// - `A1`/`A`: request sent upstream / answer received from upstream
/// - `B1`/`B`: request received from downstream / answer sent downstream
/// - `R`: final result
pub enum Proxy<RT, A1, A, B1, B, R> {
    /// Ask upstream for an `A`.
    Request(A1, Next<A, Proxy<RT, A1, A, B1, B, R>>),
    /// Hand a `B` downstream and wait for its next request.
    Respond(B, Next<B1, Proxy<RT, A1, A, B1, B, R>>),
    /// Run an effect step.
    M(Lift<RT, Proxy<RT, A1, A, B1, B, R>>),
    /// Finished.
    Pure(R),
}

impl<RT, A1, A, B1, B, R> fmt::Debug for Proxy<RT, A1, A, B1, B, R>
where
    A1: fmt::Debug,
    B: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proxy::Request(a1, _) => f.debug_tuple("Request").field(a1).field(&"<function>").finish(),
            Proxy::Respond(b, _) => f.debug_tuple("Respond").field(b).field(&"<function>").finish(),
            Proxy::M(step) => f.debug_tuple("M").field(step).finish(),
            Proxy::Pure(r) => f.debug_tuple("Pure").field(r).finish(),
        }
    }
}

/// Emits `B` values and never requests. Finishes with `R`.
pub type Producer<RT, B, R> = Proxy<RT, Void, (), (), B, R>;
/// Awaits `A` values and never responds. Finishes with `R`.
pub type Consumer<RT, A, R> = Proxy<RT, (), A, (), Void, R>;
/// Awaits `A` values and emits `B` values.
pub type Pipe<RT, A, B, R> = Proxy<RT, (), A, (), B, R>;
/// Sends `A1` requests upstream and receives `A` replies.
pub type Client<RT, A1, A, R> = Proxy<RT, A1, A, (), Void, R>;
/// Receives `B1` requests from downstream and replies with `B`.
pub type Server<RT, B1, B, R> = Proxy<RT, Void, (), B1, B, R>;
/// A closed pipeline, ready to run.
pub type Effect<RT = Runtime, R = ()> = Proxy<RT, Void, (), (), Void, R>;

impl<RT, A1, A, B1, B, R> Proxy<RT, A1, A, B1, B, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
{
    /// A finished proxy.
    pub fn pure(value: R) -> Self {
        Proxy::Pure(value)
    }

    /// Postpone building a proxy until it is run.
    ///
    /// `make` runs as a synchronous effect step, under the runtime's
    /// cancellation check and panic capture.
    ///
    /// ```
    /// use millrace::proxy::{self, Effect, Proxy};
    /// use millrace::{Fin, Runtime};
    ///
    /// let effect: Effect<Runtime, i32> = Proxy::defer(|| Proxy::pure(2 + 2));
    /// assert_eq!(proxy::run_effect(effect).run_standalone(), Fin::Succ(4));
    /// ```
    pub fn defer<F>(make: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Proxy::M(Lift::Sync(Eff::lift(make)))
    }

    /// Embed a synchronous effect; the proxy finishes with its value.
    pub fn lift_eff(eff: Eff<R, RT>) -> Self {
        Proxy::M(Lift::Sync(eff.map(Proxy::Pure)))
    }

    /// Embed an asynchronous effect; the proxy finishes with its value.
    pub fn lift_aff(aff: Aff<R, RT>) -> Self {
        Proxy::M(Lift::Async(aff.map(Proxy::Pure)))
    }

    /// Continue with `f` once this proxy finishes.
    pub fn and_then<S, F>(self, f: F) -> Proxy<RT, A1, A, B1, B, S>
    where
        S: Send + 'static,
        F: FnOnce(R) -> Proxy<RT, A1, A, B1, B, S> + Send + 'static,
    {
        match self {
            Proxy::Request(a1, k) => Proxy::Request(a1, Box::new(move |a| k(a).and_then(f))),
            Proxy::Respond(b, k) => Proxy::Respond(b, Box::new(move |b1| k(b1).and_then(f))),
            Proxy::M(step) => Proxy::M(step.map(move |p| p.and_then(f))),
            Proxy::Pure(r) => f(r),
        }
    }

    /// Transform the final result.
    pub fn map<S, F>(self, f: F) -> Proxy<RT, A1, A, B1, B, S>
    where
        S: Send + 'static,
        F: FnOnce(R) -> S + Send + 'static,
    {
        self.and_then(move |r| Proxy::Pure(f(r)))
    }

    /// Run `next` after this proxy, discarding this proxy's result.
    pub fn then<S>(self, next: Proxy<RT, A1, A, B1, B, S>) -> Proxy<RT, A1, A, B1, B, S>
    where
        S: Send + 'static,
    {
        self.and_then(move |_| next)
    }

    /// Replace every `Respond` with the proxy `f` builds from its value.
    ///
    /// See [`compose`].
    pub fn for_each<C1, C, F>(self, f: F) -> Proxy<RT, A1, A, C1, C, R>
    where
        C1: Send + 'static,
        C: Send + 'static,
        F: Fn(B) -> Proxy<RT, A1, A, C1, C, B1> + Send + Sync + 'static,
    {
        compose(self, f)
    }

    /// Swap the upstream and downstream interfaces.
    pub fn reflect(self) -> Proxy<RT, B, B1, A, A1, R> {
        match self {
            Proxy::Request(a1, k) => Proxy::Respond(a1, Box::new(move |a| k(a).reflect())),
            Proxy::Respond(b, k) => Proxy::Request(b, Box::new(move |b1| k(b1).reflect())),
            Proxy::M(step) => Proxy::M(step.map(|p| p.reflect())),
            Proxy::Pure(r) => Proxy::Pure(r),
        }
    }
}

impl<RT, A1, A, B, R> Proxy<RT, A1, A, (), B, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
{
    /// Feed this proxy's output into `downstream`. See [`pipe`].
    pub fn pipe_into<C1, C>(self, downstream: Proxy<RT, (), B, C1, C, R>) -> Proxy<RT, A1, A, C1, C, R>
    where
        C1: Send + 'static,
        C: Send + 'static,
    {
        pipe(self, downstream)
    }
}

/// Ask upstream with `a1`; finish with the answer.
pub fn request<RT, A1, A, B1, B>(a1: A1) -> Proxy<RT, A1, A, B1, B, A>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
{
    Proxy::Request(a1, Box::new(Proxy::Pure))
}

/// Answer downstream with `b`; finish with its next request.
pub fn respond<RT, A1, A, B1, B>(b: B) -> Proxy<RT, A1, A, B1, B, B1>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
{
    Proxy::Respond(b, Box::new(Proxy::Pure))
}

/// Emit a value downstream.
pub fn yield_<RT, A1, A, B>(b: B) -> Proxy<RT, A1, A, (), B, ()>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    respond(b)
}

/// Wait for a value from upstream.
pub fn await_<RT, A, B1, B>() -> Proxy<RT, (), A, B1, B, A>
where
    RT: HasCancel,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
{
    request(())
}

/// The identity of pull composition: forward every request up and every
/// answer down, forever.
pub fn pull<RT, A1, A, R>(a1: A1) -> Proxy<RT, A1, A, A1, A, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    Proxy::Request(a1, Box::new(|a| Proxy::Respond(a, Box::new(pull))))
}

/// The identity of push composition: forward every answer down and every
/// request up, forever.
pub fn push<RT, A1, A, R>(a: A) -> Proxy<RT, A1, A, A1, A, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    Proxy::Respond(a, Box::new(|a1| Proxy::Request(a1, Box::new(push))))
}
