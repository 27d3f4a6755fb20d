//! Synchronous effects
//!
//! An [`Eff<A, RT>`](Eff) is a deferred computation that, given a runtime `RT`,
//! produces a [`Fin<A>`](crate::Fin). Nothing happens until [`Eff::run`] is called,
//! and each `Eff` runs at most once: loops that need to run "the same" effect
//! again take a factory (`Fn() -> Eff`).
//!
//! `run` is a hard boundary: it checks the runtime's cancellation token first and
//! turns any panic raised by user code into `Fail(Exceptional(Panic))`. Every
//! combinator runs its inner effects through `run`, so the same holds at every
//! bind.
//!
//! # Examples
//!
//! ```
//! use millrace::{Eff, Error, Fin};
//!
//! let eff = Eff::<i32>::pure(5)
//!     .map(|x| x * 2)
//!     .and_then(|x| Eff::pure(x + 10));
//! assert_eq!(eff.run_standalone(), Fin::Succ(20));
//!
//! let recovered = Eff::<i32>::fail(Error::coded(42, "nope"))
//!     .catch_code(42, |_| Eff::pure(0))
//!     .run_standalone();
//! assert_eq!(recovered, Fin::Succ(0));
//!
//! let panicked = Eff::<i32>::lift(|| panic!("boom")).run_standalone();
//! assert!(panicked.err().is_some_and(|e| e.is_panic()));
//! ```

mod memo;
mod schedule;

use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::aff::Aff;
use crate::catch::Catch;
use crate::predicate::{self, Predicate};
use crate::runtime::{HasCancel, Runtime};
use crate::{Error, Fin};

pub use memo::Memo;
pub use schedule::{
    fold, fold_until, fold_while, reduce, reduce_until, reduce_while, repeat, repeat_until,
    repeat_while, retry, retry_until, retry_while,
};

type EffFn<A, RT> = Box<dyn FnOnce(&RT) -> Fin<A> + Send>;

/// A lazy, synchronous, run-once computation over a runtime `RT`.
pub struct Eff<A, RT = Runtime> {
    run_fn: EffFn<A, RT>,
}

impl<A, RT> fmt::Debug for Eff<A, RT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eff").field("run_fn", &"<function>").finish()
    }
}

impl<A, RT> Eff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
{
    /// Wrap a raw `&RT -> Fin<A>` function.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&RT) -> Fin<A> + Send + 'static,
    {
        Eff {
            run_fn: Box::new(f),
        }
    }

    /// An effect that succeeds with `value`.
    pub fn pure(value: A) -> Self {
        Eff::new(move |_| Fin::Succ(value))
    }

    /// An effect that fails with `error`.
    pub fn fail(error: impl Into<Error>) -> Self {
        let error = error.into();
        Eff::new(move |_| Fin::Fail(error))
    }

    /// An effect that produces `Bottom`.
    pub fn bottom() -> Self {
        Eff::new(|_| Fin::Bottom)
    }

    /// An effect that returns an already computed outcome.
    pub fn from_fin(fin: Fin<A>) -> Self {
        Eff::new(move |_| fin)
    }

    /// Defer a side-effecting thunk.
    pub fn lift<F>(f: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Eff::new(move |_| Fin::Succ(f()))
    }

    /// Project a value out of the runtime.
    pub fn asks<F>(f: F) -> Self
    where
        F: FnOnce(&RT) -> A + Send + 'static,
    {
        Eff::new(move |rt| Fin::Succ(f(rt)))
    }

    /// Run a fallible function; `Err` becomes an `Exceptional` failure.
    pub fn from_result<F, E>(f: F) -> Self
    where
        F: FnOnce(&RT) -> Result<A, E> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        Eff::new(move |rt| match f(rt) {
            Ok(a) => Fin::Succ(a),
            Err(e) => Fin::Fail(Error::from_exception(e)),
        })
    }

    /// Evaluate the effect.
    ///
    /// Returns `Fail(CANCELLED)` without running anything when the runtime is
    /// already cancelled. Panics raised inside become `Fail`.
    pub fn run(self, rt: &RT) -> Fin<A> {
        if rt.is_cancelled() {
            return Fin::Fail(Error::cancelled());
        }
        let run_fn = self.run_fn;
        panic::catch_unwind(AssertUnwindSafe(move || run_fn(rt)))
            .unwrap_or_else(|payload| Fin::Fail(Error::from_panic(payload)))
    }

    /// Transform the success value.
    pub fn map<B, F>(self, f: F) -> Eff<B, RT>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Eff::new(move |rt| self.run(rt).map(f))
    }

    /// Sequence another effect that depends on the success value.
    pub fn and_then<B, F>(self, f: F) -> Eff<B, RT>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Eff<B, RT> + Send + 'static,
    {
        Eff::new(move |rt| match self.run(rt) {
            Fin::Succ(a) => f(a).run(rt),
            Fin::Fail(e) => Fin::Fail(e),
            Fin::Bottom => Fin::Bottom,
        })
    }

    /// Transform the error.
    pub fn map_fail<F>(self, f: F) -> Self
    where
        F: FnOnce(Error) -> Error + Send + 'static,
    {
        Eff::new(move |rt| self.run(rt).map_fail(f))
    }

    /// Keep the value only when `predicate` holds; otherwise `Bottom`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&A) -> bool + Send + 'static,
    {
        Eff::new(move |rt| self.run(rt).filter(predicate))
    }

    /// Run both effects in order and pair their results.
    pub fn zip<B>(self, other: Eff<B, RT>) -> Eff<(A, B), RT>
    where
        B: Send + 'static,
    {
        self.and_then(move |a| other.map(move |b| (a, b)))
    }

    /// Observe the success value without changing it.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&A) + Send + 'static,
    {
        self.map(move |a| {
            f(&a);
            a
        })
    }

    /// Recover from failures matching `predicate`.
    ///
    /// Non-matching failures and `Bottom` pass through unchanged.
    pub fn catch<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Predicate<Error> + 'static,
        H: FnOnce(Error) -> Eff<A, RT> + Send + 'static,
    {
        self.catch_with(Catch::when(predicate, handler))
    }

    /// Apply a reusable [`Catch`].
    pub fn catch_with(self, catch: Catch<Eff<A, RT>>) -> Self {
        Eff::new(move |rt| match self.run(rt) {
            Fin::Fail(error) => match catch.handle(error) {
                Ok(recovery) => recovery.run(rt),
                Err(error) => Fin::Fail(error),
            },
            other => other,
        })
    }

    /// Recover from failures with `code`.
    pub fn catch_code<H>(self, code: i32, handler: H) -> Self
    where
        H: FnOnce(Error) -> Eff<A, RT> + Send + 'static,
    {
        self.catch(predicate::has_code(code), handler)
    }

    /// Recover from failures with exactly `message`.
    pub fn catch_message<H>(self, message: impl Into<String>, handler: H) -> Self
    where
        H: FnOnce(Error) -> Eff<A, RT> + Send + 'static,
    {
        self.catch(predicate::has_message(message), handler)
    }

    /// Recover from failures wrapping a `T`.
    pub fn catch_of<T, H>(self, handler: H) -> Self
    where
        T: StdError + 'static,
        H: FnOnce(Error) -> Eff<A, RT> + Send + 'static,
    {
        self.catch(predicate::is_exception::<T>(), handler)
    }

    /// Recover from every failure.
    pub fn catch_all<H>(self, handler: H) -> Self
    where
        H: FnOnce(Error) -> Eff<A, RT> + Send + 'static,
    {
        self.catch(predicate::any_error(), handler)
    }

    /// Recover from `Bottom`.
    pub fn or_else_bottom<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Eff<A, RT> + Send + 'static,
    {
        Eff::new(move |rt| match self.run(rt) {
            Fin::Bottom => f().run(rt),
            other => other,
        })
    }

    /// Run under an environment derived from the outer one.
    pub fn local<Outer, F>(self, f: F) -> Eff<A, Outer>
    where
        Outer: HasCancel,
        F: FnOnce(&Outer) -> RT + Send + 'static,
    {
        Eff::new(move |outer| {
            let inner = f(outer);
            self.run(&inner)
        })
    }

    /// Lift into an asynchronous effect.
    pub fn to_aff(self) -> Aff<A, RT> {
        Aff::new(move |rt: RT| async move { self.run(&rt) })
    }
}

impl<A, RT> Eff<A, RT>
where
    A: Clone + Send + Sync + 'static,
    RT: HasCancel,
{
    /// Cache the outcome: the returned handle evaluates this effect at most once.
    pub fn memo(self) -> Memo<A, RT> {
        Memo::new(self)
    }
}

impl<A: Send + 'static> Eff<A, Runtime> {
    /// Run with a fresh default [`Runtime`].
    pub fn run_standalone(self) -> Fin<A> {
        self.run(&Runtime::new())
    }
}

impl<RT: HasCancel> Eff<RT, RT> {
    /// An effect returning a clone of the runtime.
    pub fn ask() -> Self {
        Eff::new(|rt: &RT| Fin::Succ(rt.clone()))
    }
}

/// Run `ma` under an environment derived by `f`.
pub fn local_eff<A, Outer, Inner, F>(f: F, ma: Eff<A, Inner>) -> Eff<A, Outer>
where
    A: Send + 'static,
    Outer: HasCancel,
    Inner: HasCancel,
    F: FnOnce(&Outer) -> Inner + Send + 'static,
{
    ma.local(f)
}
