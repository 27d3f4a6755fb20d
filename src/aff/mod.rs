//! Asynchronous effects
//!
//! [`Aff<A, RT>`](Aff) mirrors [`Eff`](crate::Eff) for async code: a deferred,
//! run-once `RT -> Future<Fin<A>>`. [`Aff::run`] checks cancellation first,
//! races the computation against the runtime's token, and turns panics raised
//! while building or polling the future into `Fail`.
//!
//! # Examples
//!
//! ```
//! use millrace::{Aff, Error, Fin};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let aff = Aff::<i32>::from_future(async { 20 })
//!     .map(|x| x + 1)
//!     .and_then(|x| Aff::pure(x * 2));
//! assert_eq!(aff.run_standalone().await, Fin::Succ(42));
//!
//! let slow = Aff::<i32>::from_future(async {
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     1
//! })
//! .timeout(Duration::from_millis(10));
//! assert_eq!(slow.run_standalone().await, Fin::Fail(Error::timed_out()));
//! # });
//! ```

mod memo;
mod schedule;

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::time::Duration;

use futures::FutureExt;

use crate::catch::Catch;
use crate::predicate::{self, Predicate};
use crate::runtime::{HasCancel, Runtime};
use crate::{Error, Fin};

pub use memo::AsyncMemo;
pub use schedule::{
    fold, fold_until, fold_while, reduce, reduce_until, reduce_while, repeat, repeat_until,
    repeat_while, retry, retry_until, retry_while,
};

/// A boxed future that is Send
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type AffFn<A, RT> = Box<dyn FnOnce(RT) -> BoxFuture<'static, Fin<A>> + Send>;

/// A lazy, asynchronous, run-once computation over a runtime `RT`.
///
/// The runtime is cloned into the future, so an `Aff` can be spawned.
pub struct Aff<A, RT = Runtime> {
    run_fn: AffFn<A, RT>,
}

impl<A, RT> fmt::Debug for Aff<A, RT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aff").field("run_fn", &"<function>").finish()
    }
}

impl<A, RT> Aff<A, RT>
where
    A: Send + 'static,
    RT: HasCancel,
{
    /// Wrap a raw `RT -> Future<Fin<A>>` function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(RT) -> Fut + Send + 'static,
        Fut: Future<Output = Fin<A>> + Send + 'static,
    {
        Aff {
            run_fn: Box::new(move |rt| Box::pin(f(rt))),
        }
    }

    /// An effect that succeeds with `value`.
    pub fn pure(value: A) -> Self {
        Aff::new(move |_| async move { Fin::Succ(value) })
    }

    /// An effect that fails with `error`.
    pub fn fail(error: impl Into<Error>) -> Self {
        let error = error.into();
        Aff::new(move |_| async move { Fin::Fail(error) })
    }

    /// An effect that produces `Bottom`.
    pub fn bottom() -> Self {
        Aff::new(|_| async { Fin::Bottom })
    }

    /// An effect that returns an already computed outcome.
    pub fn from_fin(fin: Fin<A>) -> Self {
        Aff::new(move |_| async move { fin })
    }

    /// Await a future built from the runtime.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(RT) -> Fut + Send + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Aff::new(move |rt| f(rt).map(Fin::Succ))
    }

    /// Await an existing future.
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = A> + Send + 'static,
    {
        Aff::new(move |_| future.map(Fin::Succ))
    }

    /// Await a fallible future; `Err` becomes an `Exceptional` failure.
    pub fn from_result_async<F, Fut, E>(f: F) -> Self
    where
        F: FnOnce(RT) -> Fut + Send + 'static,
        Fut: Future<Output = Result<A, E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        Aff::new(move |rt| {
            f(rt).map(|result| match result {
                Ok(a) => Fin::Succ(a),
                Err(e) => Fin::Fail(Error::from_exception(e)),
            })
        })
    }

    /// Project a value out of the runtime.
    pub fn asks<F>(f: F) -> Self
    where
        F: FnOnce(&RT) -> A + Send + 'static,
    {
        Aff::new(move |rt| {
            let value = f(&rt);
            async move { Fin::Succ(value) }
        })
    }

    /// Evaluate the effect.
    ///
    /// Completes with `Fail(CANCELLED)` as soon as the runtime is cancelled,
    /// dropping the in-flight future.
    pub async fn run(self, rt: &RT) -> Fin<A> {
        let token = rt.cancellation().clone();
        if token.is_cancelled() {
            return Fin::Fail(Error::cancelled());
        }
        let run_fn = self.run_fn;
        let owned = rt.clone();
        let future = match panic::catch_unwind(AssertUnwindSafe(move || run_fn(owned))) {
            Ok(future) => future,
            Err(payload) => return Fin::Fail(Error::from_panic(payload)),
        };
        tokio::select! {
            biased;
            _ = token.cancelled() => Fin::Fail(Error::cancelled()),
            outcome = AssertUnwindSafe(future).catch_unwind() => match outcome {
                Ok(fin) => fin,
                Err(payload) => Fin::Fail(Error::from_panic(payload)),
            },
        }
    }

    /// Transform the success value.
    pub fn map<B, F>(self, f: F) -> Aff<B, RT>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Aff::new(move |rt: RT| async move { self.run(&rt).await.map(f) })
    }

    /// Sequence another effect that depends on the success value.
    pub fn and_then<B, F>(self, f: F) -> Aff<B, RT>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Aff<B, RT> + Send + 'static,
    {
        Aff::new(move |rt: RT| async move {
            match self.run(&rt).await {
                Fin::Succ(a) => f(a).run(&rt).await,
                Fin::Fail(e) => Fin::Fail(e),
                Fin::Bottom => Fin::Bottom,
            }
        })
    }

    /// Sequence a synchronous effect.
    pub fn and_then_eff<B, F>(self, f: F) -> Aff<B, RT>
    where
        B: Send + 'static,
        F: FnOnce(A) -> crate::Eff<B, RT> + Send + 'static,
    {
        self.and_then(move |a| f(a).to_aff())
    }

    /// Transform the error.
    pub fn map_fail<F>(self, f: F) -> Self
    where
        F: FnOnce(Error) -> Error + Send + 'static,
    {
        Aff::new(move |rt: RT| async move { self.run(&rt).await.map_fail(f) })
    }

    /// Keep the value only when `predicate` holds; otherwise `Bottom`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&A) -> bool + Send + 'static,
    {
        Aff::new(move |rt: RT| async move { self.run(&rt).await.filter(predicate) })
    }

    /// Run both effects in order and pair their results.
    pub fn zip<B>(self, other: Aff<B, RT>) -> Aff<(A, B), RT>
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
    pub fn catch<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Predicate<Error> + 'static,
        H: FnOnce(Error) -> Aff<A, RT> + Send + 'static,
    {
        self.catch_with(Catch::when(predicate, handler))
    }

    /// Apply a reusable [`Catch`].
    pub fn catch_with(self, catch: Catch<Aff<A, RT>>) -> Self {
        Aff::new(move |rt: RT| async move {
            match self.run(&rt).await {
                Fin::Fail(error) => match catch.handle(error) {
                    Ok(recovery) => recovery.run(&rt).await,
                    Err(error) => Fin::Fail(error),
                },
                other => other,
            }
        })
    }

    /// Recover from failures with `code`.
    pub fn catch_code<H>(self, code: i32, handler: H) -> Self
    where
        H: FnOnce(Error) -> Aff<A, RT> + Send + 'static,
    {
        self.catch(predicate::has_code(code), handler)
    }

    /// Recover from failures with exactly `message`.
    pub fn catch_message<H>(self, message: impl Into<String>, handler: H) -> Self
    where
        H: FnOnce(Error) -> Aff<A, RT> + Send + 'static,
    {
        self.catch(predicate::has_message(message), handler)
    }

    /// Recover from failures wrapping a `T`.
    pub fn catch_of<T, H>(self, handler: H) -> Self
    where
        T: StdError + 'static,
        H: FnOnce(Error) -> Aff<A, RT> + Send + 'static,
    {
        self.catch(predicate::is_exception::<T>(), handler)
    }

    /// Recover from every failure.
    pub fn catch_all<H>(self, handler: H) -> Self
    where
        H: FnOnce(Error) -> Aff<A, RT> + Send + 'static,
    {
        self.catch(predicate::any_error(), handler)
    }

    /// Recover from `Bottom`.
    pub fn or_else_bottom<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Aff<A, RT> + Send + 'static,
    {
        Aff::new(move |rt: RT| async move {
            match self.run(&rt).await {
                Fin::Bottom => f().run(&rt).await,
                other => other,
            }
        })
    }

    /// Run under an environment derived from the outer one.
    pub fn local<Outer, F>(self, f: F) -> Aff<A, Outer>
    where
        Outer: HasCancel,
        F: FnOnce(&Outer) -> RT + Send + 'static,
    {
        Aff::new(move |outer: Outer| {
            let inner = f(&outer);
            async move { self.run(&inner).await }
        })
    }

    /// Fail with `TIMED_OUT` if the effect has not finished after `duration`.
    pub fn timeout(self, duration: Duration) -> Self {
        Aff::new(move |rt: RT| async move {
            match tokio::time::timeout(duration, self.run(&rt)).await {
                Ok(fin) => fin,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(?duration, "effect timed out");
                    Fin::Fail(Error::timed_out())
                }
            }
        })
    }

    /// Run both effects concurrently and keep whichever finishes first.
    ///
    /// The loser is dropped.
    pub fn race(self, other: Aff<A, RT>) -> Self {
        Aff::new(move |rt: RT| async move {
            tokio::select! {
                fin = self.run(&rt) => fin,
                fin = other.run(&rt) => fin,
            }
        })
    }
}

impl<A, RT> Aff<A, RT>
where
    A: Clone + Send + Sync + 'static,
    RT: HasCancel,
{
    /// Cache the outcome: the returned handle evaluates this effect at most once.
    pub fn memo(self) -> AsyncMemo<A, RT> {
        AsyncMemo::new(self)
    }
}

impl<A: Send + 'static> Aff<A, Runtime> {
    /// Run with a fresh default [`Runtime`].
    pub async fn run_standalone(self) -> Fin<A> {
        self.run(&Runtime::new()).await
    }
}

impl<RT: HasCancel> Aff<RT, RT> {
    /// An effect returning a clone of the runtime.
    pub fn ask() -> Self {
        Aff::new(|rt: RT| async move { Fin::Succ(rt) })
    }
}

/// Run `ma` under an environment derived by `f`.
pub fn local_aff<A, Outer, Inner, F>(f: F, ma: Aff<A, Inner>) -> Aff<A, Outer>
where
    A: Send + 'static,
    Outer: HasCancel,
    Inner: HasCancel,
    F: FnOnce(&Outer) -> Inner + Send + 'static,
{
    ma.local(f)
}
