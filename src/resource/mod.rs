//! Resource-safe scopes
//!
//! `use_*` acquire a handle, lend it to a body, and release it exactly once
//! whatever the body does: succeed, fail, panic, get cancelled, or (for
//! pipelines) get abandoned by its interpreter. If acquisition itself fails
//! the body never runs and nothing is released.
//!
//! # Example
//!
//! ```
//! use millrace::resource::use_with;
//! use millrace::{Eff, Fin};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let closed = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&closed);
//!
//! let eff: Eff<usize> = use_with(
//!     Eff::lift(|| String::from("connection")),
//!     move |_conn| flag.store(true, Ordering::SeqCst),
//!     |conn| Eff::pure(conn.len()),
//! );
//!
//! assert_eq!(eff.run_standalone(), Fin::Succ(10));
//! assert!(closed.load(Ordering::SeqCst));
//! ```

mod guard;

use std::fmt;
use std::ops::Deref;

use crate::aff::Aff;
use crate::eff::Eff;
use crate::fin::Fin;
use crate::proxy::{Lift, Proxy};
use crate::runtime::HasCancel;

pub use guard::Guard;

/// A handle that can be disposed of.
pub trait Release: Send + 'static {
    /// Dispose of the handle.
    fn release(self);
}

/// A handle paired with the closure that disposes of it.
pub struct Managed<H, F>
where
    F: FnOnce(H),
{
    handle: H,
    release: F,
}

impl<H, F> Managed<H, F>
where
    F: FnOnce(H),
{
    /// Pair `handle` with `release`.
    pub fn new(handle: H, release: F) -> Self {
        Managed { handle, release }
    }

    /// Borrow the handle.
    pub fn get(&self) -> &H {
        &self.handle
    }
}

impl<H, F> Deref for Managed<H, F>
where
    F: FnOnce(H),
{
    type Target = H;

    fn deref(&self) -> &H {
        &self.handle
    }
}

impl<H, F> Release for Managed<H, F>
where
    H: Send + 'static,
    F: FnOnce(H) + Send + 'static,
{
    fn release(self) {
        (self.release)(self.handle)
    }
}

impl<H: fmt::Debug, F: FnOnce(H)> fmt::Debug for Managed<H, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("handle", &self.handle)
            .field("release", &"<function>")
            .finish()
    }
}

/// Acquire a handle, run `body` with it, release it.
pub fn use_eff<H, B, RT, F>(acquire: Eff<H, RT>, body: F) -> Eff<B, RT>
where
    H: Release,
    B: Send + 'static,
    RT: HasCancel,
    F: FnOnce(&H) -> Eff<B, RT> + Send + 'static,
{
    Eff::new(move |rt: &RT| {
        let guard = match acquire.run(rt) {
            Fin::Succ(handle) => Guard::new(handle),
            Fin::Fail(e) => return Fin::Fail(e),
            Fin::Bottom => return Fin::Bottom,
        };
        let outcome = body(guard.get()).run(rt);
        guard.release();
        outcome
    })
}

/// Asynchronous [`use_eff`].
///
/// Cancelling the runtime while the body is suspended still releases.
pub fn use_aff<H, B, RT, F>(acquire: Aff<H, RT>, body: F) -> Aff<B, RT>
where
    H: Release,
    B: Send + 'static,
    RT: HasCancel,
    F: FnOnce(&H) -> Aff<B, RT> + Send + 'static,
{
    Aff::new(move |rt: RT| async move {
        let guard = match acquire.run(&rt).await {
            Fin::Succ(handle) => Guard::new(handle),
            Fin::Fail(e) => return Fin::Fail(e),
            Fin::Bottom => return Fin::Bottom,
        };
        let body = body(guard.get());
        let outcome = body.run(&rt).await;
        guard.release();
        outcome
    })
}

/// Acquire a handle for the lifetime of a pipeline section.
///
/// The handle is released when `body` finishes, or when the proxy is dropped
/// before finishing, e.g. because a downstream stage stopped pulling.
pub fn use_proxy<H, RT, A1, A, B1, B, R, F>(acquire: Eff<H, RT>, body: F) -> Proxy<RT, A1, A, B1, B, R>
where
    H: Release,
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&H) -> Proxy<RT, A1, A, B1, B, R> + Send + 'static,
{
    Proxy::M(Lift::Sync(acquire.map(move |handle| scoped(handle, body))))
}

/// [`use_proxy`] with an asynchronous acquire.
pub fn use_proxy_async<H, RT, A1, A, B1, B, R, F>(acquire: Aff<H, RT>, body: F) -> Proxy<RT, A1, A, B1, B, R>
where
    H: Release,
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&H) -> Proxy<RT, A1, A, B1, B, R> + Send + 'static,
{
    Proxy::M(Lift::Async(acquire.map(move |handle| scoped(handle, body))))
}

fn scoped<H, RT, A1, A, B1, B, R, F>(handle: H, body: F) -> Proxy<RT, A1, A, B1, B, R>
where
    H: Release,
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&H) -> Proxy<RT, A1, A, B1, B, R>,
{
    let guard = Guard::new(handle);
    let section = body(guard.get());
    section.and_then(move |r| {
        guard.release();
        Proxy::Pure(r)
    })
}

/// [`use_eff`] for handles without a [`Release`] impl.
pub fn use_with<H, B, RT, D, F>(acquire: Eff<H, RT>, release: D, body: F) -> Eff<B, RT>
where
    H: Send + 'static,
    B: Send + 'static,
    RT: HasCancel,
    D: FnOnce(H) + Send + 'static,
    F: FnOnce(&H) -> Eff<B, RT> + Send + 'static,
{
    use_eff(acquire.map(move |handle| Managed::new(handle, release)), move |managed| {
        body(managed.get())
    })
}

#[cfg(test)]
mod tests;
