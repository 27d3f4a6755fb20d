//! Reusable error handlers
//!
//! A [`Catch`] pairs an error predicate with a recovery function. It can be built
//! once, chained with [`Catch::or`], and applied to any number of effects with
//! `catch_with`.
//!
//! ```
//! use millrace::{Catch, Eff, Error, Fin};
//!
//! let fallback = Catch::code(404, |_| Eff::pure("not found".to_string()))
//!     .or(Catch::code(500, |e: Error| Eff::pure(format!("server: {}", e.message()))));
//!
//! let fin = Eff::<String>::fail(Error::coded(500, "boom"))
//!     .catch_with(fallback)
//!     .run_standalone();
//! assert_eq!(fin, Fin::Succ("server: boom".to_string()));
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::predicate::{self, Predicate};
use crate::Error;

type Handler<F> = Box<dyn FnOnce(Error) -> F + Send>;

/// A predicate over errors plus the effect to run when it matches.
///
/// `F` is the recovery effect type (`Eff<A, RT>` or `Aff<A, RT>`).
pub struct Catch<F> {
    predicate: Arc<dyn Predicate<Error>>,
    handler: Handler<F>,
}

impl<F: 'static> Catch<F> {
    /// Recover from errors matching `predicate`.
    pub fn when<P, H>(predicate: P, handler: H) -> Self
    where
        P: Predicate<Error> + 'static,
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Catch {
            predicate: Arc::new(predicate),
            handler: Box::new(handler),
        }
    }

    /// Recover from errors with `code`.
    pub fn code<H>(code: i32, handler: H) -> Self
    where
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Self::when(predicate::has_code(code), handler)
    }

    /// Recover from errors with exactly `message`.
    pub fn message<H>(message: impl Into<String>, handler: H) -> Self
    where
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Self::when(predicate::has_message(message), handler)
    }

    /// Recover from errors equal to `error`.
    pub fn error<H>(error: Error, handler: H) -> Self
    where
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Self::when(predicate::is(error), handler)
    }

    /// Recover from errors wrapping a `T`.
    pub fn of<T, H>(handler: H) -> Self
    where
        T: StdError + 'static,
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Self::when(predicate::is_exception::<T>(), handler)
    }

    /// Recover from every error.
    pub fn all<H>(handler: H) -> Self
    where
        H: FnOnce(Error) -> F + Send + 'static,
    {
        Self::when(predicate::any_error(), handler)
    }

    /// Returns true when this catch would handle `error`.
    pub fn matches(&self, error: &Error) -> bool {
        self.predicate.check(error)
    }

    /// Try this catch first, then `other`.
    pub fn or(self, other: Catch<F>) -> Catch<F> {
        let first = Arc::clone(&self.predicate);
        let second = Arc::clone(&other.predicate);
        Catch {
            predicate: Arc::new(move |e: &Error| first.check(e) || second.check(e)),
            handler: Box::new(move |e| {
                if self.predicate.check(&e) {
                    (self.handler)(e)
                } else {
                    (other.handler)(e)
                }
            }),
        }
    }

    /// Run the handler if the predicate matches, otherwise give the error back.
    pub(crate) fn handle(self, error: Error) -> Result<F, Error> {
        if self.predicate.check(&error) {
            Ok((self.handler)(error))
        } else {
            Err(error)
        }
    }
}

impl<F> fmt::Debug for Catch<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catch")
            .field("predicate", &"<predicate>")
            .field("handler", &"<function>")
            .finish()
    }
}
