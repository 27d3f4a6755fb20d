//! The outcome of running an effect
//!
//! [`Fin`] is tri-state: a value, a failure carrying an [`Error`], or `Bottom`.
//! `Bottom` means "no value and no diagnostic", e.g. a filter that rejected its
//! input. It is not an error and catch handlers never see it.
//!
//! # Examples
//!
//! ```
//! use millrace::{Error, Fin};
//!
//! let ok = Fin::Succ(20).map(|x| x + 1).and_then(|x| Fin::Succ(x * 2));
//! assert_eq!(ok, Fin::Succ(42));
//!
//! let filtered = Fin::Succ(3).filter(|x| x % 2 == 0);
//! assert!(filtered.is_bottom());
//!
//! let failed: Fin<i32> = Fin::fail(Error::coded(42, "nope"));
//! assert_eq!(failed.into_result().unwrap_err().code(), 42);
//! ```

use crate::Error;

/// A tri-state outcome: success, failure, or bottom.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a Fin may carry a failure that should be handled"]
pub enum Fin<A> {
    /// A value.
    Succ(A),
    /// A failure with a diagnostic.
    Fail(Error),
    /// No value and no diagnostic.
    Bottom,
}

impl<A> Fin<A> {
    /// Wrap a value.
    pub fn succ(value: A) -> Self {
        Fin::Succ(value)
    }

    /// Wrap an error.
    pub fn fail(error: impl Into<Error>) -> Self {
        Fin::Fail(error.into())
    }

    /// `None` becomes `Bottom`.
    pub fn from_option(value: Option<A>) -> Self {
        match value {
            Some(a) => Fin::Succ(a),
            None => Fin::Bottom,
        }
    }

    /// Returns true for `Succ`.
    pub fn is_succ(&self) -> bool {
        matches!(self, Fin::Succ(_))
    }

    /// Returns true for `Fail`.
    pub fn is_fail(&self) -> bool {
        matches!(self, Fin::Fail(_))
    }

    /// Returns true for `Bottom`.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Fin::Bottom)
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Fin<&A> {
        match self {
            Fin::Succ(a) => Fin::Succ(a),
            Fin::Fail(e) => Fin::Fail(e.clone()),
            Fin::Bottom => Fin::Bottom,
        }
    }

    /// Transform the success value.
    pub fn map<B, F: FnOnce(A) -> B>(self, f: F) -> Fin<B> {
        match self {
            Fin::Succ(a) => Fin::Succ(f(a)),
            Fin::Fail(e) => Fin::Fail(e),
            Fin::Bottom => Fin::Bottom,
        }
    }

    /// Chain a computation on the success value.
    pub fn and_then<B, F: FnOnce(A) -> Fin<B>>(self, f: F) -> Fin<B> {
        match self {
            Fin::Succ(a) => f(a),
            Fin::Fail(e) => Fin::Fail(e),
            Fin::Bottom => Fin::Bottom,
        }
    }

    /// Transform the error.
    pub fn map_fail<F: FnOnce(Error) -> Error>(self, f: F) -> Self {
        match self {
            Fin::Fail(e) => Fin::Fail(f(e)),
            other => other,
        }
    }

    /// Keep the value only if `predicate` holds; otherwise `Bottom`.
    pub fn filter<P: FnOnce(&A) -> bool>(self, predicate: P) -> Self {
        match self {
            Fin::Succ(a) if predicate(&a) => Fin::Succ(a),
            Fin::Succ(_) => Fin::Bottom,
            other => other,
        }
    }

    /// Recover from a failure. `Bottom` passes through.
    pub fn or_else<F: FnOnce(Error) -> Fin<A>>(self, f: F) -> Self {
        match self {
            Fin::Fail(e) => f(e),
            other => other,
        }
    }

    /// The success value, if any.
    pub fn ok(self) -> Option<A> {
        match self {
            Fin::Succ(a) => Some(a),
            _ => None,
        }
    }

    /// The error, if any.
    pub fn err(self) -> Option<Error> {
        match self {
            Fin::Fail(e) => Some(e),
            _ => None,
        }
    }

    /// Convert to a `Result`, mapping `Bottom` to [`Error::bottom`].
    pub fn into_result(self) -> Result<A, Error> {
        match self {
            Fin::Succ(a) => Ok(a),
            Fin::Fail(e) => Err(e),
            Fin::Bottom => Err(Error::bottom()),
        }
    }

    /// The success value or `default`.
    pub fn unwrap_or(self, default: A) -> A {
        self.ok().unwrap_or(default)
    }

    /// The success value.
    ///
    /// # Panics
    ///
    /// Panics on `Fail` or `Bottom`.
    #[track_caller]
    pub fn unwrap(self) -> A {
        match self {
            Fin::Succ(a) => a,
            Fin::Fail(e) => panic!("called `Fin::unwrap()` on a `Fail` value: {}", e),
            Fin::Bottom => panic!("called `Fin::unwrap()` on a `Bottom` value"),
        }
    }
}

impl<A, E: Into<Error>> From<Result<A, E>> for Fin<A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(a) => Fin::Succ(a),
            Err(e) => Fin::Fail(e.into()),
        }
    }
}
