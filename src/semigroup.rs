//! Semigroup trait for associative operations
//!
//! Used to aggregate errors: combining two [`Error`](crate::Error) values yields a
//! flattened `Error::Many`.
//!
//! # Examples
//!
//! ```
//! use millrace::{Error, Semigroup};
//!
//! let err = Error::coded(1, "first").combine(Error::coded(2, "second"));
//! assert_eq!(err.into_errors().len(), 2);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}
