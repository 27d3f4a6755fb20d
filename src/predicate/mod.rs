//! Composable predicates
//!
//! Predicates decide which failures a [`catch`](crate::Eff::catch) recovers from
//! and which failures a [`retry_while`](crate::Eff::retry_while) keeps retrying.
//! They combine with `and`, `or` and `not`, and any `Fn(&T) -> bool` closure is a
//! predicate too.
//!
//! # Example
//!
//! ```rust
//! use millrace::predicate::*;
//! use millrace::{Eff, Error, Fin};
//!
//! let transient = has_code(503).or(has_code(429));
//!
//! let fin = Eff::<i32>::fail(Error::coded(429, "rate limited"))
//!     .catch(transient, |_| Eff::pure(0))
//!     .run_standalone();
//! assert_eq!(fin, Fin::Succ(0));
//! ```

mod combinators;
mod error;

pub use combinators::{And, Not, Or, Predicate, PredicateExt};
pub use error::{
    any_error, has_code, has_message, is, is_cancelled, is_exception, AnyError, HasCode,
    HasMessage, Is, IsException,
};
