//! # Millrace
//!
//! > *"The race turns the wheel; the wheel does the work"*
//!
//! Lazy effects and bidirectional streaming pipelines for Rust.
//!
//! ## Building blocks
//!
//! - [`Fin`]: the outcome of running an effect: `Succ`, `Fail(Error)` or `Bottom`
//! - [`Eff`]: a deferred synchronous computation over a runtime `RT`
//! - [`Aff`]: its asynchronous counterpart, cancellable through the runtime
//! - [`Schedule`]: a lazy sequence of delays driving `fold`, `repeat` and `retry`
//! - [`Proxy`]: a suspended conversation between pipeline stages, run with
//!   [`proxy::run_effect`] or [`proxy::run_effect_async`]
//! - [`resource`]: `use_*` scopes that release their handle exactly once
//!
//! Nothing runs until `run` is called. Panics inside an effect become
//! [`Error::Exceptional`] failures; cancelling the runtime turns pending work into
//! a `CANCELLED` failure.
//!
//! ## Quick Example
//!
//! ```rust
//! use millrace::proxy::{self, pipes, producer};
//! use millrace::{eff, Eff, Error, Fin, Schedule};
//!
//! // a flaky read, recovered only for the error code we expect
//! let read = Eff::<u32>::fail(Error::coded(42, "not ready"))
//!     .catch_code(42, |_| Eff::pure(7));
//! assert_eq!(read.run_standalone(), Fin::Succ(7));
//!
//! // run an effect three times and sum the results
//! let total: Eff<u32> = eff::fold(Schedule::recurs(2), || Eff::pure(2), 0, |s, v| s + v);
//! assert_eq!(total.run_standalone(), Fin::Succ(6));
//!
//! // stream values through a pipeline
//! let squares = proxy::pipe(producer::each(1..=3u32), pipes::map(|x: u32| x * x));
//! let sum: Eff<u32> = producer::fold(squares, 0, |s, x| s + x);
//! assert_eq!(sum.run_standalone(), Fin::Succ(14));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod aff;
pub mod catch;
pub mod eff;
pub mod error;
pub mod fin;
pub mod predicate;
pub mod proxy;
pub mod resource;
pub mod runtime;
pub mod schedule;
pub mod semigroup;
pub mod testing;

// Re-exports
pub use aff::Aff;
pub use catch::Catch;
pub use eff::Eff;
pub use error::{Error, Exceptional, Panic};
pub use fin::Fin;
pub use proxy::{Effect, Proxy, Void};
pub use resource::Release;
pub use runtime::{HasCancel, Runtime};
pub use schedule::{JitterStrategy, Schedule};
pub use semigroup::Semigroup;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aff::Aff;
    pub use crate::catch::Catch;
    pub use crate::eff::Eff;
    pub use crate::error::Error;
    pub use crate::fin::Fin;
    pub use crate::predicate::{Predicate, PredicateExt};
    pub use crate::proxy::{
        await_, pipe, request, respond, run_effect, run_effect_async, yield_, Client, Consumer,
        Effect, Pipe, Producer, Proxy, Server, Void,
    };
    pub use crate::resource::{use_aff, use_eff, use_proxy, use_with, Release};
    pub use crate::runtime::{HasCancel, Runtime};
    pub use crate::schedule::Schedule;
    pub use crate::semigroup::Semigroup;
}
