//! Error values carried by failed effects
//!
//! An [`Error`] is one of three shapes:
//!
//! - **Exceptional**: wraps a `std::error::Error` (or a caught panic) and keeps the
//!   original value so callers can downcast to it
//! - **Coded**: an integer code plus a message
//! - **Many**: an aggregate of several errors
//!
//! Two errors are equal when their codes match, falling back to the message when
//! neither side carries a code.
//!
//! # Examples
//!
//! ```
//! use millrace::Error;
//!
//! let err = Error::coded(42, "quota exceeded");
//! assert_eq!(err.code(), 42);
//! assert_eq!(err, Error::coded(42, "a different message"));
//!
//! let io = Error::from_exception(std::io::Error::other("disk full"));
//! assert!(io.is_exception::<std::io::Error>());
//! assert_eq!(io.message(), "disk full");
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::semigroup::Semigroup;

/// Well-known error codes produced by the runtime itself.
pub mod codes {
    /// The environment's cancellation token was tripped.
    pub const CANCELLED: i32 = -2_000_000_000;
    /// A `Bottom` outcome was forced into a `Result`.
    pub const BOTTOM: i32 = -2_000_000_001;
    /// An `Aff` did not finish within its timeout.
    pub const TIMED_OUT: i32 = -2_000_000_002;
    /// The synchronous interpreter reached an asynchronous step.
    pub const ASYNC_IN_SYNC: i32 = -2_000_000_003;
    /// Code reported by aggregate errors.
    pub const MANY: i32 = -2_000_000_004;
}

/// An error raised by an effect, a pipeline, or a user delegate.
#[derive(Debug, Clone)]
pub enum Error {
    /// A wrapped `std::error::Error` or caught panic.
    Exceptional(Exceptional),
    /// A coded message.
    Coded {
        /// Numeric code; `0` means "no code".
        code: i32,
        /// Human readable description.
        message: String,
    },
    /// Several errors collected together.
    Many(Vec<Error>),
}

/// A shared handle to an underlying `std::error::Error`.
///
/// Cloning an `Exceptional` shares the same underlying value, so the original
/// error survives any number of clones and can be downcast at the boundary.
#[derive(Debug, Clone)]
pub struct Exceptional {
    code: i32,
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Exceptional {
    /// Wrap an error value.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Exceptional {
            code: 0,
            inner: Arc::new(error),
        }
    }

    /// Attach a code to the wrapped error.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// The attached code, `0` when none was given.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Borrow the wrapped error.
    pub fn get(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Returns true when the wrapped error is a `T`.
    pub fn is<T: StdError + 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Downcast the wrapped error.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

/// A panic raised inside a user delegate, captured at a `run` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panic {
    message: String,
}

impl Panic {
    /// The panic message, or a placeholder for non-string payloads.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Panic {}

impl Error {
    /// A message without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Error::Coded {
            code: 0,
            message: message.into(),
        }
    }

    /// A message with a code.
    pub fn coded(code: i32, message: impl Into<String>) -> Self {
        Error::Coded {
            code,
            message: message.into(),
        }
    }

    /// Wrap a `std::error::Error`, keeping the original for downcasting.
    pub fn from_exception<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Exceptional(Exceptional::new(error))
    }

    /// Aggregate several errors. Nested aggregates are flattened.
    pub fn many(errors: impl IntoIterator<Item = Error>) -> Self {
        let mut flat = Vec::new();
        for error in errors {
            match error {
                Error::Many(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Error::Many(flat)
    }

    /// The error produced when an environment is cancelled.
    pub fn cancelled() -> Self {
        Error::coded(codes::CANCELLED, "cancelled")
    }

    /// The error standing in for a `Bottom` outcome.
    pub fn bottom() -> Self {
        Error::coded(codes::BOTTOM, "bottom")
    }

    /// The error produced when an `Aff` exceeds its timeout.
    pub fn timed_out() -> Self {
        Error::coded(codes::TIMED_OUT, "timed out")
    }

    pub(crate) fn async_in_sync() -> Self {
        Error::coded(
            codes::ASYNC_IN_SYNC,
            "asynchronous step reached by the synchronous interpreter; use run_effect_async",
        )
    }

    /// Convert a panic payload into an error.
    ///
    /// Payloads raised by [`Error::throw`] come back as the identical error.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Error>() {
            Ok(error) => return *error,
            Err(payload) => payload,
        };
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };
        Error::Exceptional(Exceptional::new(Panic { message }))
    }

    /// Raise this error as a panic.
    ///
    /// The nearest `run` boundary catches it and restores this exact error.
    pub fn throw(self) -> ! {
        std::panic::resume_unwind(Box::new(self))
    }

    /// The error code, `0` when there is none.
    pub fn code(&self) -> i32 {
        match self {
            Error::Exceptional(e) => e.code(),
            Error::Coded { code, .. } => *code,
            Error::Many(_) => codes::MANY,
        }
    }

    /// The error message.
    pub fn message(&self) -> String {
        match self {
            Error::Exceptional(e) => e.get().to_string(),
            Error::Coded { message, .. } => message.clone(),
            Error::Many(errors) => errors
                .iter()
                .map(Error::message)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// The wrapped exception, if this is an `Exceptional` error.
    pub fn exception(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Error::Exceptional(e) => Some(e.get()),
            _ => None,
        }
    }

    /// Returns true when this error (or any aggregated error) wraps a `T`.
    pub fn is_exception<T: StdError + 'static>(&self) -> bool {
        match self {
            Error::Exceptional(e) => e.is::<T>(),
            Error::Coded { .. } => false,
            Error::Many(errors) => errors.iter().any(Error::is_exception::<T>),
        }
    }

    /// Downcast the wrapped exception.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        match self {
            Error::Exceptional(e) => e.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns true when this error, or any aggregated error, has `code`.
    pub fn has_code(&self, code: i32) -> bool {
        match self {
            Error::Many(errors) => code == codes::MANY || errors.iter().any(|e| e.has_code(code)),
            other => other.code() == code,
        }
    }

    /// Returns true for the cancellation error.
    pub fn is_cancelled(&self) -> bool {
        self.has_code(codes::CANCELLED)
    }

    /// Returns true when this error was raised by a panic.
    pub fn is_panic(&self) -> bool {
        self.is_exception::<Panic>()
    }

    /// Flatten into the list of underlying errors.
    pub fn into_errors(self) -> Vec<Error> {
        match self {
            Error::Many(errors) => errors,
            other => vec![other],
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Many(a), Error::Many(b)) => a == b,
            (Error::Many(_), _) | (_, Error::Many(_)) => false,
            _ => {
                if self.code() != 0 || other.code() != 0 {
                    self.code() == other.code()
                } else {
                    self.message() == other.message()
                }
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Exceptional(e) => write!(f, "{}", e.get()),
            Error::Coded { code: 0, message } => write!(f, "{}", message),
            Error::Coded { code, message } => write!(f, "[{}] {}", code, message),
            Error::Many(errors) => {
                write!(f, "{} errors: ", errors.len())?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Exceptional(e) => Some(e.get()),
            Error::Coded { .. } => None,
            Error::Many(errors) => errors.first().map(|e| e as &(dyn StdError + 'static)),
        }
    }
}

impl Semigroup for Error {
    fn combine(self, other: Self) -> Self {
        Error::many([self, other])
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::new(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::new(message)
    }
}

impl From<Exceptional> for Error {
    fn from(e: Exceptional) -> Self {
        Error::Exceptional(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct InvalidOperation(&'static str);

    impl fmt::Display for InvalidOperation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for InvalidOperation {}

    #[test]
    fn test_coded_equality_ignores_message() {
        assert_eq!(Error::coded(42, "x"), Error::coded(42, "y"));
        assert_ne!(Error::coded(42, "x"), Error::coded(43, "x"));
    }

    #[test]
    fn test_uncoded_equality_uses_message() {
        assert_eq!(Error::new("boom"), Error::new("boom"));
        assert_ne!(Error::new("boom"), Error::new("bang"));
        assert_ne!(Error::new("boom"), Error::coded(1, "boom"));
    }

    #[test]
    fn test_exception_is_preserved() {
        let err = Error::from_exception(InvalidOperation("x"));
        assert!(err.is_exception::<InvalidOperation>());
        assert!(!err.is_exception::<std::io::Error>());
        assert_eq!(err.downcast_ref::<InvalidOperation>().map(|e| e.0), Some("x"));
        assert_eq!(err.message(), "x");
        assert_eq!(err.code(), 0);
    }

    #[test]
    fn test_exception_clones_share_original() {
        let err = Error::from_exception(InvalidOperation("shared"));
        let cloned = err.clone();
        let a = err.exception().map(|e| e as *const _ as *const u8);
        let b = cloned.exception().map(|e| e as *const _ as *const u8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_panic_payload_string() {
        let payload: Box<dyn Any + Send> = Box::new("kaboom");
        let err = Error::from_panic(payload);
        assert!(err.is_panic());
        assert_eq!(err.message(), "kaboom");
    }

    #[test]
    fn test_throw_round_trips() {
        let original = Error::coded(7, "thrown");
        let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| original.clone().throw())).unwrap_err();
        let restored = Error::from_panic(payload);
        assert_eq!(restored, original);
        assert_eq!(restored.message(), "thrown");
    }

    #[test]
    fn test_many_flattens_and_matches() {
        let err = Error::coded(1, "a")
            .combine(Error::coded(2, "b"))
            .combine(Error::new("c"));
        assert_eq!(err.clone().into_errors().len(), 3);
        assert!(err.has_code(2));
        assert!(!err.has_code(3));
        assert_eq!(err.message(), "a; b; c");
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::new("plain").to_string(), "plain");
        assert_eq!(Error::coded(5, "five").to_string(), "[5] five");
        let many = Error::many([Error::new("a"), Error::new("b")]);
        assert_eq!(many.to_string(), "2 errors: a; b");
    }

    #[test]
    fn test_cancelled() {
        assert!(Error::cancelled().is_cancelled());
        assert!(!Error::timed_out().is_cancelled());
    }
}
