//! Predicates over [`Error`] values, used to select which failures a catch or
//! retry applies to.

use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;

use super::Predicate;
use crate::Error;

/// Matches errors carrying a specific code.
#[derive(Clone, Copy, Debug)]
pub struct HasCode(i32);

impl Predicate<Error> for HasCode {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.has_code(self.0)
    }
}

/// Matches errors carrying `code` (searching inside aggregates).
pub fn has_code(code: i32) -> HasCode {
    HasCode(code)
}

/// Matches errors with an exact message.
#[derive(Clone, Debug)]
pub struct HasMessage(String);

impl Predicate<Error> for HasMessage {
    fn check(&self, error: &Error) -> bool {
        error.message() == self.0
    }
}

/// Matches errors whose message equals `message`.
pub fn has_message(message: impl Into<String>) -> HasMessage {
    HasMessage(message.into())
}

/// Matches errors wrapping an exception of type `T`.
pub struct IsException<T>(PhantomData<fn() -> T>);

impl<T> fmt::Debug for IsException<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IsException<{}>", std::any::type_name::<T>())
    }
}

impl<T> Clone for IsException<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IsException<T> {}

impl<T: StdError + 'static> Predicate<Error> for IsException<T> {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.is_exception::<T>()
    }
}

/// Matches errors wrapping an exception of type `T`.
pub fn is_exception<T: StdError + 'static>() -> IsException<T> {
    IsException(PhantomData)
}

/// Matches errors equal to a given error (code, else message).
#[derive(Clone, Debug)]
pub struct Is(Error);

impl Predicate<Error> for Is {
    fn check(&self, error: &Error) -> bool {
        *error == self.0
    }
}

/// Matches errors equal to `expected`.
pub fn is(expected: Error) -> Is {
    Is(expected)
}

/// Matches the cancellation error.
pub fn is_cancelled() -> HasCode {
    HasCode(crate::error::codes::CANCELLED)
}

/// Matches every error.
#[derive(Clone, Copy, Debug)]
pub struct AnyError;

impl Predicate<Error> for AnyError {
    #[inline]
    fn check(&self, _: &Error) -> bool {
        true
    }
}

/// Matches every error.
pub fn any_error() -> AnyError {
    AnyError
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateExt;

    #[test]
    fn test_has_code_searches_aggregates() {
        let many = Error::many([Error::coded(1, "a"), Error::coded(42, "b")]);
        assert!(has_code(42).check(&many));
        assert!(!has_code(7).check(&many));
    }

    #[test]
    fn test_has_message() {
        assert!(has_message("boom").check(&Error::new("boom")));
        assert!(!has_message("boom").check(&Error::new("bang")));
    }

    #[test]
    fn test_is_exception() {
        let err = Error::from_exception(std::io::Error::other("disk"));
        assert!(is_exception::<std::io::Error>().check(&err));
        assert!(!is_exception::<std::fmt::Error>().check(&err));
    }

    #[test]
    fn test_composition() {
        let transient = has_code(503).or(is_cancelled()).and(any_error());
        assert!(transient.check(&Error::coded(503, "unavailable")));
        assert!(transient.check(&Error::cancelled()));
        assert!(!transient.check(&Error::new("fatal")));
        assert!(is(Error::coded(9, "x")).check(&Error::coded(9, "y")));
    }
}
