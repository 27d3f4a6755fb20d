use std::fmt;

use super::Release;

/// Owns a handle and releases it exactly once.
///
/// The handle is released either by an explicit [`Guard::release`] or, failing
/// that, when the guard is dropped: on unwinding, when an async body is
/// cancelled, or when an interpreter abandons the pipeline holding it.
pub struct Guard<H: Release> {
    handle: Option<H>,
}

impl<H: Release> Guard<H> {
    /// Take ownership of `handle`.
    pub fn new(handle: H) -> Self {
        Guard {
            handle: Some(handle),
        }
    }

    /// Borrow the guarded handle.
    pub fn get(&self) -> &H {
        match &self.handle {
            Some(handle) => handle,
            // only `release` and `drop` take the handle, and both consume the guard
            None => unreachable!("guard handle already released"),
        }
    }

    /// Release the handle now.
    pub fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            dispose(handle, "scope finished");
        }
    }
}

impl<H: Release> Drop for Guard<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            dispose(handle, "guard dropped");
        }
    }
}

impl<H: Release + fmt::Debug> fmt::Debug for Guard<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("handle", &self.handle).finish()
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn dispose<H: Release>(handle: H, reason: &'static str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(reason, resource = std::any::type_name::<H>(), "releasing resource");
    handle.release();
}
