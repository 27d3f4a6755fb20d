//! Testing utilities
//!
//! Assertion macros for [`Fin`](crate::Fin) outcomes and a [`Probe`] that counts
//! resource releases.
//!
//! ```rust
//! use millrace::{assert_bottom, assert_fail, assert_succ, Eff};
//!
//! assert_succ!(Eff::<i32>::pure(42).run_standalone(), 42);
//! assert_fail!(Eff::<i32>::fail("boom").run_standalone());
//! assert_bottom!(Eff::<i32>::bottom().run_standalone());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::resource::Release;

/// Assert that a `Fin` is `Succ`, optionally comparing the value.
#[macro_export]
macro_rules! assert_succ {
    ($fin:expr) => {
        match $fin {
            $crate::Fin::Succ(_) => {}
            other => panic!("expected Succ, got {:?}", other),
        }
    };
    ($fin:expr, $expected:expr) => {
        match $fin {
            $crate::Fin::Succ(value) => assert_eq!(value, $expected),
            other => panic!("expected Succ, got {:?}", other),
        }
    };
}

/// Assert that a `Fin` is `Fail`, optionally comparing the error.
#[macro_export]
macro_rules! assert_fail {
    ($fin:expr) => {
        match $fin {
            $crate::Fin::Fail(_) => {}
            other => panic!("expected Fail, got {:?}", other),
        }
    };
    ($fin:expr, $expected:expr) => {
        match $fin {
            $crate::Fin::Fail(error) => assert_eq!(error, $expected),
            other => panic!("expected Fail, got {:?}", other),
        }
    };
}

/// Assert that a `Fin` is `Bottom`.
#[macro_export]
macro_rules! assert_bottom {
    ($fin:expr) => {
        match $fin {
            $crate::Fin::Bottom => {}
            other => panic!("expected Bottom, got {:?}", other),
        }
    };
}

/// Counts acquisitions and releases of test resources.
///
/// ```rust
/// use millrace::resource::use_eff;
/// use millrace::testing::Probe;
/// use millrace::{Eff, Fin};
///
/// let probe = Probe::new();
/// let handle = probe.clone();
/// let eff: Eff<i32> = use_eff(Eff::lift(move || handle.acquire()), |_| Eff::pure(1));
///
/// assert_eq!(eff.run_standalone(), Fin::Succ(1));
/// assert_eq!(probe.released(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Probe {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl Probe {
    /// A probe with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a resource that reports its release back to this probe.
    pub fn acquire(&self) -> Probed {
        let id = self.acquired.fetch_add(1, Ordering::SeqCst);
        Probed {
            id,
            released: Arc::clone(&self.released),
        }
    }

    /// How many resources were acquired.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// How many resources were released.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// A resource handed out by a [`Probe`].
#[derive(Debug)]
pub struct Probed {
    id: usize,
    released: Arc<AtomicUsize>,
}

impl Probed {
    /// Acquisition order, starting at zero.
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Release for Probed {
    fn release(self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
