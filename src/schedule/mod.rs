//! Schedules: lazy descriptions of "run again, after waiting this long"
//!
//! A [`Schedule`] is pure data. It describes a (possibly infinite) sequence of
//! delays; the fold, repeat and retry loops in [`eff`](crate::eff) and
//! [`aff`](crate::aff) consult it after every iteration. Each call to
//! [`Schedule::decisions`] starts the sequence from the beginning, so one schedule
//! value can drive any number of loops.
//!
//! # Examples
//!
//! ```rust
//! use millrace::schedule::{Decision, Schedule};
//! use std::time::Duration;
//!
//! // 10ms, 20ms, 40ms, then capped at 50ms, five retries in total
//! let schedule = Schedule::exponential(Duration::from_millis(10))
//!     .max_delay(Duration::from_millis(50))
//!     .take(5);
//!
//! let delays: Vec<_> = schedule.decisions().collect();
//! assert_eq!(
//!     delays,
//!     [10, 20, 40, 50, 50].map(Duration::from_millis).to_vec()
//! );
//!
//! // union continues while either side does and picks the shorter delay
//! let both = Schedule::spaced(Duration::from_secs(1)).take(2) | Schedule::recurs(3);
//! assert_eq!(both.decisions().count(), 3);
//!
//! let mut once = Schedule::once().decisions();
//! assert_eq!(once.decide(), Decision::Delay(Duration::ZERO));
//! assert_eq!(once.decide(), Decision::Done);
//! ```

mod jitter;

use std::fmt;
use std::iter;
use std::ops::{BitAnd, BitOr};
use std::time::Duration;

pub use jitter::JitterStrategy;

/// A description of when to run again.
///
/// Build schedules with the constructors and combinators below. The variants
/// are public so schedules can be inspected and (with the `serde` feature)
/// loaded from configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Schedule {
    /// Run again immediately, forever.
    Forever,
    /// Never run again.
    Never,
    /// Run again immediately, `n` times.
    Recurs(u32),
    /// Run again after a fixed delay, forever.
    Spaced(Duration),
    /// Delay grows linearly: base * (n + 1).
    Linear(Duration),
    /// Delay doubles: base * 2^n.
    Exponential(Duration),
    /// Delay follows the Fibonacci sequence: base * fib(n + 1).
    Fibonacci(Duration),
    /// Continue while either continues, using the shorter delay.
    Union(Box<Schedule>, Box<Schedule>),
    /// Continue while both continue, using the longer delay.
    Intersect(Box<Schedule>, Box<Schedule>),
    /// Run the first schedule to completion, then the second.
    Append(Box<Schedule>, Box<Schedule>),
    /// At most `n` decisions.
    Take(Box<Schedule>, u32),
    /// The schedule played `n` times back to back.
    Repeat(Box<Schedule>, u32),
    /// Cap every delay.
    MaxDelay(Box<Schedule>, Duration),
    /// Stop once the total delay would exceed the bound.
    MaxCumulativeDelay(Box<Schedule>, Duration),
    /// Randomize each delay.
    Jitter(Box<Schedule>, JitterStrategy),
}

/// One step of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Wait this long, then run again.
    Delay(Duration),
    /// Stop.
    Done,
}

impl Schedule {
    /// Run again immediately, forever.
    pub fn forever() -> Self {
        Schedule::Forever
    }

    /// Never run again.
    pub fn never() -> Self {
        Schedule::Never
    }

    /// Run again exactly once.
    pub fn once() -> Self {
        Schedule::Recurs(1)
    }

    /// Run again immediately, `n` times.
    pub fn recurs(n: u32) -> Self {
        Schedule::Recurs(n)
    }

    /// Fixed delay between runs.
    pub fn spaced(delay: Duration) -> Self {
        Schedule::Spaced(delay)
    }

    /// Linear backoff.
    pub fn linear(base: Duration) -> Self {
        Schedule::Linear(base)
    }

    /// Exponential backoff.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millrace::Schedule;
    /// use std::time::Duration;
    ///
    /// let delays: Vec<_> = Schedule::exponential(Duration::from_millis(100))
    ///     .take(3)
    ///     .decisions()
    ///     .collect();
    /// assert_eq!(delays, [100, 200, 400].map(Duration::from_millis).to_vec());
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Schedule::Exponential(base)
    }

    /// Fibonacci backoff.
    pub fn fibonacci(base: Duration) -> Self {
        Schedule::Fibonacci(base)
    }

    /// Continue while either schedule continues, with the shorter delay.
    pub fn union(self, other: Schedule) -> Self {
        Schedule::Union(Box::new(self), Box::new(other))
    }

    /// Continue while both schedules continue, with the longer delay.
    pub fn intersect(self, other: Schedule) -> Self {
        Schedule::Intersect(Box::new(self), Box::new(other))
    }

    /// Run this schedule to completion, then `next`.
    pub fn then(self, next: Schedule) -> Self {
        Schedule::Append(Box::new(self), Box::new(next))
    }

    /// Limit to `n` decisions.
    pub fn take(self, n: u32) -> Self {
        Schedule::Take(Box::new(self), n)
    }

    /// Play this schedule `n` times back to back.
    pub fn repeat(self, n: u32) -> Self {
        Schedule::Repeat(Box::new(self), n)
    }

    /// Cap every delay at `max`.
    pub fn max_delay(self, max: Duration) -> Self {
        Schedule::MaxDelay(Box::new(self), max)
    }

    /// Stop once the sum of delays would exceed `max`.
    pub fn max_cumulative_delay(self, max: Duration) -> Self {
        Schedule::MaxCumulativeDelay(Box::new(self), max)
    }

    /// Add ±`factor` proportional jitter.
    pub fn with_jitter(self, factor: f64) -> Self {
        Schedule::Jitter(Box::new(self), JitterStrategy::Proportional(factor))
    }

    /// Replace each delay with a random one between zero and the delay.
    pub fn with_full_jitter(self) -> Self {
        Schedule::Jitter(Box::new(self), JitterStrategy::Full)
    }

    /// AWS-style decorrelated jitter.
    pub fn with_decorrelated_jitter(self) -> Self {
        Schedule::Jitter(Box::new(self), JitterStrategy::Decorrelated)
    }

    /// Start the sequence of decisions from the beginning.
    pub fn decisions(&self) -> Decisions {
        Decisions {
            inner: self.delays().fuse(),
        }
    }

    fn delays(&self) -> Delays {
        match self {
            Schedule::Forever => Box::new(iter::repeat(Duration::ZERO)),
            Schedule::Never => Box::new(iter::empty()),
            Schedule::Recurs(n) => Box::new(iter::repeat(Duration::ZERO).take(*n as usize)),
            Schedule::Spaced(d) => Box::new(iter::repeat(*d)),
            Schedule::Linear(base) => {
                let base = *base;
                Box::new((0u32..).map(move |n| base.saturating_mul(n.saturating_add(1))))
            }
            Schedule::Exponential(base) => {
                let base = *base;
                Box::new((0u32..).map(move |n| base.saturating_mul(2u32.saturating_pow(n))))
            }
            Schedule::Fibonacci(base) => {
                let base = *base;
                Box::new((0u32..).map(move |n| base.saturating_mul(fibonacci(n.saturating_add(1)))))
            }
            Schedule::Union(a, b) => {
                let mut a = a.delays().fuse();
                let mut b = b.delays().fuse();
                Box::new(iter::from_fn(move || match (a.next(), b.next()) {
                    (Some(x), Some(y)) => Some(x.min(y)),
                    (Some(x), None) | (None, Some(x)) => Some(x),
                    (None, None) => None,
                }))
            }
            Schedule::Intersect(a, b) => Box::new(a.delays().zip(b.delays()).map(|(x, y)| x.max(y))),
            Schedule::Append(a, b) => Box::new(a.delays().chain(b.delays())),
            Schedule::Take(s, n) => Box::new(s.delays().take(*n as usize)),
            Schedule::Repeat(s, n) => {
                let s = (**s).clone();
                Box::new((0..*n).flat_map(move |_| s.delays()))
            }
            Schedule::MaxDelay(s, max) => {
                let max = *max;
                Box::new(s.delays().map(move |d| d.min(max)))
            }
            Schedule::MaxCumulativeDelay(s, max) => {
                let max = *max;
                let mut total = Duration::ZERO;
                Box::new(s.delays().take_while(move |d| {
                    total = total.saturating_add(*d);
                    total <= max
                }))
            }
            Schedule::Jitter(s, strategy) => {
                let strategy = strategy.clone();
                let mut prev = None;
                Box::new(s.delays().map(move |d| {
                    let jittered = strategy.apply(d, prev);
                    prev = Some(jittered);
                    jittered
                }))
            }
        }
    }
}

impl BitOr for Schedule {
    type Output = Schedule;

    fn bitor(self, rhs: Schedule) -> Schedule {
        self.union(rhs)
    }
}

impl BitAnd for Schedule {
    type Output = Schedule;

    fn bitand(self, rhs: Schedule) -> Schedule {
        self.intersect(rhs)
    }
}

type Delays = Box<dyn Iterator<Item = Duration> + Send>;

/// A running sequence of schedule decisions.
pub struct Decisions {
    inner: iter::Fuse<Delays>,
}

impl Decisions {
    /// The next decision. Once `Done`, always `Done`.
    pub fn decide(&mut self) -> Decision {
        match self.inner.next() {
            Some(delay) => Decision::Delay(delay),
            None => Decision::Done,
        }
    }
}

impl Iterator for Decisions {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.inner.next()
    }
}

impl fmt::Debug for Decisions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decisions").field("inner", &"<iterator>").finish()
    }
}

/// Calculate the nth Fibonacci number.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}

#[cfg(test)]
mod tests;
