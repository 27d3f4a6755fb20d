//! Randomized delay adjustment.

use std::time::Duration;

/// Strategy for adding randomness to delays.
///
/// Randomness requires the `jitter` feature; without it every strategy returns
/// the base delay unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    ///
    /// A non-finite factor, or one large enough to overflow the range, leaves
    /// the delay unchanged.
    Proportional(f64),
    /// Random delay between 0 and calculated delay (AWS recommended).
    Full,
    /// Decorrelated jitter (AWS style).
    Decorrelated,
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    ///
    /// `prev_delay` is the previous jittered delay, used by decorrelated jitter.
    pub fn apply(
        &self,
        base_delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev_delay: Option<Duration>,
    ) -> Duration {
        match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let base_millis = base_delay.as_millis() as f64;
                let jitter_range = base_millis * factor.abs();
                let min = (base_millis - jitter_range).max(0.0);
                let max = base_millis + jitter_range;
                if !max.is_finite() || max <= min {
                    return base_delay;
                }
                Duration::from_millis(rand::rng().random_range(min..=max) as u64)
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_millis = base_delay.as_millis() as u64;
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Decorrelated => {
                use rand::Rng;
                let prev = prev_delay.unwrap_or(base_delay);
                let base_millis = base_delay.as_millis() as u64;
                let max_millis = prev.as_millis().saturating_mul(3) as u64;
                if max_millis <= base_millis {
                    base_delay
                } else {
                    Duration::from_millis(rand::rng().random_range(base_millis..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Decorrelated => base_delay,
        }
    }
}
