//! Truncated normal distribution
//!
//! The base "typical latency" shape used by most profiles. A normal deviate is
//! drawn and, if negative, replaced by zero. This is a post-hoc clamp: the mass
//! below zero is moved onto zero rather than redistributed, so the result is
//! not a renormalized truncated normal.
//!
//! # Example
//!
//! ```
//! use bmstub::distribution::{Distribution, RandomSource, gaussian::TruncatedNormal};
//! use std::sync::Arc;
//!
//! // Mean 50, stddev 100: plenty of draws land below zero and come back as 0
//! let dist = TruncatedNormal::new(Arc::new(RandomSource::with_seed(1)), 50.0, 100.0);
//! assert!((0..100).all(|_| dist.sample() >= 0.0));
//! ```

use super::{Distribution, RandomSource};
use std::sync::Arc;

/// Normal distribution clamped at zero
#[derive(Debug, Clone)]
pub struct TruncatedNormal {
    random: Arc<RandomSource>,
    mean: f64,
    std_dev: f64,
}

impl TruncatedNormal {
    /// Create a new truncated normal distribution
    ///
    /// # Panics
    ///
    /// Panics if `std_dev` is negative or not finite.
    pub fn new(random: Arc<RandomSource>, mean: f64, std_dev: f64) -> Self {
        assert!(
            std_dev.is_finite() && std_dev >= 0.0,
            "Standard deviation must be finite and non-negative"
        );
        Self { random, mean, std_dev }
    }

    /// Mean of the underlying (unclamped) normal
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation of the underlying (unclamped) normal
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl Distribution for TruncatedNormal {
    type Value = f64;

    fn sample(&self) -> f64 {
        let s = self.random.next_normal(self.mean, self.std_dev);
        if s < 0.0 {
            0.0
        } else {
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments(samples: &[f64]) -> (f64, f64) {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_never_negative() {
        let dist = TruncatedNormal::new(Arc::new(RandomSource::with_seed(9)), 0.0, 50.0);
        for _ in 0..10_000 {
            assert!(dist.sample() >= 0.0);
        }
    }

    #[test]
    fn test_clamp_moves_mass_to_zero() {
        // With mean 0, half the draws fall below zero and must come back as exactly 0
        let dist = TruncatedNormal::new(Arc::new(RandomSource::with_seed(9)), 0.0, 10.0);
        let n = 20_000;
        let zeros = (0..n).filter(|_| dist.sample() == 0.0).count();
        let fraction = zeros as f64 / n as f64;
        assert!((fraction - 0.5).abs() < 0.02, "zero fraction={}", fraction);
    }

    #[test]
    fn test_far_from_zero_matches_normal() {
        let dist = TruncatedNormal::new(Arc::new(RandomSource::with_seed(42)), 100.0, 25.0);
        let samples: Vec<f64> = (0..20_000).map(|_| dist.sample()).collect();
        let (mean, sd) = moments(&samples);

        assert!((mean - 100.0).abs() < 1.0, "mean={}", mean);
        assert!((sd - 25.0).abs() < 1.0, "sd={}", sd);
    }

    #[test]
    fn test_zero_std_dev_is_constant() {
        let dist = TruncatedNormal::new(Arc::new(RandomSource::with_seed(1)), 40.0, 0.0);
        assert_eq!(dist.sample(), 40.0);
        assert_eq!(dist.mean(), 40.0);
        assert_eq!(dist.std_dev(), 0.0);
    }

    #[test]
    #[should_panic(expected = "Standard deviation must be finite and non-negative")]
    fn test_invalid_std_dev() {
        let _ = TruncatedNormal::new(Arc::new(RandomSource::with_seed(1)), 40.0, -1.0);
    }
}
