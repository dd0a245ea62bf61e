//! Uniform distributions
//!
//! Real-valued and integer uniform distributions over fixed bounds. Profiles
//! use these for jitter magnitudes, spike sizes and mode selection.

use super::{Distribution, RandomSource};
use std::sync::Arc;

/// Uniform real distribution over `[low, high)`
#[derive(Debug, Clone)]
pub struct UniformReal {
    random: Arc<RandomSource>,
    low: f64,
    high: f64,
}

impl UniformReal {
    /// Create a new uniform real distribution
    ///
    /// # Panics
    ///
    /// Panics if `high < low`.
    pub fn new(random: Arc<RandomSource>, low: f64, high: f64) -> Self {
        assert!(high >= low, "Upper bound must not be below lower bound");
        Self { random, low, high }
    }
}

impl Distribution for UniformReal {
    type Value = f64;

    #[inline]
    fn sample(&self) -> f64 {
        self.random.next_uniform_real(self.low, self.high)
    }
}

/// Uniform integer distribution over `[low, high]`, both ends inclusive
#[derive(Debug, Clone)]
pub struct UniformInt {
    random: Arc<RandomSource>,
    low: i64,
    high: i64,
}

impl UniformInt {
    /// Create a new uniform integer distribution
    ///
    /// # Panics
    ///
    /// Panics if `high < low`.
    pub fn new(random: Arc<RandomSource>, low: i64, high: i64) -> Self {
        assert!(high >= low, "Upper bound must not be below lower bound");
        Self { random, low, high }
    }

    /// Lower bound (inclusive)
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Upper bound (inclusive)
    pub fn high(&self) -> i64 {
        self.high
    }
}

impl Distribution for UniformInt {
    type Value = i64;

    #[inline]
    fn sample(&self) -> i64 {
        self.random.next_uniform_int(self.low, self.high)
    }
}
