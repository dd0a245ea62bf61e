//! Delay histogram using HdrHistogram
//!
//! Records sampled delays in whole milliseconds, from 0 up to one hour, with
//! 3 significant digits of precision.
//!
//! # Example
//!
//! ```
//! use bmstub::stats::histogram::DelayHistogram;
//! use std::time::Duration;
//!
//! let mut hist = DelayHistogram::new();
//! hist.record(Duration::from_millis(100));
//! hist.record(Duration::from_millis(150));
//!
//! assert_eq!(hist.len(), 2);
//! assert!(hist.percentile(50.0).is_some());
//! ```

use hdrhistogram::Histogram;
use std::time::Duration;

/// Highest trackable delay: one hour in milliseconds
const MAX_DELAY_MS: u64 = 3_600_000;

/// Millisecond delay histogram
#[derive(Debug, Clone)]
pub struct DelayHistogram {
    histogram: Histogram<u64>,
}

impl DelayHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        let histogram = Histogram::new_with_max(MAX_DELAY_MS, 3)
            .expect("Failed to create histogram with valid bounds");

        Self { histogram }
    }

    /// Record a delay, clamped to one hour
    #[inline]
    pub fn record(&mut self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(millis.min(MAX_DELAY_MS));
    }

    /// Delay at `percentile` (0.0 - 100.0), or `None` if empty
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_millis(self.histogram.value_at_percentile(percentile)))
    }

    /// Largest recorded delay, or `None` if empty
    pub fn max(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_millis(self.histogram.max()))
    }

    /// Mean delay in milliseconds, or `None` if empty
    pub fn mean_ms(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.histogram.mean())
    }

    /// Number of recorded samples
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}

impl Default for DelayHistogram {
    fn default() -> Self {
        Self::new()
    }
}
