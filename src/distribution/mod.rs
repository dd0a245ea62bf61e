//! Random distribution implementations
//!
//! This module provides the numeric generators that latency profiles draw
//! their delays from. Every distribution is built on a single shared
//! [`RandomSource`], so all profiles consume one interleaved draw sequence.
//!
//! # Distributions
//!
//! - **UniformReal**: continuous values in `[low, high)`
//! - **UniformInt**: integers in `[low, high]` (both ends inclusive)
//! - **TruncatedNormal**: normal deviates with negative samples clamped to zero
//!
//! # Example
//!
//! ```
//! use bmstub::distribution::{Distribution, RandomSource, gaussian::TruncatedNormal};
//! use std::sync::Arc;
//!
//! let random = Arc::new(RandomSource::with_seed(42));
//! let dist = TruncatedNormal::new(Arc::clone(&random), 100.0, 25.0);
//! assert!(dist.sample() >= 0.0);
//! ```

pub mod gaussian;
pub mod random;
pub mod uniform;

pub use random::RandomSource;

/// Distribution trait for delay generation
///
/// Implementations hold a handle to the shared [`RandomSource`] and take `&self`
/// so one instance can be sampled concurrently from every worker thread.
///
/// # Thread Safety
///
/// Distributions must be `Send + Sync`. Serialization of the underlying
/// generator is the responsibility of [`RandomSource`], not of the distribution.
pub trait Distribution: Send + Sync {
    /// Type of the sampled value
    type Value;

    /// Draw the next value
    fn sample(&self) -> Self::Value;
}
