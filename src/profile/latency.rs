//! Latency profile implementations
//!
//! Profiles compose by wrapping: WarmUp, Unstable and LongTail each own a
//! [`Stable`] and always take its delay first, then add their own jitter.
//! The set of behaviours is closed, so [`LatencyProfile`] is an enum and
//! dispatch is a `match`.
//!
//! All delays are whole milliseconds. Every component (base normal, jitter,
//! spike) is truncated to an integer before being added.

use super::ProfileKind;
use crate::config::ProfileConfig;
use crate::distribution::gaussian::TruncatedNormal;
use crate::distribution::uniform::{UniformInt, UniformReal};
use crate::distribution::{Distribution, RandomSource};
use crate::worker::RequestIndex;
use std::sync::Arc;
use std::time::Duration;

/// Fixed delay
#[derive(Debug, Clone)]
pub struct Constant {
    delay_ms: u64,
}

impl Constant {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

/// Truncated normal around a mean
///
/// Used directly for the Stable and StableVariable profiles, and as the base
/// of every wrapping profile.
#[derive(Debug, Clone)]
pub struct Stable {
    dist: TruncatedNormal,
}

impl Stable {
    pub fn new(random: Arc<RandomSource>, mean_ms: f64, std_dev_ms: f64) -> Self {
        Self {
            dist: TruncatedNormal::new(random, mean_ms, std_dev_ms),
        }
    }

    pub fn delay_ms(&self) -> u64 {
        // Saturating float-to-int cast; the sample is already >= 0.
        self.dist.sample() as u64
    }
}

/// Stable plus jitter that shrinks linearly to zero at the stability point
#[derive(Debug, Clone)]
pub struct WarmUp {
    base: Stable,
    random: Arc<RandomSource>,
    stability_point: u64,
    avg_ms: u64,
}

impl WarmUp {
    /// # Panics
    ///
    /// Panics if `stability_point` is zero.
    pub fn new(base: Stable, random: Arc<RandomSource>, stability_point: u64, avg_ms: u64) -> Self {
        assert!(stability_point > 0, "Stability point must be positive");
        Self {
            base,
            random,
            stability_point,
            avg_ms,
        }
    }

    /// Exclusive upper bound of the extra jitter for `index`
    ///
    /// `round((stability_point - r) / stability_point * avg * 2)` before the
    /// stability point, 0 from then on.
    pub fn spread(&self, index: RequestIndex) -> u64 {
        let r = index.get();
        if r >= self.stability_point {
            return 0;
        }
        let remaining = (self.stability_point - r) as f64 / self.stability_point as f64;
        (remaining * self.avg_ms as f64 * 2.0).round() as u64
    }

    /// Extra jitter drawn from `[0, spread)`; zero when the range is empty
    pub fn jitter_ms(&self, index: RequestIndex) -> u64 {
        uniform_below(&self.random, self.spread(index))
    }

    pub fn delay_ms(&self, index: RequestIndex) -> u64 {
        let base = self.base.delay_ms();
        base.saturating_add(self.jitter_ms(index))
    }
}

/// Stable plus jitter whose bound grows with the request index
#[derive(Debug, Clone)]
pub struct Unstable {
    base: Stable,
    random: Arc<RandomSource>,
    instability_rate: u64,
}

impl Unstable {
    /// # Panics
    ///
    /// Panics if `instability_rate` is zero.
    pub fn new(base: Stable, random: Arc<RandomSource>, instability_rate: u64) -> Self {
        assert!(instability_rate > 0, "Instability rate must be positive");
        Self {
            base,
            random,
            instability_rate,
        }
    }

    /// Exclusive upper bound of the extra jitter: `floor(r / instability_rate)`
    pub fn spread(&self, index: RequestIndex) -> u64 {
        index.get() / self.instability_rate
    }

    /// Extra jitter drawn from `[0, spread)`; zero for the first
    /// `instability_rate` requests
    pub fn jitter_ms(&self, index: RequestIndex) -> u64 {
        uniform_below(&self.random, self.spread(index))
    }

    pub fn delay_ms(&self, index: RequestIndex) -> u64 {
        let base = self.base.delay_ms();
        base.saturating_add(self.jitter_ms(index))
    }
}

/// Stable plus rare spikes, independent of the request index
#[derive(Debug, Clone)]
pub struct LongTail {
    base: Stable,
    when: UniformReal,
    size: UniformInt,
    probability: f64,
}

impl LongTail {
    /// Spikes are drawn from `[max/2, max*3/2]` with the given per-request probability
    pub fn new(base: Stable, random: Arc<RandomSource>, max_ms: u64, probability: f64) -> Self {
        let max = i64::try_from(max_ms).unwrap_or(i64::MAX);
        Self {
            base,
            when: UniformReal::new(Arc::clone(&random), 0.0, 1.0),
            size: UniformInt::new(random, max / 2, max.saturating_mul(3) / 2),
            probability,
        }
    }

    /// Spike, if this request gets one
    pub fn spike_ms(&self) -> Option<u64> {
        if self.when.sample() < self.probability {
            Some(self.size.sample().max(0) as u64)
        } else {
            None
        }
    }

    pub fn delay_ms(&self) -> u64 {
        let base = self.base.delay_ms();
        base.saturating_add(self.spike_ms().unwrap_or(0))
    }
}

/// One of two truncated normals, chosen uniformly per request
#[derive(Debug, Clone)]
pub struct Bimodal {
    modes: [TruncatedNormal; 2],
    choice: UniformInt,
}

impl Bimodal {
    /// Modes at `avg + shift` and `avg - shift`, each with sd = avg/5
    pub fn new(random: Arc<RandomSource>, avg_ms: u64, shift_ms: u64) -> Self {
        let avg = avg_ms as f64;
        let shift = shift_ms as f64;
        let std_dev = avg / 5.0;
        Self {
            modes: [
                TruncatedNormal::new(Arc::clone(&random), avg + shift, std_dev),
                TruncatedNormal::new(Arc::clone(&random), avg - shift, std_dev),
            ],
            choice: UniformInt::new(random, 0, 1),
        }
    }

    pub fn modes(&self) -> &[TruncatedNormal; 2] {
        &self.modes
    }

    pub fn delay_ms(&self) -> u64 {
        let mode = &self.modes[self.choice.sample() as usize];
        mode.sample() as u64
    }
}

/// A latency profile: one case per behaviour
#[derive(Debug, Clone)]
pub enum LatencyProfile {
    Constant(Constant),
    Stable(Stable),
    StableVariable(Stable),
    WarmUp(WarmUp),
    Unstable(Unstable),
    LongTail(LongTail),
    Bimodal(Bimodal),
}

impl LatencyProfile {
    /// Build the profile for `kind` from configuration
    ///
    /// Every profile shares `random`, so all of them draw from one sequence.
    pub fn from_config(kind: ProfileKind, config: &ProfileConfig, random: &Arc<RandomSource>) -> Self {
        let avg = config.avg_ms as f64;
        let stable = || Stable::new(Arc::clone(random), avg, avg / 4.0);

        match kind {
            ProfileKind::Constant => LatencyProfile::Constant(Constant::new(config.avg_ms)),
            ProfileKind::Stable => LatencyProfile::Stable(stable()),
            ProfileKind::StableVariable => {
                LatencyProfile::StableVariable(Stable::new(Arc::clone(random), avg, avg / 2.0))
            }
            ProfileKind::WarmUp => LatencyProfile::WarmUp(WarmUp::new(
                stable(),
                Arc::clone(random),
                config.warmup.stability_point,
                config.avg_ms,
            )),
            ProfileKind::Unstable => LatencyProfile::Unstable(Unstable::new(
                stable(),
                Arc::clone(random),
                config.unstable.instability_rate,
            )),
            ProfileKind::LongTail => LatencyProfile::LongTail(LongTail::new(
                stable(),
                Arc::clone(random),
                config.long_tail.max_ms,
                config.long_tail.probability,
            )),
            ProfileKind::Bimodal => LatencyProfile::Bimodal(Bimodal::new(
                Arc::clone(random),
                config.avg_ms,
                config.bimodal.shift_ms,
            )),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            LatencyProfile::Constant(_) => ProfileKind::Constant,
            LatencyProfile::Stable(_) => ProfileKind::Stable,
            LatencyProfile::StableVariable(_) => ProfileKind::StableVariable,
            LatencyProfile::WarmUp(_) => ProfileKind::WarmUp,
            LatencyProfile::Unstable(_) => ProfileKind::Unstable,
            LatencyProfile::LongTail(_) => ProfileKind::LongTail,
            LatencyProfile::Bimodal(_) => ProfileKind::Bimodal,
        }
    }

    /// Delay in milliseconds for the request with the given index
    pub fn delay_ms(&self, index: RequestIndex) -> u64 {
        match self {
            LatencyProfile::Constant(p) => p.delay_ms(),
            LatencyProfile::Stable(p) | LatencyProfile::StableVariable(p) => p.delay_ms(),
            LatencyProfile::WarmUp(p) => p.delay_ms(index),
            LatencyProfile::Unstable(p) => p.delay_ms(index),
            LatencyProfile::LongTail(p) => p.delay_ms(),
            LatencyProfile::Bimodal(p) => p.delay_ms(),
        }
    }

    /// Delay for the request with the given index
    pub fn delay(&self, index: RequestIndex) -> Duration {
        Duration::from_millis(self.delay_ms(index))
    }
}

/// Uniform integer in `[0, bound)`, or 0 when the range is empty
fn uniform_below(random: &RandomSource, bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let high = i64::try_from(bound - 1).unwrap_or(i64::MAX);
    random.next_uniform_int(0, high) as u64
}
