//! Statistics collection
//!
//! Per-profile counters and sampled-delay histograms, fed by the dispatcher on
//! every completion and read by the `/stats` endpoint and the shutdown summary.

pub mod histogram;

use crate::profile::ProfileKind;
use histogram::DelayHistogram;
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Counters for a single profile
#[derive(Debug, Default)]
struct ProfileStats {
    requests: u64,
    interrupted: u64,
    sampled: DelayHistogram,
}

/// Statistics for every profile
#[derive(Debug)]
pub struct DelayStats {
    profiles: Vec<Mutex<ProfileStats>>,
}

impl DelayStats {
    pub fn new() -> Self {
        Self {
            profiles: ProfileKind::ALL.iter().map(|_| Mutex::default()).collect(),
        }
    }

    /// Record one completed request
    pub fn record(&self, kind: ProfileKind, sampled: Duration, interrupted: bool) {
        let mut stats = self.profiles[kind as usize]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        stats.requests += 1;
        if interrupted {
            stats.interrupted += 1;
        }
        stats.sampled.record(sampled);
    }

    /// Summary for one profile
    pub fn summary(&self, kind: ProfileKind) -> ProfileSummary {
        let stats = self.profiles[kind as usize]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let millis = |d: Duration| d.as_millis() as u64;

        ProfileSummary {
            profile: kind,
            path: kind.path(),
            requests: stats.requests,
            interrupted: stats.interrupted,
            mean_ms: stats.sampled.mean_ms(),
            p50_ms: stats.sampled.percentile(50.0).map(millis),
            p99_ms: stats.sampled.percentile(99.0).map(millis),
            max_ms: stats.sampled.max().map(millis),
        }
    }

    /// Summaries for every profile, in table order
    pub fn summaries(&self) -> Vec<ProfileSummary> {
        ProfileKind::ALL.iter().map(|&kind| self.summary(kind)).collect()
    }

    /// Total completed requests across all profiles
    pub fn total_requests(&self) -> u64 {
        ProfileKind::ALL.iter().map(|&kind| self.summary(kind).requests).sum()
    }
}

impl Default for DelayStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of one profile's statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub profile: ProfileKind,
    pub path: &'static str,
    pub requests: u64,
    pub interrupted: u64,
    pub mean_ms: Option<f64>,
    pub p50_ms: Option<u64>,
    pub p99_ms: Option<u64>,
    pub max_ms: Option<u64>,
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<15} {:>8} requests", self.profile.name(), self.requests)?;
        if self.interrupted > 0 {
            write!(f, " ({} interrupted)", self.interrupted)?;
        }
        if let (Some(mean), Some(p50), Some(p99), Some(max)) =
            (self.mean_ms, self.p50_ms, self.p99_ms, self.max_ms)
        {
            write!(f, "  mean {:.1}ms  p50 {}ms  p99 {}ms  max {}ms", mean, p50, p99, max)?;
        }
        Ok(())
    }
}

/// Whole-server statistics, as served on `/stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    /// Request indices handed out so far
    pub requests_issued: u64,
    /// Worker pool size
    pub workers: usize,
    /// Workers currently suspended on a request
    pub busy_workers: usize,
    /// Requests waiting for a worker
    pub queued: usize,
    pub profiles: Vec<ProfileSummary>,
}
