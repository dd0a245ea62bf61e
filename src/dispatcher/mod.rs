//! Request dispatcher
//!
//! Turns "a request for profile X arrived" into a completed, delayed request:
//!
//! 1. Take the next [`RequestIndex`] from the [`RequestCounter`]
//! 2. Ask the profile for a delay at that index
//! 3. Block the worker for the delay (interruptible)
//! 4. Report the completion and record statistics
//!
//! Step 1 happens on acceptance, under the pool's queue lock, so indices follow
//! queue order. Steps 2-4 run on a pool worker, so a request holds its worker
//! for the whole delay. An interrupted suspension still produces a normal
//! [`Completion`], flagged `interrupted`.

use crate::config::Config;
use crate::profile::{ProfileError, ProfileKind, ProfileRegistry};
use crate::stats::{DelayStats, StatsReport};
use crate::worker::{Interrupt, PoolClosed, RequestCounter, RequestIndex, SleepOutcome, WorkerPool};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of one dispatched request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub index: RequestIndex,
    pub profile: ProfileKind,
    /// Delay chosen by the profile
    pub delay: Duration,
    /// Time actually spent suspended
    pub observed: Duration,
    /// Whether the suspension was cut short
    pub interrupted: bool,
}

/// Dispatch failures
///
/// An interrupted suspension is not one of them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    PoolClosed(#[from] PoolClosed),

    #[error("worker dropped the request before completing it")]
    WorkerLost,

    #[error(transparent)]
    UnknownProfile(#[from] ProfileError),
}

/// State shared between the dispatcher and the jobs it queues
#[derive(Debug)]
struct DispatchCore {
    counter: RequestCounter,
    profiles: ProfileRegistry,
    stats: DelayStats,
}

impl DispatchCore {
    fn handle(&self, index: RequestIndex, kind: ProfileKind, interrupt: &Interrupt) -> Completion {
        let delay = self.profiles.get(kind).delay(index);

        let start = Instant::now();
        let outcome = interrupt.sleep(delay);
        let observed = start.elapsed();
        let interrupted = outcome == SleepOutcome::Interrupted;

        self.stats.record(kind, delay, interrupted);
        debug!(
            index = index.get(),
            profile = kind.name(),
            delay_ms = delay.as_millis() as u64,
            observed_ms = observed.as_millis() as u64,
            interrupted,
            "request completed"
        );

        Completion {
            index,
            profile: kind,
            delay,
            observed,
            interrupted,
        }
    }
}

/// Dispatcher over a worker pool and the profile set
pub struct Dispatcher {
    core: Arc<DispatchCore>,
    pool: WorkerPool,
}

impl Dispatcher {
    pub fn new(profiles: ProfileRegistry, pool: WorkerPool) -> Self {
        Self {
            core: Arc::new(DispatchCore {
                counter: RequestCounter::new(),
                profiles,
                stats: DelayStats::new(),
            }),
            pool,
        }
    }

    /// Build profiles and worker pool from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let profiles = ProfileRegistry::from_config(&config.profiles);
        let pool = WorkerPool::new(config.workers.threads)?;
        Ok(Self::new(profiles, pool))
    }

    /// Handle a request on the calling thread
    ///
    /// Blocks for the sampled delay. Uses the pool's interrupt, so
    /// [`interrupt`](Self::interrupt) cuts this sleep short too.
    pub fn handle(&self, kind: ProfileKind) -> Completion {
        let index = self.core.counter.next();
        self.core.handle(index, kind, self.pool.interrupt_handle())
    }

    /// Handle a request for a profile given by name or path
    pub fn handle_named(&self, name: &str) -> std::result::Result<Completion, DispatchError> {
        let kind: ProfileKind = name.parse()?;
        Ok(self.handle(kind))
    }

    /// Run a request on the worker pool and wait for its completion
    ///
    /// Queues behind earlier requests when every worker is busy.
    pub async fn dispatch(&self, kind: ProfileKind) -> std::result::Result<Completion, DispatchError> {
        let pending = self.accept(kind)?;
        pending.await.map_err(|_| DispatchError::WorkerLost)
    }

    /// Assign the next index and queue the request
    ///
    /// Index assignment and enqueueing happen under one lock, so a request
    /// accepted later never gets a lower index. A closed pool consumes no index.
    fn accept(&self, kind: ProfileKind) -> std::result::Result<oneshot::Receiver<Completion>, PoolClosed> {
        let (tx, rx) = oneshot::channel();
        let core = Arc::clone(&self.core);

        self.pool.execute_with(move || {
            let index = core.counter.next();
            move |interrupt: &Interrupt| {
                // The caller may have gone away; the worker is still held for the delay.
                let _ = tx.send(core.handle(index, kind, interrupt));
            }
        })?;

        Ok(rx)
    }

    /// Run a request for a profile given by name or path on the worker pool
    pub async fn dispatch_named(&self, name: &str) -> std::result::Result<Completion, DispatchError> {
        let kind: ProfileKind = name.parse()?;
        self.dispatch(kind).await
    }

    pub fn stats(&self) -> &DelayStats {
        &self.core.stats
    }

    /// Request indices handed out so far
    pub fn requests_issued(&self) -> u64 {
        self.core.counter.issued()
    }

    /// Snapshot of counters, pool occupancy and per-profile statistics
    pub fn stats_report(&self) -> StatsReport {
        StatsReport {
            requests_issued: self.requests_issued(),
            workers: self.pool.size(),
            busy_workers: self.pool.busy(),
            queued: self.pool.queued(),
            profiles: self.core.stats.summaries(),
        }
    }

    /// Cut every in-progress and future suspension short
    pub fn interrupt(&self) {
        self.pool.interrupt();
    }

    /// Stop accepting work and wait for queued requests to finish
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
