//! Worker pool
//!
//! A fixed set of OS threads that execute requests. Each request occupies one
//! worker for its whole delay: the worker really blocks, so the pool size is
//! the server's concurrency limit and excess requests wait in the queue.
//!
//! # Architecture
//!
//! - **Job queue**: unbounded crossbeam channel; saturation shows up as queueing,
//!   not as rejected requests
//! - **Workers**: `bmstub-worker-N` threads draining the queue
//! - **Interrupt**: shared [`Interrupt`] handed to every job so sleeps can be
//!   abandoned at shutdown
//!
//! # Example
//!
//! ```
//! use bmstub::worker::WorkerPool;
//! use std::sync::mpsc;
//! use std::time::Duration;
//!
//! let pool = WorkerPool::new(2)?;
//! let (tx, rx) = mpsc::channel();
//! pool.execute(move |interrupt| {
//!     interrupt.sleep(Duration::from_millis(5));
//!     tx.send(()).unwrap();
//! })?;
//! rx.recv().unwrap();
//! pool.shutdown();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod counter;
pub mod interrupt;

pub use counter::{RequestCounter, RequestIndex};
pub use interrupt::{Interrupt, SleepOutcome};

use crate::Result;
use anyhow::Context;
use crossbeam::channel::{self, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error};

/// Unit of work executed on a worker thread
pub type Job = Box<dyn FnOnce(&Interrupt) + Send + 'static>;

/// Returned when submitting to a pool that has been shut down
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("worker pool is shut down")]
pub struct PoolClosed;

/// Fixed-size pool of blocking worker threads
pub struct WorkerPool {
    /// Job queue; `None` once the pool is closed
    sender: Mutex<Option<Sender<Job>>>,

    /// Worker thread handles, drained on shutdown
    handles: Mutex<Vec<JoinHandle<()>>>,

    /// Interrupt shared with every job
    interrupt: Arc<Interrupt>,

    /// Number of workers currently running a job
    busy: Arc<AtomicUsize>,

    size: usize,
}

impl WorkerPool {
    /// Spawn a pool with `size` worker threads
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or a thread cannot be spawned.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            anyhow::bail!("worker pool needs at least one thread");
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        let interrupt = Arc::new(Interrupt::new());
        let busy = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let interrupt = Arc::clone(&interrupt);
            let busy = Arc::clone(&busy);
            let handle = thread::Builder::new()
                .name(format!("bmstub-worker-{}", id))
                .spawn(move || run_worker(id, receiver, interrupt, busy))
                .with_context(|| format!("Failed to spawn worker thread {}", id))?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(handles),
            interrupt,
            busy,
            size,
        })
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of workers currently executing a job
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::Relaxed)
    }

    /// Number of jobs waiting for a free worker
    pub fn queued(&self) -> usize {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |sender| sender.len())
    }

    /// Queue a job for execution
    ///
    /// # Errors
    ///
    /// Returns [`PoolClosed`] after [`shutdown`](Self::shutdown).
    pub fn execute<F>(&self, job: F) -> std::result::Result<(), PoolClosed>
    where
        F: FnOnce(&Interrupt) + Send + 'static,
    {
        self.execute_with(|| job)
    }

    /// Build and queue a job while holding the queue lock
    ///
    /// `build` runs only if the pool is open, and jobs enter the queue in the
    /// order their `build` calls ran. Keep it short: every submitter waits on it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolClosed`] after [`shutdown`](Self::shutdown); `build` is
    /// not called.
    pub fn execute_with<B, F>(&self, build: B) -> std::result::Result<(), PoolClosed>
    where
        B: FnOnce() -> F,
        F: FnOnce(&Interrupt) + Send + 'static,
    {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = guard.as_ref().ok_or(PoolClosed)?;
        sender.send(Box::new(build())).map_err(|_| PoolClosed)
    }

    /// Abandon every in-progress and future sleep
    ///
    /// Jobs keep running; their suspensions just end early.
    pub fn interrupt(&self) {
        self.interrupt.fire();
    }

    /// Interrupt shared with the workers, for sleeping outside the pool
    pub fn interrupt_handle(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Close the queue and wait for workers to drain it
    ///
    /// Already-queued jobs still run. Idempotent.
    pub fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked outside a job");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.interrupt();
        self.shutdown();
    }
}

fn run_worker(id: usize, jobs: Receiver<Job>, interrupt: Arc<Interrupt>, busy: Arc<AtomicUsize>) {
    debug!(worker = id, "worker started");

    while let Ok(job) = jobs.recv() {
        busy.fetch_add(1, Ordering::Relaxed);
        // A panicking job must not take the worker down with it.
        if panic::catch_unwind(AssertUnwindSafe(|| job(interrupt.as_ref()))).is_err() {
            error!(worker = id, "job panicked");
        }
        busy.fetch_sub(1, Ordering::Relaxed);
    }

    debug!(worker = id, "worker stopped");
}
