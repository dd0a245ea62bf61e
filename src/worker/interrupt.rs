//! Interruptible suspension
//!
//! Workers block for the sampled delay by waiting on a channel that never
//! carries a message. Firing the [`Interrupt`] drops the only sender, which
//! wakes every waiter at once; later waits return immediately. An interrupted
//! wait is an early, successful completion, never an error.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How a suspension ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full delay elapsed
    Completed,
    /// The interrupt fired first; the rest of the delay was abandoned
    Interrupted,
}

/// Broadcast interrupt shared by all workers
#[derive(Debug)]
pub struct Interrupt {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl Interrupt {
    pub fn new() -> Self {
        let (sender, receiver) = channel::bounded(0);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// Wake all current sleepers and make future sleeps return immediately
    ///
    /// Idempotent.
    pub fn fire(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether [`fire`](Self::fire) has been called
    pub fn is_fired(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Block the calling thread for `delay` unless interrupted
    pub fn sleep(&self, delay: Duration) -> SleepOutcome {
        if delay.is_zero() {
            return SleepOutcome::Completed;
        }

        let deadline = Instant::now() + delay;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return SleepOutcome::Completed;
            }
            match self.receiver.recv_timeout(remaining) {
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return SleepOutcome::Interrupted,
                // Nothing is ever sent; treat a stray message as a spurious wake.
                Ok(()) => {}
            }
        }
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sleep_runs_full_delay() {
        let interrupt = Interrupt::new();
        let start = Instant::now();
        assert_eq!(interrupt.sleep(Duration::from_millis(30)), SleepOutcome::Completed);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_zero_delay() {
        let interrupt = Interrupt::new();
        interrupt.fire();
        assert_eq!(interrupt.sleep(Duration::ZERO), SleepOutcome::Completed);
    }

    #[test]
    fn test_fire_wakes_sleepers() {
        let interrupt = Arc::new(Interrupt::new());
        let sleepers: Vec<_> = (0..4)
            .map(|_| {
                let interrupt = Arc::clone(&interrupt);
                thread::spawn(move || {
                    let start = Instant::now();
                    let outcome = interrupt.sleep(Duration::from_secs(30));
                    (outcome, start.elapsed())
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        interrupt.fire();

        for sleeper in sleepers {
            let (outcome, elapsed) = sleeper.join().unwrap();
            assert_eq!(outcome, SleepOutcome::Interrupted);
            assert!(elapsed < Duration::from_secs(10));
        }
    }

    #[test]
    fn test_sleep_after_fire_returns_immediately() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.is_fired());
        interrupt.fire();
        interrupt.fire();
        assert!(interrupt.is_fired());

        let start = Instant::now();
        assert_eq!(interrupt.sleep(Duration::from_secs(30)), SleepOutcome::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
