//! Request counter
//!
//! Process-wide monotonically increasing counter. Every accepted request takes
//! exactly one index; indices start at 0, are never reused and never reset.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number assigned to an accepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestIndex(u64);

impl RequestIndex {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Atomic request counter
#[derive(Debug, Default)]
pub struct RequestCounter {
    next: AtomicU64,
}

impl RequestCounter {
    /// Create a counter whose first index is 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next index
    ///
    /// A single `fetch_add`, so N concurrent callers receive exactly N
    /// consecutive values.
    #[inline]
    pub fn next(&self) -> RequestIndex {
        RequestIndex(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Number of indices handed out so far (the value the next call will return)
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_at_zero() {
        let counter = RequestCounter::new();
        assert_eq!(counter.issued(), 0);
        assert_eq!(counter.next(), RequestIndex::new(0));
        assert_eq!(counter.next(), RequestIndex::new(1));
        assert_eq!(counter.next().get(), 2);
        assert_eq!(counter.issued(), 3);
    }

    #[test]
    fn test_concurrent_indices_are_contiguous() {
        let counter = Arc::new(RequestCounter::new());
        // Pre-advance so the contiguous range does not start at zero
        for _ in 0..17 {
            counter.next();
        }
        let start = counter.issued();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..1000).map(|_| counter.next().get()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        let expected: Vec<u64> = (start..start + 8000).collect();
        assert_eq!(all, expected);
        assert_eq!(counter.issued(), start + 8000);
    }

    #[test]
    fn test_per_thread_order_is_increasing() {
        let counter = Arc::new(RequestCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..500).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        for handle in handles {
            let seen = handle.join().unwrap();
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_display_and_serialize() {
        let index = RequestIndex::from(42);
        assert_eq!(index.to_string(), "42");
        assert_eq!(serde_json::to_string(&index).unwrap(), "42");
    }
}
