//! Bounded memory of recently processed alert ids.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Fixed-capacity set of recent alert ids with FIFO eviction.
///
/// Eviction follows insertion order only; seeing an id again does not
/// refresh it.
#[derive(Debug)]
pub struct RecentAlerts {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentAlerts {
    /// Create an empty set. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                order: VecDeque::with_capacity(capacity),
                seen: HashSet::with_capacity(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record `id` unless it is already present.
    ///
    /// Returns `true` when the id was new. Check and insert happen under one
    /// lock, so concurrent duplicates are recorded exactly once.
    pub fn check_and_record(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.seen.contains(id) {
            return false;
        }

        if inner.order.len() == self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.seen.remove(&oldest);
            }
        }

        inner.order.push_back(id.to_string());
        inner.seen.insert(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .seen
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_duplicate_detected() {
        let recent = RecentAlerts::new(3);
        assert!(recent.check_and_record("a"));
        assert!(!recent.check_and_record("a"));
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let recent = RecentAlerts::new(2);
        assert!(recent.check_and_record("a"));
        assert!(recent.check_and_record("b"));
        assert!(recent.check_and_record("c"));

        assert!(!recent.contains("a"));
        assert!(recent.contains("b"));
        assert!(recent.contains("c"));
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_repeat_does_not_refresh_position() {
        let recent = RecentAlerts::new(2);
        recent.check_and_record("a");
        recent.check_and_record("b");
        // Seeing "a" again must not move it to the back.
        assert!(!recent.check_and_record("a"));
        recent.check_and_record("c");

        assert!(!recent.contains("a"));
        assert!(recent.contains("b"));
    }

    #[test]
    fn test_evicted_id_is_accepted_again() {
        let recent = RecentAlerts::new(1);
        assert!(recent.check_and_record("a"));
        assert!(recent.check_and_record("b"));
        assert!(recent.check_and_record("a"));
    }

    #[test]
    fn test_zero_capacity_raised() {
        let recent = RecentAlerts::new(0);
        assert_eq!(recent.capacity(), 1);
        assert!(recent.is_empty());
    }

    #[test]
    fn test_concurrent_duplicates_recorded_once() {
        let recent = Arc::new(RecentAlerts::new(16));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let recent = recent.clone();
                std::thread::spawn(move || recent.check_and_record("same-alert"))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&new| new)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(recent.len(), 1);
    }
}
