//! Deferred continuations
//!
//! Game sessions schedule short follow-ups ("hide the answer in two
//! seconds"). Each entry records the session generation it was scheduled
//! under; the session compares it with its current generation when the entry
//! comes due and drops it on mismatch.

use std::time::Duration;

#[derive(Debug)]
struct Pending<A> {
    due: Duration,
    generation: u64,
    action: A,
}

/// Time-ordered queue of generation-tagged actions
#[derive(Debug)]
pub struct DeferredQueue<A> {
    pending: Vec<Pending<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to come due at clock time `due`
    pub fn schedule(&mut self, due: Duration, generation: u64, action: A) {
        // Keep sorted by due time; equal times stay in scheduling order
        let at = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(
            at,
            Pending {
                due,
                generation,
                action,
            },
        );
    }

    /// Remove and return every entry due at or before `now`, earliest first
    pub fn take_due(&mut self, now: Duration) -> Vec<(u64, A)> {
        let split = self.pending.partition_point(|p| p.due <= now);
        self.pending
            .drain(..split)
            .map(|p| (p.generation, p.action))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_take_due_in_time_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(300), 1, "c");
        queue.schedule(ms(100), 1, "a");
        queue.schedule(ms(200), 2, "b");

        assert!(queue.take_due(ms(50)).is_empty());
        assert_eq!(queue.take_due(ms(200)), vec![(1, "a"), (2, "b")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take_due(ms(1000)), vec![(1, "c")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_due_times_keep_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(100), 1, 1);
        queue.schedule(ms(100), 1, 2);
        queue.schedule(ms(100), 1, 3);
        let order: Vec<_> = queue.take_due(ms(100)).into_iter().map(|(_, a)| a).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_clear() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(1), 0, ());
        queue.clear();
        assert!(queue.is_empty());
    }
}
