//! One-shot timers on a caller-supplied clock.
//!
//! Nothing here sleeps. The owner passes "now" (time since launch) into
//! [`TimerQueue::pop_due`] from its own loop, which keeps every timer-driven
//! transition deterministic under test.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<K> {
    id: TimerId,
    due: Duration,
    kind: K,
}

#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: now + delay,
            kind,
        });
        id
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn cancel_kind(&mut self, kind: K) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.kind != kind);
        before - self.entries.len()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return the earliest timer due at `now`, if any. Ties fire in
    /// scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<K> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.id.0))
            .map(|(index, _)| index)?;
        Some(self.entries.remove(index).kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn fires_in_due_order_and_only_once() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::ZERO, Duration::from_millis(300), Kind::B);
        timers.schedule(Duration::ZERO, Duration::from_millis(100), Kind::A);

        assert_eq!(timers.pop_due(Duration::from_millis(50)), None);
        assert_eq!(timers.pop_due(Duration::from_secs(1)), Some(Kind::A));
        assert_eq!(timers.pop_due(Duration::from_secs(1)), Some(Kind::B));
        assert_eq!(timers.pop_due(Duration::from_secs(1)), None);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(Duration::ZERO, Duration::from_millis(10), Kind::A);
        timers.schedule(Duration::ZERO, Duration::from_millis(10), Kind::B);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.cancel_kind(Kind::B), 1);
        assert_eq!(timers.pop_due(Duration::from_secs(1)), None);
    }
}
