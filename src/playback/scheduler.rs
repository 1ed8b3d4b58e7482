//! Cooperative virtual-time scheduler
//!
//! Stands in for the host event loop: callbacks are payloads queued at a
//! deadline on a virtual clock. Nothing fires by itself; the owner pulls due
//! timers with [`Scheduler::pop_until`] and advances the clock. A deadline is
//! fixed when the timer is scheduled, so later speed changes never rescale a
//! pending wait.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    /// Keyed by (deadline, sequence) so ties fire in scheduling order
    queue: BTreeMap<(Duration, u64), T>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `payload` to fire `after` from now.
    pub fn schedule(&mut self, after: Duration, payload: T) {
        let deadline = self.now.saturating_add(after);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((deadline, seq), payload);
    }

    /// Cancel every pending timer matching `pred`. Returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, payload| !pred(payload));
        before - self.queue.len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Time left until the earliest pending timer.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Pop the earliest timer due at or before `limit`, moving the clock to
    /// its deadline. Timers scheduled while handling it are measured from
    /// that deadline, not from `limit`.
    pub fn pop_until(&mut self, limit: Duration) -> Option<T> {
        let (&(deadline, seq), _) = self.queue.iter().next()?;
        if deadline > limit {
            return None;
        }
        self.now = self.now.max(deadline);
        self.queue.remove(&(deadline, seq))
    }

    /// Pop the earliest timer regardless of how far away it is.
    pub fn pop_next(&mut self) -> Option<T> {
        let limit = self.next_deadline()?;
        self.pop_until(limit)
    }

    /// Move the clock forward without firing anything. Never goes backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Duration, &T)> {
        self.queue.iter().map(|((deadline, _), payload)| (*deadline, payload))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
