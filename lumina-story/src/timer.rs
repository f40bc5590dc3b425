//! Virtual-time timer scheduling.
//!
//! Every state machine in this crate owns one [`TimerQueue`] and never touches
//! a wall clock. Hosts pass the current story time (milliseconds) into each
//! operation, then drain due timers through the machine's `poll`. Equal
//! deadlines fire in the order they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Handle for a scheduled timer, usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<E> {
    deadline: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of pending timer events keyed by `(deadline, sequence)`.
///
/// The sequence number is a monotone counter, so two timers scheduled for the
/// same instant pop in FIFO order. Cancellation is lazy: cancelled entries
/// stay in the heap but are skipped when they surface.
#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<Entry<E>>>,
    next_seq: u64,
    cancelled: Vec<u64>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            cancelled: Vec::new(),
        }
    }

    /// Schedule `event` to fire `delay_ms` after `now`.
    pub fn schedule(&mut self, now: u64, delay_ms: u64, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            deadline: now.saturating_add(delay_ms),
            seq,
            event,
        }));
        TimerId(seq)
    }

    /// Cancel a pending timer. Cancelling an already-fired or unknown timer
    /// is a no-op.
    pub fn cancel(&mut self, id: TimerId) {
        self.cancelled.push(id.0);
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }

    /// Deadline of the next live timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap
            .iter()
            .filter(|Reverse(e)| !self.cancelled.contains(&e.seq))
            .map(|Reverse(e)| e.deadline)
            .min()
    }

    /// Pop the next timer whose deadline is at or before `now`.
    ///
    /// Returns `None` once no live timer is due. Callers loop over this to
    /// drain a burst of simultaneous deadlines in FIFO order.
    pub fn pop_due(&mut self, now: u64) -> Option<E> {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                return None;
            }
            let Reverse(entry) = self.heap.pop()?;
            if let Some(pos) = self.cancelled.iter().position(|&seq| seq == entry.seq) {
                self.cancelled.swap_remove(pos);
                continue;
            }
            return Some(entry.event);
        }
        None
    }

    /// Whether any live timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_deadline().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_deadlines_pop_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 100, "a");
        q.schedule(0, 100, "b");
        q.schedule(0, 50, "c");
        assert_eq!(q.pop_due(100), Some("c"));
        assert_eq!(q.pop_due(100), Some("a"));
        assert_eq!(q.pop_due(100), Some("b"));
        assert_eq!(q.pop_due(100), None);
    }

    #[test]
    fn pop_due_respects_now() {
        let mut q = TimerQueue::new();
        q.schedule(10, 90, "x");
        assert_eq!(q.pop_due(99), None);
        assert_eq!(q.pop_due(100), Some("x"));
    }

    #[test]
    fn cancel_skips_entry_and_next_deadline_ignores_it() {
        let mut q = TimerQueue::new();
        let a = q.schedule(0, 10, "a");
        q.schedule(0, 20, "b");
        q.cancel(a);
        assert_eq!(q.next_deadline(), Some(20));
        assert_eq!(q.pop_due(30), Some("b"));
        assert!(q.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TimerQueue::new();
        q.schedule(0, 10, 1);
        q.schedule(0, 20, 2);
        q.clear();
        assert_eq!(q.next_deadline(), None);
        assert_eq!(q.pop_due(u64::MAX), None);
    }
}
