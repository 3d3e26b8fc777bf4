// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Virtual-clock task queue and retry policy.
//!
//! Every deferred step of the selector (setup, restore, guard release,
//! summary refresh, hider passes) goes through [`Scheduler`], so a whole
//! page session can be replayed deterministically by advancing the clock.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Timer<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

/// Tasks ordered by due time, ties broken by scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<Timer<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run `task` once `delay_ms` has elapsed. A zero delay still defers to
    /// the next turn.
    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        let timer = Timer {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(Reverse(timer));
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(t)| t.due_ms)
    }

    /// Pop the earliest task due at or before `deadline_ms`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<T> {
        if self.next_due_ms()? > deadline_ms {
            return None;
        }
        let Reverse(timer) = self.queue.pop()?;
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(timer.task)
    }

    /// Move the clock forward without running anything.
    pub fn advance_clock(&mut self, to_ms: u64) {
        self.now_ms = self.now_ms.max(to_ms);
    }
}

/// Bounded exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    pub base_ms: u64,
    pub max_attempts: u32,
}

impl Backoff {
    pub fn new(base_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_ms,
            max_attempts,
        }
    }

    /// Delay before retry number `attempt` (0-based), `None` once the budget
    /// is spent.
    pub fn delay_ms(&self, attempt: u32) -> Option<u64> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Some(self.base_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_then_fifo() {
        let mut sched = Scheduler::new();
        sched.schedule(50, "late");
        sched.schedule(0, "first");
        sched.schedule(0, "second");
        sched.schedule(10, "middle");

        let mut order = Vec::new();
        while let Some(task) = sched.pop_due(u64::MAX) {
            order.push((sched.now_ms(), task));
        }

        assert_eq!(
            order,
            vec![(0, "first"), (0, "second"), (10, "middle"), (50, "late")]
        );
    }

    #[test]
    fn respects_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(100, 1);
        assert_eq!(sched.pop_due(99), None);
        sched.advance_clock(99);
        assert_eq!(sched.now_ms(), 99);
        assert_eq!(sched.pop_due(100), Some(1));
        assert!(sched.is_empty());
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut sched = Scheduler::new();
        sched.advance_clock(1_000);
        sched.schedule(5, ());
        assert_eq!(sched.next_due_ms(), Some(1_005));
        // The clock never runs backwards.
        sched.advance_clock(10);
        assert_eq!(sched.now_ms(), 1_000);
    }

    #[test]
    fn backoff_doubles_until_exhausted() {
        let backoff = Backoff::new(250, 3);
        assert_eq!(backoff.delay_ms(0), Some(250));
        assert_eq!(backoff.delay_ms(1), Some(500));
        assert_eq!(backoff.delay_ms(2), Some(1_000));
        assert_eq!(backoff.delay_ms(3), None);
        assert_eq!(Backoff::new(1, 80).delay_ms(70), Some(u64::MAX));
    }
}
