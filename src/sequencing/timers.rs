//! Timer Queue
//!
//! Deterministic single-threaded timer queue standing in for the host event
//! loop. Time is a `Duration` offset from page mount, so the same queue can be
//! driven by a wall clock (TUI, tokio driver) or stepped in virtual time
//! (`simulate`, tests).
//!
//! Timers fire in deadline order; timers sharing a deadline fire in the order
//! they were scheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::Duration;

/// Handle to a scheduled timer, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    /// Deadline the timer was scheduled for (not the time it was observed)
    pub at: Duration,
    pub event: E,
}

struct Entry<E> {
    deadline: Duration,
    period: Option<Duration>,
    /// Sequence number of the heap key currently considered valid
    seq: u64,
    event: E,
}

pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<(Duration, u64, TimerId)>>,
    entries: HashMap<TimerId, Entry<E>>,
    next_id: u64,
    next_seq: u64,
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            entries: HashMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Schedule `event` to fire once at `at`
    pub fn schedule_once(&mut self, at: Duration, event: E) -> TimerId {
        self.insert(at, None, event)
    }

    /// Schedule `event` to fire at `first`, then every `period` until cancelled.
    ///
    /// A zero period would never let time advance, so it is clamped to one
    /// millisecond.
    pub fn schedule_repeating(&mut self, first: Duration, period: Duration, event: E) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(first, Some(period), event)
    }

    fn insert(&mut self, deadline: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.heap.push(Reverse((deadline, seq, id)));
        self.entries.insert(
            id,
            Entry {
                deadline,
                period,
                seq,
                event,
            },
        );
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was
    /// already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        // Stale heap keys are skipped lazily in `pop_due`.
        self.entries.remove(&id).is_some()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of timers that can still fire
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Pop the next timer whose deadline is at or before `now`.
    ///
    /// Repeating timers are re-armed at `deadline + period` before returning,
    /// so a callback that cancels its own repeating timer sees it active.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<E>> {
        self.discard_stale();
        let Reverse((deadline, _, id)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        self.heap.pop();

        let period = self.entries.get(&id)?.period;
        match period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = self.entries.get_mut(&id)?;
                let next = entry.deadline + period;
                entry.deadline = next;
                entry.seq = seq;
                let event = entry.event.clone();
                self.heap.push(Reverse((next, seq, id)));
                Some(Fired {
                    id,
                    at: deadline,
                    event,
                })
            }
            None => {
                let entry = self.entries.remove(&id)?;
                Some(Fired {
                    id,
                    at: deadline,
                    event: entry.event,
                })
            }
        }
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.heap.clear();
        self.entries.clear();
    }

    fn discard_stale(&mut self) {
        while let Some(&Reverse((_, seq, id))) = self.heap.peek() {
            match self.entries.get(&id) {
                Some(entry) if entry.seq == seq => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
