//! Time-ordered queue of pending simulation actions.
//!
//! Actions run in order of (time, seq): ties keep insertion order, so a run
//! is fully determined by the seed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fieldmesh_field::{DeviceId, Time};

/// Something the simulator does at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Execute one round of the device
    Round(DeviceId),
    /// Stop the device
    Halt(DeviceId),
}

#[derive(Debug)]
struct Entry {
    time: Time,
    seq: u64,
    action: Action,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: reverse for earliest first
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of actions by time.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: Time, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { time, seq, action });
    }

    pub fn peek_time(&self) -> Option<Time> {
        self.heap.peek().map(|e| e.time)
    }

    pub fn pop(&mut self) -> Option<(Time, Action)> {
        self.heap.pop().map(|e| (e.time, e.action))
    }

    /// Pop the next action if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Time) -> Option<(Time, Action)> {
        match self.peek_time() {
            Some(time) if time <= now => self.pop(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
