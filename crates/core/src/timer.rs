// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline timers for `timeout_and_call`
//!
//! Each flow built with a timer owns one [`DeadlineTimer`]. Arming it pushes
//! an entry onto the owning service's [`TimerQueue`]; the entry carries the
//! arm generation so expiries belonging to a cancelled or triggered arm are
//! discarded when they surface.

use crate::flow::FlowId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

/// One-shot timer state owned by a flow
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    armed: bool,
    early: bool,
    generation: u64,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer and return the generation identifying this arm
    pub fn arm(&mut self) -> u64 {
        assert!(!self.armed, "deadline timer armed twice");
        self.generation += 1;
        self.armed = true;
        self.early = false;
        self.generation
    }

    /// Natural expiry. Returns false for a stale generation.
    pub fn expire(&mut self, generation: u64) -> bool {
        if !self.armed || self.generation != generation {
            return false;
        }
        self.armed = false;
        self.early = false;
        true
    }

    /// Force early expiry. Returns false if the timer was not armed.
    pub fn trigger(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.early = true;
        true
    }

    /// Cancel without expiring. Returns whether the timer was armed.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the last expiry was forced by [`trigger`](Self::trigger)
    pub fn early(&self) -> bool {
        self.early
    }
}

/// A pending expiry on the service timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEntry {
    pub fire_at: Instant,
    pub flow: FlowId,
    pub generation: u64,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap: earliest first, ties by flow then arm order
        Reverse((self.fire_at, self.flow, self.generation)).cmp(&Reverse((
            other.fire_at,
            other.flow,
            other.generation,
        )))
    }
}

/// Expiry schedule for every timer owned by one service
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BinaryHeap<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, flow: FlowId, fire_at: Instant, generation: u64) {
        self.entries.push(TimerEntry {
            fire_at,
            flow,
            generation,
        });
    }

    /// Remove and return every entry due at or before `now`, earliest first
    pub fn poll(&mut self, now: Instant) -> Vec<TimerEntry> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.peek() {
            if entry.fire_at > now {
                break;
            }
            let Some(entry) = self.entries.pop() else {
                break;
            };
            due.push(entry);
        }
        due
    }

    /// Drop every entry belonging to `flow`
    pub fn forget(&mut self, flow: FlowId) {
        self.entries.retain(|entry| entry.flow != flow);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.peek().map(|entry| entry.fire_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
