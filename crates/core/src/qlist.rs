// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority queue set feeding a state flow
//!
//! Bucket 0 is the highest priority. Items are FIFO within a bucket and
//! strictly priority-ordered across buckets; lower buckets starve until the
//! higher ones drain.

use std::collections::VecDeque;

/// A fixed number of FIFO buckets, checked in ascending index order
#[derive(Debug)]
pub struct PriorityQueues<T> {
    buckets: Vec<VecDeque<T>>,
}

impl<T> PriorityQueues<T> {
    /// Create a queue set with `priorities` buckets.
    ///
    /// Panics if `priorities` is zero.
    pub fn new(priorities: usize) -> Self {
        assert!(priorities >= 1, "a priority queue set needs at least one bucket");
        Self {
            buckets: (0..priorities).map(|_| VecDeque::new()).collect(),
        }
    }

    pub fn num_priorities(&self) -> usize {
        self.buckets.len()
    }

    /// Append `item` to `bucket`, clamped to the lowest-priority bucket
    pub fn insert(&mut self, item: T, bucket: usize) {
        let last = self.buckets.len() - 1;
        let index = bucket.min(last);
        self.buckets[index].push_back(item);
    }

    /// Pop the front of the highest-priority non-empty bucket
    pub fn next(&mut self) -> Option<T> {
        self.buckets.iter_mut().find_map(VecDeque::pop_front)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    /// Number of items waiting in `bucket`, or 0 if out of range
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets.get(bucket).map_or(0, VecDeque::len)
    }

    /// Remove every queued item, highest priority first
    pub fn drain(&mut self) -> Vec<T> {
        self.buckets.iter_mut().flat_map(|b| b.drain(..)).collect()
    }
}

#[cfg(test)]
#[path = "qlist_tests.rs"]
mod tests;
