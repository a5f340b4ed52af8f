// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items processed by state flows
//!
//! A [`Message`] is move-only: at any instant it lives in exactly one place
//! (a priority bucket, a flow's dispatch loop, a pool wait list, or a timer's
//! pending slot). Releasing it is the end of the owning binding.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a message, independent of its priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// A unit of work owned by exactly one holder at a time
pub struct Message<T> {
    id: MessageId,
    priority: usize,
    in_process: bool,
    payload: T,
}

impl<T> Message<T> {
    /// Create a fresh message with the highest priority hint
    pub fn new(payload: T) -> Self {
        Self {
            id: MessageId::next(),
            priority: 0,
            in_process: false,
            payload,
        }
    }

    /// Set the bucket this message is inserted into on a plain send
    pub fn with_priority(mut self, priority: usize) -> Self {
        self.priority = priority;
        self
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Bucket index used when the message is sent without an explicit priority
    pub fn priority_hint(&self) -> usize {
        self.priority
    }

    pub fn set_priority(&mut self, priority: usize) {
        self.priority = priority;
    }

    /// Flag the message as handed to an asynchronous wait.
    ///
    /// A send of an in-process message is a resumption, not a fresh request.
    pub fn mark_in_process(&mut self) {
        self.in_process = true;
    }

    pub fn clear_in_process(&mut self) {
        self.in_process = false;
    }

    pub fn is_in_process(&self) -> bool {
        self.in_process
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Release the message back to its allocator
    pub fn release(self) {
        tracing::trace!(id = %self.id, "message released");
    }
}

impl<T: fmt::Debug> fmt::Debug for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("in_process", &self.in_process)
            .field("payload", &self.payload)
            .finish()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
