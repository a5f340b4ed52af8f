// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Send side of a flow
//!
//! A [`FlowHandle`] is the single entry point for both fresh work and
//! resumptions. Fresh messages land in the flow's priority buckets; messages
//! flagged in-process land in its resume queue, which the service drains
//! before any bucket. Handles are `Send`, so producers on other threads can
//! feed a flow owned by a service running elsewhere.

use crate::error::FlowError;
use crate::flow::FlowId;
use crate::message::Message;
use crate::qlist::PriorityQueues;
use crate::service::ReadySet;
use crate::timer::DeadlineTimer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A resubmitted item waiting for its turn
pub(crate) struct Resumed<T> {
    pub(crate) msg: Message<T>,
    /// Delivered by an early timer trigger
    pub(crate) early: bool,
}

/// Everything a flow owns that other actors may touch
pub(crate) struct Inbox<T> {
    pub(crate) queues: PriorityQueues<Message<T>>,
    /// Resubmitted in-process items, dispatched before any bucket
    pub(crate) resumed: VecDeque<Resumed<T>>,
    /// Items parked by `wait_and_call`, oldest first
    pub(crate) parked: VecDeque<Message<T>>,
    pub(crate) timer: Option<DeadlineTimer>,
    /// Item waiting on `timer`
    pub(crate) timer_msg: Option<Message<T>>,
    /// Items with a saved continuation, wherever they currently sit
    pub(crate) suspended: usize,
    /// The flow sits in the service ready set
    pub(crate) scheduled: bool,
    pub(crate) closed: bool,
}

impl<T> Inbox<T> {
    pub(crate) fn new(priorities: usize, timer: bool) -> Self {
        Self {
            queues: PriorityQueues::new(priorities),
            resumed: VecDeque::new(),
            parked: VecDeque::new(),
            timer: timer.then(DeadlineTimer::new),
            timer_msg: None,
            suspended: 0,
            scheduled: false,
            closed: false,
        }
    }

    /// Mark the flow scheduled; true if the caller must push it to the ready set
    pub(crate) fn schedule(&mut self) -> bool {
        !std::mem::replace(&mut self.scheduled, true)
    }

    /// Whether the next dispatch would find something to process
    pub(crate) fn has_work(&self) -> bool {
        !self.resumed.is_empty() || !self.queues.is_empty()
    }

    /// Queue `msg` for resumption behind earlier resumptions
    pub(crate) fn deliver(&mut self, msg: Message<T>, early: bool) {
        self.resumed.push_back(Resumed { msg, early });
    }

    /// Move the timer's pending item to the resume queue after expiry or trigger
    pub(crate) fn deliver_timer(&mut self, early: bool) -> bool {
        match self.timer_msg.take() {
            Some(msg) => {
                self.deliver(msg, early);
                self.schedule()
            }
            None => false,
        }
    }

    /// Take every item this flow owns, in any slot
    pub(crate) fn take_all(&mut self) -> (Vec<Message<T>>, usize) {
        let mut in_flight: Vec<Message<T>> = self
            .resumed
            .drain(..)
            .map(|resumed| resumed.msg)
            .chain(self.parked.drain(..))
            .chain(self.timer_msg.take())
            .collect();
        let count = in_flight.len();
        in_flight.extend(self.queues.drain());
        (in_flight, count)
    }
}

/// Ownership snapshot of a flow, for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Fresh items waiting in the priority buckets
    pub queued: usize,
    /// Resubmitted items waiting for their turn
    pub resumed: usize,
    pub parked: usize,
    pub timer_pending: bool,
    pub timer_armed: bool,
    /// Items suspended mid-flow, counting resubmitted ones not yet run
    pub suspended: usize,
    /// Nothing suspended
    pub idle: bool,
    pub closed: bool,
}

/// Cloneable sender for one flow
pub struct FlowHandle<T> {
    id: FlowId,
    name: Arc<str>,
    inbox: Arc<Mutex<Inbox<T>>>,
    ready: Arc<ReadySet>,
}

impl<T> Clone for FlowHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            inbox: Arc::clone(&self.inbox),
            ready: Arc::clone(&self.ready),
        }
    }
}

impl<T> FlowHandle<T> {
    pub(crate) fn new(id: FlowId, name: &str, inbox: Inbox<T>, ready: Arc<ReadySet>) -> Self {
        Self {
            id,
            name: Arc::from(name),
            inbox: Arc::new(Mutex::new(inbox)),
            ready,
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send using the message's own priority hint as bucket
    pub fn send(&self, msg: Message<T>) -> Result<(), FlowError> {
        let bucket = msg.priority_hint();
        self.send_with_priority(msg, bucket)
    }

    /// Insert a fresh message into `bucket`, or resume the flow if the
    /// message is in-process
    pub fn send_with_priority(&self, msg: Message<T>, bucket: usize) -> Result<(), FlowError> {
        if msg.is_in_process() {
            return self.resume(msg);
        }
        let mut inbox = self.lock();
        if inbox.closed {
            drop(inbox);
            msg.release();
            return Err(FlowError::Closed(self.id));
        }
        tracing::trace!(flow = %self.name, id = %msg.id(), bucket, "queued");
        inbox.queues.insert(msg, bucket);
        let wake = inbox.schedule();
        drop(inbox);
        if wake {
            self.ready.push(self.id);
        }
        Ok(())
    }

    /// Hand an in-process message back to its suspended flow.
    ///
    /// The item continues where it suspended. An item the flow never
    /// suspended stands in for the oldest parked item instead, which is
    /// released when the substitute runs.
    pub fn resume(&self, msg: Message<T>) -> Result<(), FlowError> {
        let mut inbox = self.lock();
        if inbox.closed {
            drop(inbox);
            msg.release();
            return Err(FlowError::Closed(self.id));
        }
        tracing::debug!(flow = %self.name, id = %msg.id(), "resumed");
        inbox.deliver(msg, false);
        let wake = inbox.schedule();
        drop(inbox);
        if wake {
            self.ready.push(self.id);
        }
        Ok(())
    }

    /// Force the flow's armed timer to expire now.
    ///
    /// The resumed handler observes `early() == true`. Returns false when no
    /// timer is armed.
    pub fn trigger(&self) -> bool {
        let mut inbox = self.lock();
        let fired = inbox.timer.as_mut().is_some_and(DeadlineTimer::trigger);
        if !fired {
            return false;
        }
        tracing::debug!(flow = %self.name, "timer triggered early");
        let wake = inbox.deliver_timer(true);
        drop(inbox);
        if wake {
            self.ready.push(self.id);
        }
        true
    }

    /// A notifier that resubmits what this flow parks with `wait_and_call`
    pub fn notifier(&self) -> Notifier<T> {
        Notifier {
            handle: self.clone(),
        }
    }

    pub fn stats(&self) -> FlowStats {
        let inbox = self.lock();
        FlowStats {
            queued: inbox.queues.len(),
            resumed: inbox.resumed.len(),
            parked: inbox.parked.len(),
            timer_pending: inbox.timer_msg.is_some(),
            timer_armed: inbox.timer.as_ref().is_some_and(DeadlineTimer::is_armed),
            suspended: inbox.suspended,
            idle: inbox.suspended == 0,
            closed: inbox.closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inbox<T>> {
        self.inbox.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn wake(&self) {
        self.ready.push(self.id);
    }
}

impl<T> std::fmt::Debug for FlowHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Resubmits a flow's parked items, ending `wait_and_call` suspensions
/// oldest first
pub struct Notifier<T> {
    handle: FlowHandle<T>,
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T> Notifier<T> {
    /// Resume the flow with its oldest parked item. Returns false if nothing
    /// was parked.
    pub fn notify(&self) -> bool {
        let mut inbox = self.handle.lock();
        let Some(msg) = inbox.parked.pop_front() else {
            return false;
        };
        tracing::debug!(flow = %self.handle.name, id = %msg.id(), "notified");
        inbox.deliver(msg, false);
        let wake = inbox.schedule();
        drop(inbox);
        if wake {
            self.handle.wake();
        }
        true
    }

    pub fn flow(&self) -> FlowId {
        self.handle.id
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
