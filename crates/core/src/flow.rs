// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative state flows and their dispatch loop
//!
//! A flow is a state machine whose handlers each take the current message by
//! value and return an [`Action`]. One activation runs handlers back to back
//! until an action suspends or terminates the flow, then control returns to
//! the [`Service`](crate::Service). There is no per-flow stack: a suspended
//! item is remembered as a continuation, the state it resumes at keyed by the
//! item's id. While items are suspended the flow keeps taking fresh work, so
//! each activation runs exactly one item.

use crate::action::{Action, ActionKind};
use crate::handle::{FlowHandle, Notifier};
use crate::message::{Message, MessageId};
use crate::pool::{Allocation, Attach, Pool};
use crate::timer::{DeadlineTimer, TimerQueue};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Identity of a flow within its service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(pub u64);

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flow-{}", self.0)
    }
}

/// Action type returned by the handlers of `F`
pub type FlowAction<F> = Action<<F as StateFlow>::State, <F as StateFlow>::Payload>;

/// A cooperative state machine driven by a [`Service`](crate::Service)
pub trait StateFlow: Send + 'static {
    /// User-defined states. Entry and termination are implicit.
    type State: Copy + Eq + fmt::Debug + Send + 'static;
    type Payload: Send + 'static;

    /// First handler run for every fresh message
    fn entry(
        &mut self,
        msg: Message<Self::Payload>,
        ctx: &mut FlowContext<'_, Self::Payload>,
    ) -> FlowAction<Self>;

    /// Handler for `state`
    fn handle(
        &mut self,
        state: Self::State,
        msg: Message<Self::Payload>,
        ctx: &mut FlowContext<'_, Self::Payload>,
    ) -> FlowAction<Self>;
}

/// Where the dispatch loop starts an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step<S> {
    Entry,
    State(S),
}

/// Construction parameters for a flow
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub name: String,
    /// Number of priority buckets; the service default when unset
    pub priorities: Option<usize>,
    /// Whether the flow owns a deadline timer for `timeout_and_call`
    pub timer: bool,
}

impl FlowOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priorities: None,
            timer: false,
        }
    }

    pub fn priorities(mut self, priorities: usize) -> Self {
        self.priorities = Some(priorities);
        self
    }

    pub fn with_timer(mut self) -> Self {
        self.timer = true;
        self
    }
}

/// Per-activation view handed to every handler
pub struct FlowContext<'a, T> {
    handle: &'a FlowHandle<T>,
    early: bool,
    now: Instant,
}

impl<T: Send + 'static> FlowContext<'_, T> {
    /// True when this activation was resumed by an early timer trigger
    /// rather than natural expiry
    pub fn early(&self) -> bool {
        self.early
    }

    /// Service time at the start of this activation
    pub fn now(&self) -> Instant {
        self.now
    }

    /// This flow's own send handle
    pub fn handle(&self) -> &FlowHandle<T> {
        self.handle
    }

    /// Notifier an external actor uses to end a `wait_and_call`
    pub fn notifier(&self) -> Notifier<T> {
        self.handle.notifier()
    }

    /// Take a resource from `pool` and continue at `next` with it attached.
    ///
    /// When the pool is empty the message joins the pool's FIFO wait list and
    /// the flow suspends; the release that satisfies it resumes the flow at
    /// `next`.
    pub fn allocate_and_call<S, R>(&self, pool: &Pool<R>, next: S, mut msg: Message<T>) -> Action<S, T>
    where
        T: Attach<R>,
        R: Send + 'static,
    {
        msg.mark_in_process();
        let id = msg.id();
        let handle = self.handle.clone();
        let outcome = pool.allocate_or_wait(msg, move |resource, mut msg: Message<T>| {
            msg.payload_mut().attach(resource);
            if let Err(e) = handle.resume(msg) {
                tracing::warn!(error = %e, "allocation completed for a closed flow");
            }
        });
        match outcome {
            Allocation::Ready(resource, mut msg) => {
                msg.clear_in_process();
                msg.payload_mut().attach(resource);
                Action::call_immediately(next, msg)
            }
            Allocation::Queued => {
                tracing::debug!(flow = %self.handle.name(), pool = %pool.name(), "waiting for resource");
                Action::suspend(next, id)
            }
        }
    }
}

/// Object-safe face of a flow, as stored by the service
pub(crate) trait Dispatch: Send {
    /// One activation; false if there was nothing to process
    fn run(&mut self, timers: &mut TimerQueue, now: Instant) -> bool;
    /// Natural timer expiry for `generation`
    fn expire(&mut self, generation: u64) -> bool;
    /// Disarm, release everything owned, refuse further sends
    fn close(&mut self);
}

/// A flow together with its dispatch state
pub(crate) struct FlowSlot<F: StateFlow> {
    flow: F,
    /// Resume state of every suspended item
    continuations: HashMap<MessageId, F::State>,
    handle: FlowHandle<F::Payload>,
}

impl<F: StateFlow> FlowSlot<F> {
    pub(crate) fn new(flow: F, handle: FlowHandle<F::Payload>) -> Self {
        Self {
            flow,
            continuations: HashMap::new(),
            handle,
        }
    }

    /// Where a resubmitted item continues.
    ///
    /// An item this flow never suspended ends the oldest `wait_and_call`
    /// instead: it takes over that continuation and the parked item is
    /// released. With nothing parked it starts over as fresh work.
    fn resume_point(&mut self, msg: &Message<F::Payload>) -> Step<F::State> {
        if let Some(state) = self.continuations.remove(&msg.id()) {
            return Step::State(state);
        }
        let parked = self.handle.lock().parked.pop_front();
        let Some(parked) = parked else {
            tracing::warn!(
                flow = %self.handle.name(),
                id = %msg.id(),
                "resubmitted item matches no suspension, dispatching at entry"
            );
            return Step::Entry;
        };
        let state = self.continuations.remove(&parked.id());
        tracing::debug!(
            flow = %self.handle.name(),
            id = %msg.id(),
            replaced = %parked.id(),
            "substitute item ends wait"
        );
        parked.release();
        match state {
            Some(state) => Step::State(state),
            None => Step::Entry,
        }
    }

    /// Drive handlers with `msg` from `step` until one suspends or exits
    fn process(
        &mut self,
        mut step: Step<F::State>,
        mut msg: Message<F::Payload>,
        early: bool,
        timers: &mut TimerQueue,
        now: Instant,
    ) {
        msg.clear_in_process();

        let span = tracing::trace_span!("flow", name = %self.handle.name(), msg = %msg.id());
        let _guard = span.enter();

        let mut ctx = FlowContext {
            handle: &self.handle,
            early,
            now,
        };

        loop {
            tracing::trace!(?step, "dispatch");
            let action = match step {
                Step::Entry => self.flow.entry(msg, &mut ctx),
                Step::State(state) => self.flow.handle(state, msg, &mut ctx),
            };

            match action.kind {
                ActionKind::Again(m) => msg = m,
                ActionKind::Call(next, m) => {
                    step = Step::State(next);
                    msg = m;
                }
                ActionKind::Exit => {
                    tracing::trace!("terminated");
                    return;
                }
                ActionKind::Wait(next, m) => {
                    self.continuations.insert(m.id(), next);
                    self.handle.lock().parked.push_back(m);
                    tracing::debug!(next = ?next, "waiting for notification");
                    return;
                }
                ActionKind::Yield(next, m) => {
                    self.continuations.insert(m.id(), next);
                    self.handle.lock().deliver(m, false);
                    tracing::trace!(next = ?next, "yielded");
                    return;
                }
                ActionKind::Timeout(next, m, period) => {
                    let mut inbox = self.handle.lock();
                    assert!(
                        inbox.timer_msg.is_none(),
                        "flow {} already has an item pending on its timer",
                        self.handle.name()
                    );
                    let Some(timer) = inbox.timer.as_mut() else {
                        unreachable!("flow {} was built without a timer", self.handle.name());
                    };
                    let generation = timer.arm();
                    self.continuations.insert(m.id(), next);
                    inbox.timer_msg = Some(m);
                    drop(inbox);
                    timers.schedule(self.handle.id(), now + period, generation);
                    tracing::debug!(next = ?next, ?period, "timer armed");
                    return;
                }
                ActionKind::Suspend(next, id) => {
                    self.continuations.insert(id, next);
                    return;
                }
            }
        }
    }
}

impl<F: StateFlow> Dispatch for FlowSlot<F> {
    fn run(&mut self, timers: &mut TimerQueue, now: Instant) -> bool {
        let (msg, early, resumed) = {
            let mut inbox = self.handle.lock();
            inbox.scheduled = false;
            if let Some(resumed) = inbox.resumed.pop_front() {
                // A triggered timer leaves its expiry behind on the queue
                if resumed.early && !inbox.timer.as_ref().is_some_and(DeadlineTimer::is_armed) {
                    timers.forget(self.handle.id());
                }
                (resumed.msg, resumed.early, true)
            } else {
                let Some(msg) = inbox.queues.next() else {
                    return false;
                };
                (msg, false, false)
            }
        };

        let step = if resumed {
            self.resume_point(&msg)
        } else {
            Step::Entry
        };
        self.process(step, msg, early, timers, now);

        let mut inbox = self.handle.lock();
        inbox.suspended = self.continuations.len();
        let wake = inbox.has_work() && inbox.schedule();
        drop(inbox);
        if wake {
            self.handle.wake();
        }
        true
    }

    fn expire(&mut self, generation: u64) -> bool {
        let mut inbox = self.handle.lock();
        let fired = inbox
            .timer
            .as_mut()
            .is_some_and(|timer| timer.expire(generation));
        if !fired {
            return false;
        }
        tracing::debug!(flow = %self.handle.name(), "timer expired");
        let wake = inbox.deliver_timer(false);
        drop(inbox);
        if wake {
            self.handle.wake();
        }
        true
    }

    fn close(&mut self) {
        let (owned, in_flight) = {
            let mut inbox = self.handle.lock();
            if inbox.closed {
                return;
            }
            inbox.closed = true;
            inbox.suspended = 0;
            if let Some(timer) = inbox.timer.as_mut() {
                timer.disarm();
            }
            inbox.take_all()
        };
        if !self.continuations.is_empty() {
            tracing::warn!(
                flow = %self.handle.name(),
                in_flight,
                suspended = self.continuations.len(),
                "flow removed while suspended, releasing its items"
            );
        }
        tracing::debug!(flow = %self.handle.name(), released = owned.len(), "flow closed");
        self.continuations.clear();
        for msg in owned {
            msg.release();
        }
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
