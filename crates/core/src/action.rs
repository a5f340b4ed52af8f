// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State transition descriptors returned by flow handlers
//!
//! Every handler returns an [`Action`]. The dispatch loop either keeps
//! running the flow in the same scheduler slot (`again`, `call_immediately`),
//! stops it (`exit`, `release_and_exit`), or hands control back to the
//! service until an external event resubmits the item (`wait_and_call`,
//! `yield_and_call`, `timeout_and_call`, and `allocate_and_call` when the pool
//! is empty).

use crate::message::{Message, MessageId};
use std::fmt;
use std::time::Duration;

/// What the dispatch loop does after a handler returns
pub struct Action<S, T> {
    pub(crate) kind: ActionKind<S, T>,
}

pub(crate) enum ActionKind<S, T> {
    Again(Message<T>),
    Call(S, Message<T>),
    Exit,
    Wait(S, Message<T>),
    Yield(S, Message<T>),
    Timeout(S, Message<T>, Duration),
    /// The item was handed to a collaborator that resubmits it later
    Suspend(S, MessageId),
}

impl<S, T> Action<S, T> {
    fn new(kind: ActionKind<S, T>) -> Self {
        Self { kind }
    }

    /// Run the current handler again with the same item
    pub fn again(msg: Message<T>) -> Self {
        Self::new(ActionKind::Again(msg))
    }

    /// Continue at `next` with the same item, without returning to the service
    pub fn call_immediately(next: S, msg: Message<T>) -> Self {
        Self::new(ActionKind::Call(next, msg))
    }

    /// Terminate the flow. The handler keeps responsibility for the item it
    /// received: forward it, or let it drop.
    pub fn exit() -> Self {
        Self::new(ActionKind::Exit)
    }

    /// Release `msg`, then terminate
    pub fn release_and_exit(msg: Message<T>) -> Self {
        msg.release();
        Self::exit()
    }

    /// Park `msg` as in-process and suspend until a notifier resubmits it.
    ///
    /// The flow resumes at `next`.
    pub fn wait_and_call(next: S, mut msg: Message<T>) -> Self {
        msg.mark_in_process();
        Self::new(ActionKind::Wait(next, msg))
    }

    /// Continue at `next`, but only after every other ready flow had a turn
    pub fn yield_and_call(next: S, mut msg: Message<T>) -> Self {
        msg.mark_in_process();
        Self::new(ActionKind::Yield(next, msg))
    }

    /// Arm the flow's deadline timer for `period` and continue at `next` on
    /// expiry or early trigger
    pub fn timeout_and_call(next: S, mut msg: Message<T>, period: Duration) -> Self {
        msg.mark_in_process();
        Self::new(ActionKind::Timeout(next, msg, period))
    }

    pub(crate) fn suspend(next: S, id: MessageId) -> Self {
        Self::new(ActionKind::Suspend(next, id))
    }

    /// Whether the dispatch loop returns control to the service
    pub fn is_suspension(&self) -> bool {
        matches!(
            self.kind,
            ActionKind::Wait(..)
                | ActionKind::Yield(..)
                | ActionKind::Timeout(..)
                | ActionKind::Suspend(..)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ActionKind::Exit)
    }

    /// State the flow moves to, if this action names one
    pub fn next_state(&self) -> Option<&S> {
        match &self.kind {
            ActionKind::Call(next, _)
            | ActionKind::Wait(next, _)
            | ActionKind::Yield(next, _)
            | ActionKind::Timeout(next, _, _)
            | ActionKind::Suspend(next, _) => Some(next),
            ActionKind::Again(_) | ActionKind::Exit => None,
        }
    }

    fn label(&self) -> &'static str {
        match self.kind {
            ActionKind::Again(_) => "again",
            ActionKind::Call(..) => "call_immediately",
            ActionKind::Exit => "exit",
            ActionKind::Wait(..) => "wait_and_call",
            ActionKind::Yield(..) => "yield_and_call",
            ActionKind::Timeout(..) => "timeout_and_call",
            ActionKind::Suspend(..) => "allocate_and_call",
        }
    }
}

impl<S: fmt::Debug, T> fmt::Debug for Action<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.label())
            .field("next", &self.next_state())
            .finish()
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
