// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Track driver pacing flow.
//!
//! Requests one packet from the refresh loop every interval. A single
//! message circulates through the flow's deadline timer for as long as the
//! service runs.

use rf_core::{
    Action, Clock, FlowAction, FlowContext, FlowError, FlowHandle, FlowOptions, Message, Service,
    StateFlow,
};
use rf_dcc::RefreshLoopHandle;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Tick,
}

pub struct Driver {
    refresh: RefreshLoopHandle,
    interval: Duration,
}

impl Driver {
    pub fn new(refresh: RefreshLoopHandle, interval: Duration) -> Self {
        Self { refresh, interval }
    }

    /// Spawn on `service` and send the circulating tick
    pub fn start<C: Clock>(self, service: &mut Service<C>) -> Result<FlowHandle<()>, FlowError> {
        let handle = service.spawn(self, FlowOptions::new("driver").with_timer());
        handle.send(Message::new(()))?;
        Ok(handle)
    }

    fn tick(&self, msg: Message<()>) -> FlowAction<Self> {
        if let Err(e) = self.refresh.request_packet() {
            tracing::warn!(error = %e, "refresh loop gone, driver stopping");
            return Action::release_and_exit(msg);
        }
        Action::timeout_and_call(Pace::Tick, msg, self.interval)
    }
}

impl StateFlow for Driver {
    type State = Pace;
    type Payload = ();

    fn entry(&mut self, msg: Message<()>, _ctx: &mut FlowContext<'_, ()>) -> FlowAction<Self> {
        tracing::debug!(interval = ?self.interval, "driver started");
        self.tick(msg)
    }

    fn handle(&mut self, _state: Pace, msg: Message<()>, _ctx: &mut FlowContext<'_, ()>) -> FlowAction<Self> {
        self.tick(msg)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
