// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution context that runs state flows cooperatively
//!
//! A [`Service`] owns a disjoint set of flows and runs them one activation
//! at a time on the calling thread. Flows become ready when work is sent to
//! them, when a suspension resolves, or when their timer expires. Several
//! services can run on separate threads; only pools and flow handles cross
//! between them.

use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::flow::{Dispatch, FlowId, FlowOptions, FlowSlot, StateFlow};
use crate::handle::{FlowHandle, Inbox};
use crate::timer::TimerQueue;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct ReadyState {
    flows: VecDeque<FlowId>,
    shutdown: bool,
}

/// Flows waiting for a turn, shared between a service and its handles
#[derive(Default)]
pub(crate) struct ReadySet {
    state: Mutex<ReadyState>,
    signal: Condvar,
}

impl ReadySet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, flow: FlowId) {
        self.lock().flows.push_back(flow);
        self.signal.notify_one();
    }

    pub(crate) fn pop(&self) -> Option<FlowId> {
        self.lock().flows.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().flows.len()
    }

    pub(crate) fn shutdown(&self) {
        self.lock().shutdown = true;
        self.signal.notify_all();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    /// Block until a flow is ready, shutdown is requested, or `timeout` passes
    pub(crate) fn wait(&self, timeout: Duration) {
        let state = self.lock();
        if !state.flows.is_empty() || state.shutdown {
            return;
        }
        let _ = self
            .signal
            .wait_timeout(state, timeout)
            .unwrap_or_else(|e| e.into_inner());
    }

    fn lock(&self) -> MutexGuard<'_, ReadyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Stops a running [`Service::run`] loop from any thread
#[derive(Clone)]
pub struct ShutdownHandle {
    ready: Arc<ReadySet>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.ready.shutdown();
    }

    pub fn is_shutdown(&self) -> bool {
        self.ready.is_shutdown()
    }
}

/// Cooperative run loop over a set of flows
pub struct Service<C: Clock = SystemClock> {
    config: ServiceConfig,
    clock: C,
    flows: BTreeMap<FlowId, Box<dyn Dispatch>>,
    ready: Arc<ReadySet>,
    timers: TimerQueue,
    next_id: u64,
}

impl Service<SystemClock> {
    pub fn with_system_clock(config: ServiceConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> Service<C> {
    pub fn new(config: ServiceConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            flows: BTreeMap::new(),
            ready: Arc::new(ReadySet::new()),
            timers: TimerQueue::new(),
            next_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Bind `flow` to this service and return its send handle
    pub fn spawn<F: StateFlow>(&mut self, flow: F, options: FlowOptions) -> FlowHandle<F::Payload> {
        let id = FlowId(self.next_id);
        self.next_id += 1;
        let priorities = options
            .priorities
            .unwrap_or(self.config.default_priorities);
        let inbox = Inbox::new(priorities, options.timer);
        let handle = FlowHandle::new(id, &options.name, inbox, Arc::clone(&self.ready));
        tracing::debug!(
            service = %self.config.name,
            flow = %options.name,
            %id,
            priorities,
            timer = options.timer,
            "flow spawned"
        );
        self.flows
            .insert(id, Box::new(FlowSlot::new(flow, handle.clone())));
        handle
    }

    /// Unbind a flow, disarming its timer and releasing everything it owns
    pub fn remove(&mut self, id: FlowId) -> bool {
        let Some(mut flow) = self.flows.remove(&id) else {
            return false;
        };
        flow.close();
        self.timers.forget(id);
        true
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Flows currently waiting for a turn
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        self.timers.next_deadline()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            ready: Arc::clone(&self.ready),
        }
    }

    /// Deliver every timer expiry that is due; returns how many fired
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        for entry in self.timers.poll(now) {
            if let Some(flow) = self.flows.get_mut(&entry.flow) {
                if flow.expire(entry.generation) {
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Run one ready flow for one activation.
    ///
    /// Returns false when nothing was ready.
    pub fn run_once(&mut self) -> bool {
        self.poll_timers();
        let Some(id) = self.ready.pop() else {
            return false;
        };
        let now = self.clock.now();
        match self.flows.get_mut(&id) {
            Some(flow) => {
                flow.run(&mut self.timers, now);
            }
            None => tracing::trace!(%id, "ready entry for removed flow skipped"),
        }
        true
    }

    /// Run activations until no flow is ready and no timer is due.
    ///
    /// Returns the number of activations. A flow that yields forever keeps
    /// this from returning.
    pub fn run_until_idle(&mut self) -> usize {
        let mut activations = 0;
        while self.run_once() {
            activations += 1;
        }
        activations
    }

    /// Host loop: run flows until [`ShutdownHandle::shutdown`] is called
    pub fn run(&mut self) {
        tracing::info!(service = %self.config.name, flows = self.flows.len(), "service running");
        while !self.ready.is_shutdown() {
            if self.run_once() {
                continue;
            }
            let mut wait = self.config.idle_wait;
            if let Some(deadline) = self.timers.next_deadline() {
                wait = wait.min(deadline.saturating_duration_since(self.clock.now()));
            }
            self.ready.wait(wait);
        }
        tracing::info!(service = %self.config.name, "service stopped");
    }
}

impl<C: Clock> Drop for Service<C> {
    fn drop(&mut self) {
        for flow in self.flows.values_mut() {
            flow.close();
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
