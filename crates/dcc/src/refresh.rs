// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background refresh loop
//!
//! [`RefreshLoop`] is a state flow that turns packet requests from the track
//! driver into filled buffers. Sources that were notified of a change are
//! served first, one packet per notification; otherwise the registered
//! refresh sources take turns. Registration and notifications travel as
//! messages on the control priority, so they overtake queued packet requests.

use crate::packet::Packet;
use crate::source::{PacketSource, SourceId};
use crate::update::UpdateLoop;
use rf_core::{
    Action, Attach, Clock, FlowAction, FlowContext, FlowError, FlowHandle, FlowOptions, Message,
    Pool, Pooled, Service, StateFlow,
};
use std::collections::VecDeque;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Bucket for registration changes and update notifications
pub const CONTROL_PRIORITY: usize = 0;
/// Bucket for packet requests from the track driver
pub const REFRESH_PRIORITY: usize = 1;

/// Work items accepted by a [`RefreshLoop`]
pub enum Request {
    AddSource(SourceId, Box<dyn PacketSource>),
    RemoveSource(SourceId),
    Update(SourceId, u32),
    /// Fill one packet; the buffer is attached once allocated
    Packet(Option<Pooled<Packet>>),
}

impl Attach<Packet> for Request {
    fn attach(&mut self, resource: Pooled<Packet>) {
        if let Request::Packet(slot) = self {
            *slot = Some(resource);
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::AddSource(id, _) => f.debug_tuple("AddSource").field(id).finish(),
            Request::RemoveSource(id) => f.debug_tuple("RemoveSource").field(id).finish(),
            Request::Update(id, code) => f.debug_tuple("Update").field(id).field(code).finish(),
            Request::Packet(buffer) => f.debug_tuple("Packet").field(&buffer.is_some()).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A buffer is attached; pick a source and fill it
    Fill,
    /// Refresh packet sent; runs after other ready flows had a turn
    Sent,
}

pub struct RefreshLoop {
    pool: Pool<Packet>,
    output: UnboundedSender<Pooled<Packet>>,
    sources: Vec<(SourceId, Box<dyn PacketSource>)>,
    /// Round-robin position in `sources`
    cursor: usize,
    pending: VecDeque<(SourceId, u32)>,
}

impl RefreshLoop {
    pub fn new(pool: Pool<Packet>, output: UnboundedSender<Pooled<Packet>>) -> Self {
        Self {
            pool,
            output,
            sources: Vec::new(),
            cursor: 0,
            pending: VecDeque::new(),
        }
    }

    /// Bind the loop to `service` with its two priority buckets
    pub fn spawn<C: Clock>(self, service: &mut Service<C>, name: &str) -> RefreshLoopHandle {
        let flow = service.spawn(self, FlowOptions::new(name).priorities(2));
        RefreshLoopHandle { flow }
    }

    fn add(&mut self, id: SourceId, source: Box<dyn PacketSource>) {
        match self.sources.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => {
                tracing::warn!(source = %id, "refresh source registered twice, replacing");
                slot.1 = source;
            }
            None => {
                tracing::debug!(source = %id, "refresh source added");
                self.sources.push((id, source));
            }
        }
    }

    fn remove(&mut self, id: SourceId) {
        let Some(index) = self.sources.iter().position(|(existing, _)| *existing == id) else {
            tracing::debug!(source = %id, "unknown refresh source not removed");
            return;
        };
        self.sources.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.pending.retain(|(pending, _)| *pending != id);
        tracing::debug!(source = %id, "refresh source removed");
    }

    /// Next source to serve, with the code to fill it for
    fn choose(&mut self) -> Option<(SourceId, u32)> {
        while let Some((id, code)) = self.pending.pop_front() {
            if self.sources.iter().any(|(existing, _)| *existing == id) {
                return Some((id, code));
            }
            tracing::debug!(source = %id, code, "update for unregistered source dropped");
        }
        if self.sources.is_empty() {
            return None;
        }
        let index = self.cursor % self.sources.len();
        self.cursor = index + 1;
        Some((self.sources[index].0, 0))
    }

    fn fill(&mut self, id: SourceId, code: u32, buffer: &mut Packet) {
        buffer.clear();
        if let Some((_, source)) = self.sources.iter_mut().find(|(existing, _)| *existing == id) {
            source.get_next_packet(code, buffer);
        }
        buffer.tag(id, code);
    }
}

impl StateFlow for RefreshLoop {
    type State = Stage;
    type Payload = Request;

    fn entry(&mut self, msg: Message<Request>, ctx: &mut FlowContext<'_, Request>) -> FlowAction<Self> {
        if matches!(msg.payload(), Request::Packet(_)) {
            return ctx.allocate_and_call(&self.pool, Stage::Fill, msg);
        }
        match msg.into_payload() {
            Request::AddSource(id, source) => self.add(id, source),
            Request::RemoveSource(id) => self.remove(id),
            Request::Update(id, code) => {
                tracing::trace!(source = %id, code, "update pending");
                self.pending.push_back((id, code));
            }
            Request::Packet(_) => {}
        }
        Action::exit()
    }

    fn handle(
        &mut self,
        state: Stage,
        mut msg: Message<Request>,
        _ctx: &mut FlowContext<'_, Request>,
    ) -> FlowAction<Self> {
        match state {
            Stage::Fill => {
                let Request::Packet(slot) = msg.payload_mut() else {
                    return Action::release_and_exit(msg);
                };
                let Some(mut buffer) = slot.take() else {
                    return Action::release_and_exit(msg);
                };
                let Some((id, code)) = self.choose() else {
                    tracing::trace!("no packet source registered");
                    return Action::release_and_exit(msg);
                };
                self.fill(id, code, &mut buffer);
                tracing::trace!(source = %id, code, packet = ?*buffer, "packet filled");
                if self.output.send(buffer).is_err() {
                    tracing::warn!(source = %id, "track output closed, packet dropped");
                }
                if code == 0 {
                    Action::yield_and_call(Stage::Sent, msg)
                } else {
                    Action::release_and_exit(msg)
                }
            }
            Stage::Sent => Action::release_and_exit(msg),
        }
    }
}

/// Send side of a [`RefreshLoop`], usable from any thread
#[derive(Clone, Debug)]
pub struct RefreshLoopHandle {
    flow: FlowHandle<Request>,
}

impl RefreshLoopHandle {
    /// Ask for the next packet for the track
    pub fn request_packet(&self) -> Result<(), FlowError> {
        self.flow
            .send_with_priority(Message::new(Request::Packet(None)), REFRESH_PRIORITY)
    }

    pub fn flow(&self) -> &FlowHandle<Request> {
        &self.flow
    }

    fn control(&self, request: Request) -> Result<(), FlowError> {
        self.flow
            .send_with_priority(Message::new(request), CONTROL_PRIORITY)
    }
}

impl UpdateLoop for RefreshLoopHandle {
    fn notify_update(&self, source: SourceId, code: u32) -> Result<(), FlowError> {
        assert!(code != 0, "update code for {source} must be nonzero");
        self.control(Request::Update(source, code))
    }

    fn add_refresh_source(
        &self,
        id: SourceId,
        source: Box<dyn PacketSource>,
    ) -> Result<(), FlowError> {
        self.control(Request::AddSource(id, source))
    }

    fn remove_refresh_source(&self, id: SourceId) -> Result<(), FlowError> {
        self.control(Request::RemoveSource(id))
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
