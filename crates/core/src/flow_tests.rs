// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::ServiceConfig;
use crate::pool::Pooled;
use crate::service::Service;
use std::sync::{Arc, Mutex};

#[test]
fn flow_id_display() {
    assert_eq!(FlowId(12).to_string(), "flow-12");
}

#[test]
fn options_builder() {
    let options = FlowOptions::new("refresh").priorities(2).with_timer();
    assert_eq!(options.name, "refresh");
    assert_eq!(options.priorities, Some(2));
    assert!(options.timer);

    let plain = FlowOptions::new("plain");
    assert_eq!(plain.priorities, None);
    assert!(!plain.timer);
}

struct Buffer {
    label: &'static str,
    slot: Option<Pooled<u32>>,
}

impl Attach<u32> for Buffer {
    fn attach(&mut self, resource: Pooled<u32>) {
        self.slot = Some(resource);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Filled,
}

/// Allocates a buffer and records which resource each label received
struct Filler {
    pool: Pool<u32>,
    seen: Arc<Mutex<Vec<(&'static str, u32)>>>,
}

impl StateFlow for Filler {
    type State = Fill;
    type Payload = Buffer;

    fn entry(&mut self, msg: Message<Buffer>, ctx: &mut FlowContext<'_, Buffer>) -> FlowAction<Self> {
        ctx.allocate_and_call(&self.pool, Fill::Filled, msg)
    }

    fn handle(
        &mut self,
        state: Fill,
        msg: Message<Buffer>,
        _ctx: &mut FlowContext<'_, Buffer>,
    ) -> FlowAction<Self> {
        assert_eq!(state, Fill::Filled);
        assert!(!msg.is_in_process());
        let buffer = msg.payload();
        let value = buffer.slot.as_deref().copied().unwrap_or_default();
        self.seen.lock().unwrap().push((buffer.label, value));
        Action::release_and_exit(msg)
    }
}

fn buffer(label: &'static str) -> Message<Buffer> {
    Message::new(Buffer { label, slot: None })
}

#[test]
fn allocation_with_free_resource_continues_in_same_activation() {
    let pool = Pool::new("bufs", [42u32]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut service = Service::with_system_clock(ServiceConfig::new("test"));
    let handle = service.spawn(
        Filler {
            pool: pool.clone(),
            seen: seen.clone(),
        },
        FlowOptions::new("filler"),
    );

    handle.send(buffer("a")).unwrap();

    assert_eq!(service.run_until_idle(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![("a", 42)]);
    assert_eq!(pool.available(), 1);
}

#[test]
fn exhausted_pool_suspends_until_release() {
    let pool = Pool::new("bufs", [9u32]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut service = Service::with_system_clock(ServiceConfig::new("test"));
    let handle = service.spawn(
        Filler {
            pool: pool.clone(),
            seen: seen.clone(),
        },
        FlowOptions::new("filler"),
    );
    let held = pool.try_allocate().unwrap();

    handle.send(buffer("a")).unwrap();
    handle.send(buffer("b")).unwrap();
    service.run_until_idle();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(pool.waiting(), 2);
    let stats = handle.stats();
    assert!(!stats.idle);
    assert_eq!(stats.suspended, 2);
    assert_eq!(stats.queued, 0);

    drop(held);
    service.run_until_idle();

    assert_eq!(*seen.lock().unwrap(), vec![("a", 9), ("b", 9)]);
    assert_eq!(pool.available(), 1);
    assert!(handle.stats().idle);
}
