// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-core: cooperative state-flow runtime for railflow nodes
//!
//! This crate provides:
//! - Move-only messages and per-flow priority buckets
//! - State flows driven by handler-returned actions
//! - Services that run flows one activation at a time
//! - Deadline timers, notifiers and FIFO resource pools for suspensions

pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod flow;
pub mod handle;
pub mod message;
pub mod pool;
pub mod qlist;
pub mod service;
pub mod timer;

pub use action::Action;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::ServiceConfig;
pub use error::FlowError;
pub use flow::{FlowAction, FlowContext, FlowId, FlowOptions, StateFlow};
pub use handle::{FlowHandle, FlowStats, Notifier};
pub use message::{Message, MessageId};
pub use pool::{Allocation, Attach, Pool, Pooled};
pub use qlist::PriorityQueues;
pub use service::{Service, ShutdownHandle};
pub use timer::{DeadlineTimer, TimerEntry, TimerQueue};
