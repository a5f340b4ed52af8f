// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-daemon: node process hosting railflow services

pub mod config;
pub mod driver;
pub mod lifecycle;

pub use config::{ConfigError, NodeConfig};
pub use lifecycle::{startup, LifecycleError, Node, NodeReport};
