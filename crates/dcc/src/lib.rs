// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-dcc: track packet generation driven by the state-flow runtime
//!
//! Packet encodings are left to the sources; this crate only decides which
//! source fills the next buffer and hands filled buffers to the track driver.

pub mod packet;
pub mod refresh;
pub mod source;
pub mod update;

pub use packet::{Packet, MAX_PACKET_LEN};
pub use refresh::{RefreshLoop, RefreshLoopHandle, Request};
pub use source::{IdleSource, PacketSource, SourceId};
pub use update::UpdateLoop;
