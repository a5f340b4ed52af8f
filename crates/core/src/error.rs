// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for flow delivery
//!
//! Misuse of the dispatch contract (re-entrant resumption, double arming of a
//! timer) is asserted, not reported here.

use crate::flow::FlowId;
use thiserror::Error;

/// Errors returned when delivering work to a flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The flow was removed from its service; the message was released
    #[error("flow {0} is closed")]
    Closed(FlowId),
}
