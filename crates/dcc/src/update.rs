// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control surface of a packet update loop

use crate::source::{PacketSource, SourceId};
use rf_core::FlowError;

/// Registry of refresh sources plus the update notifications that
/// prioritize them.
///
/// Notifying a source moves it ahead of the routine refresh rotation for
/// one packet.
pub trait UpdateLoop {
    /// Ask for a prompt packet from `source`. `code` must be nonzero and is
    /// handed back to the source when it fills the packet.
    fn notify_update(&self, source: SourceId, code: u32) -> Result<(), FlowError>;

    /// Add `source` to the background refresh rotation
    fn add_refresh_source(
        &self,
        id: SourceId,
        source: Box<dyn PacketSource>,
    ) -> Result<(), FlowError>;

    fn remove_refresh_source(&self, id: SourceId) -> Result<(), FlowError>;
}
