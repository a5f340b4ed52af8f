// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producers of track packets

use crate::packet::Packet;
use std::fmt;

/// Key a packet source is registered under in an update loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src-{}", self.0)
    }
}

/// Something that knows how to fill the next packet for one train or
/// accessory
pub trait PacketSource: Send {
    /// Write the next packet into `packet`.
    ///
    /// `code` is zero for routine refresh, otherwise the value passed to
    /// [`UpdateLoop::notify_update`](crate::UpdateLoop::notify_update).
    fn get_next_packet(&mut self, code: u32, packet: &mut Packet);
}

/// Source that always produces the idle packet
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleSource;

impl IdleSource {
    pub const IDLE: [u8; 3] = [0xff, 0x00, 0xff];
}

impl PacketSource for IdleSource {
    fn get_next_packet(&mut self, _code: u32, packet: &mut Packet) {
        packet.set_payload(&Self::IDLE);
    }
}
