// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-capacity packet buffers

use crate::source::SourceId;
use rf_core::Pool;
use std::fmt;

/// Longest packet a source may write, in bytes
pub const MAX_PACKET_LEN: usize = 6;

/// A packet buffer as handed out by a packet pool
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Packet {
    data: [u8; MAX_PACKET_LEN],
    len: usize,
    source: Option<SourceId>,
    code: u32,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool of `count` empty buffers
    pub fn pool(name: impl Into<String>, count: usize) -> Pool<Packet> {
        Pool::new(name, (0..count).map(|_| Packet::new()))
    }

    /// Overwrite the packet contents
    pub fn set_payload(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= MAX_PACKET_LEN,
            "packet of {} bytes exceeds {MAX_PACKET_LEN}",
            bytes.len()
        );
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Source that filled this buffer, if any
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Update code the buffer was filled for; zero for routine refresh
    pub fn code(&self) -> u32 {
        self.code
    }

    pub(crate) fn tag(&mut self, source: SourceId, code: u32) {
        self.source = Some(source);
        self.code = code;
    }

    /// Reset to an empty, untagged buffer
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("payload", &self.payload())
            .field("source", &self.source)
            .field("code", &self.code)
            .finish()
    }
}

#[cfg(test)]
#[path = "packet_tests.rs"]
mod tests;
