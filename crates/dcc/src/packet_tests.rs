// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_packet_is_empty() {
    let packet = Packet::new();
    assert!(packet.is_empty());
    assert_eq!(packet.payload(), &[] as &[u8]);
    assert_eq!(packet.source(), None);
    assert_eq!(packet.code(), 0);
}

#[test]
fn payload_replaces_previous_contents() {
    let mut packet = Packet::new();
    packet.set_payload(&[1, 2, 3, 4]);
    packet.set_payload(&[9, 8]);
    assert_eq!(packet.payload(), &[9, 8]);
}

#[test]
fn clear_drops_tag_and_payload() {
    let mut packet = Packet::new();
    packet.set_payload(&[0xff]);
    packet.tag(SourceId(4), 2);
    packet.clear();
    assert_eq!(packet, Packet::new());
}

#[test]
#[should_panic(expected = "exceeds")]
fn oversized_payload_is_rejected() {
    Packet::new().set_payload(&[0; MAX_PACKET_LEN + 1]);
}

#[test]
fn pool_holds_requested_buffers() {
    let pool = Packet::pool("packets", 4);
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.name(), "packets");
}
