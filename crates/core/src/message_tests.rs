// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_message_is_fresh() {
    let msg = Message::new("payload");
    assert!(!msg.is_in_process());
    assert_eq!(msg.priority_hint(), 0);
    assert_eq!(*msg.payload(), "payload");
}

#[test]
fn message_ids_are_unique() {
    let a = Message::new(());
    let b = Message::new(());
    assert_ne!(a.id(), b.id());
}

#[test]
fn in_process_flag_round_trips() {
    let mut msg = Message::new(1u32);
    msg.mark_in_process();
    assert!(msg.is_in_process());
    msg.clear_in_process();
    assert!(!msg.is_in_process());
}

#[test]
fn priority_hint_is_settable() {
    let mut msg = Message::new(()).with_priority(3);
    assert_eq!(msg.priority_hint(), 3);
    msg.set_priority(1);
    assert_eq!(msg.priority_hint(), 1);
}

#[test]
fn payload_is_mutable_and_extractable() {
    let mut msg = Message::new(vec![1u8]);
    msg.payload_mut().push(2);
    assert_eq!(msg.into_payload(), vec![1, 2]);
}

#[test]
fn release_drops_payload() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tracked(Arc<AtomicUsize>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let msg = Message::new(Tracked(drops.clone()));
    msg.release();
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn display_names_message() {
    assert_eq!(MessageId(7).to_string(), "msg-7");
}
