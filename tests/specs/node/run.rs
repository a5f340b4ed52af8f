// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node run specs
//!
//! Verify the daemon starts its workers, reports readiness, and prints the
//! packet count when it stops.

use crate::prelude::*;

#[test]
fn run_for_prints_ready_and_packet_count() {
    let node = Node::with_config("[refresh]\ninterval = \"2ms\"\n");

    let outcome = node
        .rfd()
        .args(["rfd.toml", "--run-for", "300ms"])
        .passes()
        .stdout_has("READY")
        .stdout_has("packets: ");

    assert!(outcome.packets() > 0);
}

#[test]
fn runs_with_builtin_defaults() {
    Node::empty()
        .rfd()
        .args(["--run-for", "100ms"])
        .passes()
        .stdout_has("READY");
}

#[test]
fn node_without_sources_sends_nothing() {
    let node = Node::with_config("[refresh]\nsources = 0\ninterval = \"2ms\"\n");

    let outcome = node
        .rfd()
        .args(["rfd.toml", "--run-for", "100ms"])
        .passes();

    assert_eq!(outcome.packets(), 0);
}

#[test]
fn log_file_receives_startup_line() {
    let node = Node::empty();
    let log = node.path().join("logs").join("rfd.log");
    std::fs::write(
        node.config_path(),
        format!("[log]\nfilter = \"info\"\nfile = {:?}\n", log.display().to_string()),
    )
    .unwrap();

    node.rfd()
        .env_remove("RUST_LOG")
        .args(["rfd.toml", "--run-for", "50ms"])
        .passes()
        .stdout_has("READY");

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("Starting rfd"), "log was:\n{text}");
}

#[test]
fn invalid_config_stops_before_ready() {
    let node = Node::with_config("[refresh]\npacket_buffers = 0\n");

    node.rfd()
        .args(["rfd.toml", "--run-for", "50ms"])
        .fails()
        .stdout_lacks("READY")
        .stderr_has("refresh.packet_buffers");
}
