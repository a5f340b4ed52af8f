// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config validation specs
//!
//! Verify `rfd --check-config` accepts good files and rejects bad ones.

use crate::prelude::*;

#[test]
fn check_config_accepts_empty_file() {
    let node = Node::with_config("");

    node.rfd()
        .args(["--check-config", "rfd.toml"])
        .passes()
        .stdout_has("config ok");
}

#[test]
fn check_config_accepts_full_file() {
    let node = Node::with_config(
        r#"
[node]
name = "yard"
workers = 2

[refresh]
interval = "5ms"
packet_buffers = 3
sources = 4
"#,
    );

    node.rfd()
        .args(["--check-config", "rfd.toml"])
        .passes()
        .stdout_has("config ok")
        .stdout_lacks("READY");
}

#[test]
fn check_config_rejects_zero_workers() {
    let node = Node::with_config("[node]\nworkers = 0\n");

    node.rfd()
        .args(["--check-config", "rfd.toml"])
        .fails()
        .stderr_has("node.workers");
}

#[test]
fn check_config_rejects_malformed_toml() {
    let node = Node::with_config("[refresh\n");

    node.rfd()
        .args(["--check-config", "rfd.toml"])
        .fails()
        .stdout_lacks("config ok");
}

#[test]
fn check_config_reports_missing_file() {
    let node = Node::empty();

    node.rfd()
        .args(["--check-config", "absent.toml"])
        .fails()
        .stderr_has("absent.toml");
}

#[test]
fn check_config_requires_a_path() {
    Node::empty().rfd().args(["--check-config"]).fails();
}
