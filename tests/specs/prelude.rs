// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon specs

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// The `rfd` binary in this test run's target directory.
///
/// Built on first use: the binary belongs to another workspace member, so
/// building this package alone does not produce it.
fn rfd_binary() -> &'static Path {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| {
        // <target>/<profile>/deps/specs-<hash>
        let exe = std::env::current_exe().unwrap();
        let profile_dir = exe.parent().and_then(Path::parent).unwrap();
        let target_dir = profile_dir.parent().unwrap();

        let mut build = std::process::Command::new(env!("CARGO"));
        build
            .args(["build", "--quiet", "-p", "rf-daemon", "--bin", "rfd", "--target-dir"])
            .arg(target_dir)
            .current_dir(env!("CARGO_MANIFEST_DIR"));
        if profile_dir.file_name().is_some_and(|name| name == "release") {
            build.arg("--release");
        }
        let status = build.status().unwrap();
        assert!(status.success(), "building rfd failed: {status}");

        profile_dir.join(format!("rfd{}", std::env::consts::EXE_SUFFIX))
    })
}

/// A scratch directory holding a node configuration
pub struct Node {
    dir: TempDir,
}

impl Node {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Node with `rfd.toml` containing `text`
    pub fn with_config(text: &str) -> Self {
        let node = Self::empty();
        std::fs::write(node.config_path(), text).unwrap();
        node
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("rfd.toml")
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn rfd(&self) -> Rfd {
        let mut cmd = Command::new(rfd_binary());
        cmd.current_dir(self.dir.path())
            .env("RUST_LOG", "warn")
            .timeout(std::time::Duration::from_secs(30));
        Rfd { cmd }
    }
}

pub struct Rfd {
    cmd: Command,
}

impl Rfd {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env_remove(mut self, key: &str) -> Self {
        self.cmd.env_remove(key);
        self
    }

    pub fn passes(mut self) -> Outcome {
        Outcome {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> Outcome {
        Outcome {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct Outcome {
    assert: Assert,
}

impl Outcome {
    pub fn stdout_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(needle)),
        }
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(needle).not()),
        }
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(needle)),
        }
    }

    /// Packet count printed at shutdown
    pub fn packets(&self) -> u64 {
        let stdout = String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned();
        stdout
            .lines()
            .find_map(|line| line.strip_prefix("packets: "))
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or_else(|| panic!("no packet count in stdout:\n{stdout}"))
    }
}
