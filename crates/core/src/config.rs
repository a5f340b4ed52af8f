// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service construction settings.
//!
//! Mirrors the `[service]` style of node configuration files. Every field is
//! optional in TOML and falls back to the defaults below.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

const DEFAULT_PRIORITIES: usize = 1;
const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(100);

/// Settings for one [`Service`](crate::Service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Label used in log fields
    pub name: String,
    /// Priority buckets for flows spawned without an explicit count
    #[serde(deserialize_with = "at_least_one")]
    pub default_priorities: usize,
    /// Longest the run loop sleeps when nothing is ready and no timer is due
    #[serde(with = "humantime_serde")]
    pub idle_wait: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "service".to_string(),
            default_priorities: DEFAULT_PRIORITIES,
            idle_wait: DEFAULT_IDLE_WAIT,
        }
    }
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_default_priorities(mut self, priorities: usize) -> Self {
        assert!(priorities > 0, "a service needs at least one priority bucket");
        self.default_priorities = priorities;
        self
    }

    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let priorities = usize::deserialize(deserializer)?;
    if priorities == 0 {
        return Err(D::Error::custom("a service needs at least one priority bucket"));
    }
    Ok(priorities)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
