// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node configuration file.
//!
//! ```toml
//! [node]
//! name = "yard"
//! workers = 2
//!
//! [refresh]
//! interval = "10ms"
//! packet_buffers = 4
//! sources = 2
//!
//! [log]
//! filter = "rf_core=debug,info"
//! file = "/var/log/rfd.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading or validating a node configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    pub node: NodeSection,
    pub refresh: RefreshSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeSection {
    /// Prefix for worker service names
    pub name: String,
    /// Services to run, each on its own blocking thread
    pub workers: usize,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            name: "railflow".to_string(),
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshSection {
    /// Time between packet requests from the track driver
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Packet buffers per worker
    pub packet_buffers: usize,
    /// Idle refresh sources registered per worker
    pub sources: usize,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            packet_buffers: 4,
            sources: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    pub filter: Option<String>,
    /// Log to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl NodeConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.workers == 0 {
            return Err(ConfigError::Invalid("node.workers must be at least 1".into()));
        }
        if self.refresh.packet_buffers == 0 {
            return Err(ConfigError::Invalid(
                "refresh.packet_buffers must be at least 1".into(),
            ));
        }
        if self.refresh.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "refresh.interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
