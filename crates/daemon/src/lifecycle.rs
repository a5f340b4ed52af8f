// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node lifecycle: worker startup and shutdown.

use std::time::Instant;

use rf_core::{FlowError, Service, ServiceConfig, ShutdownHandle};
use rf_dcc::{IdleSource, Packet, RefreshLoop, SourceId, UpdateLoop};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{ConfigError, NodeConfig};
use crate::driver::Driver;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("worker {name} failed: {source}")]
    Worker {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One service thread with its refresh loop, driver and packet consumer
struct Worker {
    name: String,
    shutdown: ShutdownHandle,
    service: JoinHandle<()>,
    consumer: JoinHandle<u64>,
}

/// Packets delivered to the track, per worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeReport {
    pub workers: Vec<(String, u64)>,
}

impl NodeReport {
    pub fn packets(&self) -> u64 {
        self.workers.iter().map(|(_, count)| count).sum()
    }
}

/// A running node
pub struct Node {
    workers: Vec<Worker>,
    start_time: Instant,
}

/// Start every worker described by `config`.
///
/// Must be called from within a tokio runtime.
pub fn startup(config: &NodeConfig) -> Result<Node, LifecycleError> {
    config.validate()?;
    let mut workers = Vec::with_capacity(config.node.workers);
    for index in 0..config.node.workers {
        match start_worker(config, index) {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                for worker in &workers {
                    worker.shutdown.shutdown();
                }
                return Err(e);
            }
        }
    }
    info!(
        node = %config.node.name,
        workers = workers.len(),
        interval = ?config.refresh.interval,
        "node started"
    );
    Ok(Node {
        workers,
        start_time: Instant::now(),
    })
}

fn start_worker(config: &NodeConfig, index: usize) -> Result<Worker, LifecycleError> {
    let name = format!("{}-{}", config.node.name, index);
    let mut service = Service::with_system_clock(ServiceConfig::new(&name));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let pool = Packet::pool(format!("{name}-packets"), config.refresh.packet_buffers);
    let refresh = RefreshLoop::new(pool, tx).spawn(&mut service, "refresh");
    for source in 0..config.refresh.sources {
        refresh.add_refresh_source(SourceId(source as u32), Box::new(IdleSource))?;
    }
    Driver::new(refresh, config.refresh.interval).start(&mut service)?;

    let shutdown = service.shutdown_handle();
    let service = tokio::task::spawn_blocking(move || service.run());

    // Stands in for the track output stage
    let consumer = tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(packet) = rx.recv().await {
            tracing::trace!(?packet, "packet on track");
            count += 1;
        }
        count
    });

    Ok(Worker {
        name,
        shutdown,
        service,
        consumer,
    })
}

impl Node {
    /// Stop every worker and collect packet counts
    pub async fn shutdown(self) -> Result<NodeReport, LifecycleError> {
        info!("Shutting down node...");
        for worker in &self.workers {
            worker.shutdown.shutdown();
        }

        let mut report = NodeReport::default();
        for worker in self.workers {
            worker
                .service
                .await
                .map_err(|source| LifecycleError::Worker {
                    name: worker.name.clone(),
                    source,
                })?;
            // The consumer ends once the stopped service drops its refresh loop
            let count = match worker.consumer.await {
                Ok(count) => count,
                Err(e) => {
                    warn!(worker = %worker.name, error = %e, "packet consumer failed");
                    0
                }
            };
            info!(worker = %worker.name, packets = count, "worker stopped");
            report.workers.push((worker.name, count));
        }

        info!(
            elapsed_ms = self.start_time.elapsed().as_millis() as u64,
            packets = report.packets(),
            "node shutdown complete"
        );
        Ok(report)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
