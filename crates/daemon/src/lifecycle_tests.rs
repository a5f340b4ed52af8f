// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn config(workers: usize) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.node.name = "test".into();
    config.node.workers = workers;
    config.refresh.interval = Duration::from_millis(2);
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn workers_produce_packets_until_shutdown() {
    let node = startup(&config(2)).unwrap();
    assert_eq!(node.worker_count(), 2);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = node.shutdown().await.unwrap();

    assert_eq!(report.workers.len(), 2);
    assert_eq!(report.workers[0].0, "test-0");
    assert_eq!(report.workers[1].0, "test-1");
    assert!(report.workers.iter().all(|(_, count)| *count > 0), "{report:?}");
    assert_eq!(
        report.packets(),
        report.workers[0].1 + report.workers[1].1
    );
}

#[tokio::test]
async fn invalid_config_is_refused() {
    let mut config = config(1);
    config.refresh.packet_buffers = 0;
    let err = startup(&config).err().unwrap();
    assert!(matches!(err, LifecycleError::Config(ConfigError::Invalid(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn node_without_sources_stops_cleanly() {
    let mut config = config(1);
    config.refresh.sources = 0;
    let node = startup(&config).unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let report = node.shutdown().await.unwrap();

    assert_eq!(report.packets(), 0);
}
