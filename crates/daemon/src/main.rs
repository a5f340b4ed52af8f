// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Railflow node daemon (rfd)
//!
//! Runs one cooperative service per worker thread and feeds the track
//! output until signalled.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rf_daemon::{lifecycle, LifecycleError, NodeConfig};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "rfd", version, about = "Railflow node daemon")]
struct Args {
    /// Node configuration file (built-in defaults when omitted)
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long, requires = "config")]
    check_config: bool,

    /// Stop after this long, e.g. "500ms" or "2s"
    #[arg(long, value_parser = humantime::parse_duration)]
    run_for: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };

    if args.check_config {
        println!("config ok");
        return Ok(());
    }

    // Held for the process lifetime so buffered log lines are flushed on exit
    let _log_guard = setup_logging(&config)?;

    info!(node = %config.node.name, "Starting rfd");

    let node = match lifecycle::startup(&config) {
        Ok(node) => node,
        Err(e) => {
            error!("Failed to start node: {}", e);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(workers = node.worker_count(), "Node ready");
    println!("READY");
    std::io::stdout().flush()?;

    let deadline = async {
        match args.run_for {
            Some(period) => tokio::time::sleep(period).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        _ = deadline => info!("Run time elapsed, shutting down..."),
    }

    let report = node.shutdown().await?;
    println!("packets: {}", report.packets());

    info!("Node stopped");
    Ok(())
}

fn setup_logging(
    config: &NodeConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log.filter.as_deref().unwrap_or("info"))
    });

    let Some(log_path) = &config.log.file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file {} has no file name", log_path.display()),
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}
