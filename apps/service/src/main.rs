mod config;
mod logs;
mod models;
mod monitoring;
mod notify;
mod storage;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, level_filters::LevelFilter};

use crate::config::Config;
use crate::logs::{FileLogStore, LogArchiver, LogStore};
use crate::monitoring::{OutcomeReconciler, ProbeExecutor, ScanScheduler};
use crate::notify::{Notifier, TwilioNotifier};
use crate::storage::{FileStore, Store};

#[derive(Parser)]
#[command(name = "upwatch-service", about = "Uptime monitoring worker", version)]
struct Args {
    /// Path to the TOML config file (defaults to the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_config(args.config)?;

    let level = config.log_level.parse().unwrap_or(LevelFilter::INFO);
    telemetry::init_with_level(level);
    info!("{config}");

    let store: Arc<dyn Store> = Arc::new(FileStore::new(&config.storage.data_dir));
    let logs: Arc<dyn LogStore> = Arc::new(FileLogStore::new(&config.storage.logs_dir));
    let notifier: Arc<dyn Notifier> = Arc::new(TwilioNotifier::new(&config.twilio)?);
    let prober = Arc::new(ProbeExecutor::new()?);
    let reconciler = Arc::new(OutcomeReconciler::new(store.clone(), notifier, logs.clone()));

    let scheduler = Arc::new(ScanScheduler::new(
        store,
        prober,
        reconciler,
        Duration::from_secs(config.worker.scan_interval_seconds),
    ));
    let archiver = Arc::new(LogArchiver::new(
        logs,
        Duration::from_secs(config.worker.archive_interval_seconds),
    ));

    let _scan_loop = scheduler.spawn();
    let _archive_loop = archiver.spawn();
    info!("upwatch worker started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, exiting");
    Ok(())
}
