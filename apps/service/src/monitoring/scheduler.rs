use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::prober::ProbeExecutor;
use super::reconciler::OutcomeReconciler;
use super::validator::validate_check;
use crate::storage::Store;

/// Drives the scan loop: on every tick, fan all stored checks through
/// validate -> probe -> reconcile.
pub struct ScanScheduler {
    store: Arc<dyn Store>,
    prober: Arc<ProbeExecutor>,
    reconciler: Arc<OutcomeReconciler>,
    interval: Duration,
}

impl ScanScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        prober: Arc<ProbeExecutor>,
        reconciler: Arc<OutcomeReconciler>,
        interval: Duration,
    ) -> Self {
        Self { store, prober, reconciler, interval }
    }

    /// Run the scan loop forever: once immediately, then on every interval
    /// tick. Cycles are spawned, not awaited, so a slow cycle never delays
    /// the next tick; overlapping cycles are tolerated and in-flight probes
    /// from a previous cycle complete and reconcile on their own.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(self.interval);
            loop {
                timer.tick().await;
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move { scheduler.run_cycle().await });
            }
        })
    }

    /// One scan cycle. Every check runs in its own task; failures are
    /// isolated per check and never abort the cycle.
    pub async fn run_cycle(self: Arc<Self>) {
        let ids = match self.store.list("checks").await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "could not list checks for this scan cycle");
                return;
            }
        };
        if ids.is_empty() {
            info!("no checks to process");
            return;
        }

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move { scheduler.process_check(id).await })
            })
            .collect();
        join_all(tasks).await;
    }

    async fn process_check(&self, id: String) {
        let record = match self.store.read("checks", &id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(check = %id, error = %err, "could not read check data");
                return;
            }
        };

        let check = match validate_check(&record) {
            Ok(check) => check,
            Err(err) => {
                warn!(check = %id, error = %err, "check is not properly formatted, skipping");
                return;
            }
        };

        let outcome = self.prober.probe(&check).await;
        if let Err(err) = self.reconciler.reconcile(&check, outcome).await {
            error!(check = %id, error = %err, "could not reconcile probe outcome");
        }
    }
}
