use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::types::{LogRecord, ProbeOutcome};
use crate::logs::LogStore;
use crate::models::{Check, CheckState};
use crate::notify::Notifier;
use crate::storage::Store;

/// Turns a probe outcome into a persisted state transition and, when the
/// state flipped, an SMS alert.
pub struct OutcomeReconciler {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    logs: Arc<dyn LogStore>,
}

impl OutcomeReconciler {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, logs: Arc<dyn LogStore>) -> Self {
        Self { store, notifier, logs }
    }

    /// Derive the new state, record the probe, persist the updated check and
    /// alert the owner when warranted.
    pub async fn reconcile(&self, check: &Check, outcome: ProbeOutcome) -> Result<()> {
        let new_state = derive_state(check, &outcome);
        // A check that has never been probed has no prior state to compare
        // against, so its first outcome never alerts.
        let alert_warranted = check.last_checked.is_some() && check.state != new_state;
        let now = Utc::now().timestamp_millis();

        self.record(check, &outcome, new_state, alert_warranted, now).await;

        let mut updated = check.clone();
        updated.state = new_state;
        updated.last_checked = Some(now);

        // Update, never create: if the check vanished mid-cycle the outcome
        // is dropped with an error instead of resurrecting the record.
        let record = serde_json::to_value(&updated)?;
        self.store
            .update("checks", &updated.id, &record)
            .await
            .with_context(|| format!("could not persist outcome for check `{}`", updated.id))?;

        if alert_warranted {
            self.alert(&updated).await;
        } else {
            debug!(check = %updated.id, state = %new_state, "check state unchanged, no alert needed");
        }

        Ok(())
    }

    /// Append a structured record of this probe to the check's log stream.
    /// Log failures are reported but never fail the reconciliation.
    async fn record(
        &self,
        check: &Check,
        outcome: &ProbeOutcome,
        state: CheckState,
        alert_triggered: bool,
        timestamp: i64,
    ) {
        let record = LogRecord {
            check: check.clone(),
            outcome: outcome.clone(),
            state,
            alert_triggered,
            timestamp,
        };
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(err) = self.logs.append(&check.id, &line).await {
                    warn!(check = %check.id, error = %err, "could not append probe log record");
                }
            }
            Err(err) => {
                warn!(check = %check.id, error = %err, "could not serialize probe log record");
            }
        }
    }

    /// Best-effort SMS: a failed send is logged, not retried, and does not
    /// roll back the already-persisted state change.
    async fn alert(&self, check: &Check) {
        let message = format!(
            "Alert: your check for {} {} is currently {}",
            check.method.as_upper(),
            check.endpoint(),
            check.state
        );
        match self.notifier.send(&check.user_phone, &message).await {
            Ok(()) => {
                info!(check = %check.id, state = %check.state, "user alerted to status change via sms");
            }
            Err(err) => {
                error!(check = %check.id, error = %err, "could not send sms alert");
            }
        }
    }
}

/// A check is up iff the probe produced no error and a response code the
/// check accepts; every other combination is down.
pub fn derive_state(check: &Check, outcome: &ProbeOutcome) -> CheckState {
    match (&outcome.error, outcome.response_code) {
        (None, Some(code)) if check.accepts(code) => CheckState::Up,
        _ => CheckState::Down,
    }
}
