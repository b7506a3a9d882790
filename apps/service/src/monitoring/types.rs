use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Check, CheckState};

const TIMEOUT_CAUSE: &str = "timeout";

/// Why a probe produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub cause: String,
}

/// The result of one probe attempt. Exactly one of `error` or
/// `response_code` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
}

impl ProbeOutcome {
    /// A response arrived; record its status code.
    pub fn response(code: u16) -> Self {
        Self { error: None, response_code: Some(code) }
    }

    /// The request failed before any response arrived.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self { error: Some(ProbeFailure { cause: cause.to_string() }), response_code: None }
    }

    /// The client-side timeout elapsed first.
    pub fn timed_out() -> Self {
        Self::transport(TIMEOUT_CAUSE)
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(|failure| failure.cause == TIMEOUT_CAUSE)
    }
}

/// One line in a check's log stream: a snapshot of the check, the probe
/// outcome and the reconciliation decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub check: Check,
    pub outcome: ProbeOutcome,
    pub state: CheckState,
    pub alert_triggered: bool,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors_are_mutually_exclusive() {
        let ok = ProbeOutcome::response(200);
        assert_eq!(ok.response_code, Some(200));
        assert!(ok.error.is_none());
        assert!(!ok.is_timeout());

        let failed = ProbeOutcome::transport("connection refused");
        assert!(failed.response_code.is_none());
        assert_eq!(failed.error.unwrap().cause, "connection refused");

        assert!(ProbeOutcome::timed_out().is_timeout());
    }

    #[test]
    fn outcome_serializes_only_present_fields() {
        let value = serde_json::to_value(ProbeOutcome::response(204)).unwrap();
        assert_eq!(value, serde_json::json!({"responseCode": 204}));

        let value = serde_json::to_value(ProbeOutcome::timed_out()).unwrap();
        assert_eq!(value, serde_json::json!({"error": {"cause": "timeout"}}));
    }
}
