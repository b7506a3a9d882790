//! The background worker pipeline.
//!
//! Every scan interval, stored checks are fanned out concurrently through
//! validate -> probe -> reconcile; each check's lifecycle is strictly ordered
//! while checks never wait on each other.

pub mod prober;
pub mod reconciler;
pub mod scheduler;
pub mod types;
pub mod validator;

pub use prober::ProbeExecutor;
pub use reconciler::OutcomeReconciler;
pub use scheduler::ScanScheduler;
pub use types::{LogRecord, ProbeOutcome};
pub use validator::{ValidationError, validate_check};
