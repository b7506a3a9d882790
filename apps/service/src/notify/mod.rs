//! Notification gateway: best-effort SMS delivery to a check's owner.

pub mod twilio;

pub use twilio::TwilioNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification parameters: {0}")]
    InvalidParams(&'static str),
    #[error("sms gateway returned status {0}")]
    GatewayStatus(u16),
    #[error("sms request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Notifier trait for sending SMS alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> Result<(), NotifyError>;
}
