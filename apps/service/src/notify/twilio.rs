use std::time::Duration;

use async_trait::async_trait;

use super::{Notifier, NotifyError};
use crate::config::TwilioConfig;

const MAX_MESSAGE_LEN: usize = 1600;
const PHONE_LEN: usize = 8;

/// SMS delivery through the Twilio Messages API.
pub struct TwilioNotifier {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_phone: String,
    country_prefix: String,
}

impl TwilioNotifier {
    pub fn new(config: &TwilioConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            api_base: "https://api.twilio.com".to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_phone: config.from_phone.clone(),
            country_prefix: config.country_prefix.clone(),
        })
    }

    /// Point the notifier at a different API host. Used by tests.
    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Trim and validate the outgoing parameters before any network work.
fn validate_params<'a>(
    phone: &'a str,
    message: &'a str,
) -> Result<(&'a str, &'a str), NotifyError> {
    let phone = phone.trim();
    if phone.len() != PHONE_LEN || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NotifyError::InvalidParams("phone must be 8 digits"));
    }
    let message = message.trim();
    if message.is_empty() || message.len() > MAX_MESSAGE_LEN {
        return Err(NotifyError::InvalidParams("message must be 1-1600 characters"));
    }
    Ok((phone, message))
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        let (phone, message) = validate_params(phone, message)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );
        let to = format!("{}{}", self.country_prefix, phone);
        let params = [
            ("From", self.from_phone.as_str()),
            ("To", to.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => Ok(()),
            status => Err(NotifyError::GatewayStatus(status)),
        }
    }
}
