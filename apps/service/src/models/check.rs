use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a check identifier.
pub const CHECK_ID_LEN: usize = 20;

/// Protocol used to probe a check's endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// HTTP method used for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Upper-case form, as sent on the wire and shown in alert messages.
    pub fn as_upper(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "get"),
            HttpMethod::Post => write!(f, "post"),
            HttpMethod::Put => write!(f, "put"),
            HttpMethod::Delete => write!(f, "delete"),
        }
    }
}

/// Up/down state of a check. A check that has never been probed is `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Up,
    #[default]
    Down,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Up => write!(f, "up"),
            CheckState::Down => write!(f, "down"),
        }
    }
}

/// A monitored endpoint, as persisted in the `checks` collection.
///
/// Field names serialize in camelCase so records stay compatible with the
/// rest of the service (`userPhone`, `statusCodes`, ...). `state` and
/// `lastChecked` only change inside the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub user_phone: String,
    pub protocol: Protocol,
    pub url: String,
    pub method: HttpMethod,
    pub status_codes: Vec<u16>,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub state: CheckState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<i64>,
}

impl Check {
    /// Full probe target, e.g. `https://example.com/health?x=1`.
    pub fn endpoint(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }

    /// Client-side probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_seconds * 1000)
    }

    /// Whether a response code counts as the endpoint being up.
    pub fn accepts(&self, code: u16) -> bool {
        self.status_codes.contains(&code)
    }
}

/// Generate a random alphanumeric check id.
#[allow(dead_code)]
pub fn random_check_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..CHECK_ID_LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect()
}
