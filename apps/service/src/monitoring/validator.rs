//! Sanity-checking of raw check records before they are probed.
//!
//! Stored records are validated field by field: anything absent or malformed
//! counts as invalid. Two fields get permissive defaults instead of a
//! rejection: `state` falls back to `down` and `lastChecked` to "never
//! probed".

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::models::{CHECK_ID_LEN, Check, CheckState, HttpMethod, Protocol};

const PHONE_LEN: usize = 8;
const MIN_TIMEOUT_SECONDS: u64 = 1;
const MAX_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("check record is not a JSON object")]
    NotAnObject,
    #[error("check field `{0}` is missing or malformed")]
    Field(&'static str),
}

/// Validate a raw stored record into a well-formed [`Check`].
pub fn validate_check(record: &Value) -> Result<Check, ValidationError> {
    let obj = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let id = trimmed_str(obj, "id")
        .filter(|id| id.len() == CHECK_ID_LEN)
        .ok_or(ValidationError::Field("id"))?;

    let user_phone = trimmed_str(obj, "userPhone")
        .filter(|phone| phone.len() == PHONE_LEN && phone.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(ValidationError::Field("userPhone"))?;

    let protocol = trimmed_str(obj, "protocol")
        .and_then(|p| match p.as_str() {
            "http" => Some(Protocol::Http),
            "https" => Some(Protocol::Https),
            _ => None,
        })
        .ok_or(ValidationError::Field("protocol"))?;

    let url = trimmed_str(obj, "url")
        .filter(|url| !url.is_empty())
        .ok_or(ValidationError::Field("url"))?;
    // The stored url carries no scheme; the composed endpoint must still
    // parse as a real URL.
    Url::parse(&format!("{protocol}://{url}")).map_err(|_| ValidationError::Field("url"))?;

    let method = trimmed_str(obj, "method")
        .and_then(|m| match m.as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        })
        .ok_or(ValidationError::Field("method"))?;

    let status_codes = obj
        .get("statusCodes")
        .and_then(Value::as_array)
        .filter(|codes| !codes.is_empty())
        .and_then(|codes| {
            codes
                .iter()
                .map(|code| code.as_u64().and_then(|n| u16::try_from(n).ok()))
                .collect::<Option<Vec<u16>>>()
        })
        .ok_or(ValidationError::Field("statusCodes"))?;

    let timeout_seconds = obj
        .get("timeoutSeconds")
        .and_then(Value::as_u64)
        .filter(|t| (MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(t))
        .ok_or(ValidationError::Field("timeoutSeconds"))?;

    // Permissive defaults: the worker may not have seen this check before.
    let state = trimmed_str(obj, "state")
        .and_then(|s| match s.as_str() {
            "up" => Some(CheckState::Up),
            "down" => Some(CheckState::Down),
            _ => None,
        })
        .unwrap_or_default();

    let last_checked = obj.get("lastChecked").and_then(Value::as_i64).filter(|t| *t > 0);

    Ok(Check {
        id,
        user_phone,
        protocol,
        url,
        method,
        status_codes,
        timeout_seconds,
        state,
        last_checked,
    })
}

fn trimmed_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(|s| s.trim().to_string())
}
