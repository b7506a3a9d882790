use std::sync::OnceLock;

use tracing::debug;

use super::types::ProbeOutcome;
use crate::models::{Check, HttpMethod};

/// Issues one outbound HTTP(S) request per check and turns whatever happens
/// into exactly one [`ProbeOutcome`].
pub struct ProbeExecutor {
    client: reqwest::Client,
}

impl ProbeExecutor {
    pub fn new() -> Result<Self, reqwest::Error> {
        // Redirects are not followed: the raw status of the probed endpoint
        // is what gets compared against the check's accepted codes. Timeouts
        // are per check, so the client carries none of its own.
        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build()?;
        Ok(Self { client })
    }

    /// Probe a check. Three completion paths exist: a response, a transport
    /// error, or the timeout elapsing; whichever signals first resolves the
    /// outcome and later signals are ignored. A failed probe is a valid
    /// outcome, never retried here.
    pub async fn probe(&self, check: &Check) -> ProbeOutcome {
        let guard = OutcomeGuard::new();

        let request = self.client.request(request_method(check.method), check.endpoint());
        tokio::select! {
            result = request.send() => match result {
                Ok(response) => {
                    guard.resolve(ProbeOutcome::response(response.status().as_u16()));
                }
                Err(err) => {
                    guard.resolve(ProbeOutcome::transport(err));
                }
            },
            _ = tokio::time::sleep(check.timeout()) => {
                guard.resolve(ProbeOutcome::timed_out());
            }
        }

        let outcome = guard.into_outcome();
        debug!(check = %check.id, outcome = ?outcome, "probe completed");
        outcome
    }
}

fn request_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Single-resolution slot for a probe outcome: the first completion signal
/// wins, later signals are ignored.
struct OutcomeGuard {
    slot: OnceLock<ProbeOutcome>,
}

impl OutcomeGuard {
    fn new() -> Self {
        Self { slot: OnceLock::new() }
    }

    /// Resolve the outcome. Returns whether this call won.
    fn resolve(&self, outcome: ProbeOutcome) -> bool {
        self.slot.set(outcome).is_ok()
    }

    fn into_outcome(self) -> ProbeOutcome {
        // A probe always resolves through one of its completion paths; the
        // fallback exists so an unset slot is still a reportable outcome.
        self.slot
            .into_inner()
            .unwrap_or_else(|| ProbeOutcome::transport("probe ended without a completion signal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckState, Protocol};
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn local_check(url: String, timeout_seconds: u64) -> Check {
        Check {
            id: "abcdefghij0123456789".into(),
            user_phone: "03123456".into(),
            protocol: Protocol::Http,
            url,
            method: HttpMethod::Get,
            status_codes: vec![200],
            timeout_seconds,
            state: CheckState::Down,
            last_checked: None,
        }
    }

    #[test]
    fn first_resolution_wins() {
        let guard = OutcomeGuard::new();
        assert!(guard.resolve(ProbeOutcome::response(200)));
        assert!(!guard.resolve(ProbeOutcome::timed_out()));
        assert!(!guard.resolve(ProbeOutcome::transport("late error")));
        assert_eq!(guard.into_outcome(), ProbeOutcome::response(200));
    }

    #[tokio::test]
    async fn response_path_reports_the_raw_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 204 No Content\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await;
        });

        let prober = ProbeExecutor::new().unwrap();
        let outcome = prober.probe(&local_check(addr.to_string(), 5)).await;

        assert_eq!(outcome, ProbeOutcome::response(204));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = ProbeExecutor::new().unwrap();
        let outcome = prober.probe(&local_check(addr.to_string(), 5)).await;

        assert!(outcome.error.is_some());
        assert!(outcome.response_code.is_none());
        assert!(!outcome.is_timeout());
    }

    #[tokio::test]
    async fn silent_server_hits_the_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection open without ever responding.
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let prober = ProbeExecutor::new().unwrap();
        let check = local_check(addr.to_string(), 1);
        let started = Instant::now();
        let outcome = prober.probe(&check).await;

        assert!(outcome.is_timeout());
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
