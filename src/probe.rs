//! Probe executor - performs one HTTP check and classifies the outcome
//!
//! The only output of a probe is a [`CheckResult`]. Transport failures
//! (timeouts, DNS errors, refused connections, TLS errors) are folded into a
//! `down` result carrying the failure description; they never surface as
//! errors to the caller.
//!
//! ```text
//! ProbeTarget → HTTP request → response head? ─yes→ compare status → up / down
//!                                           └─no──→ down (error, no status code)
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{instrument, trace, warn};

use crate::models::{CheckResult, HttpMethod, ProbeTarget};

/// Something that can check a target
///
/// The scheduler only depends on this trait so it can be driven by
/// deterministic probes in tests.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run one check. Must not fail: every outcome is a `CheckResult`.
    async fn execute(&self, target: &ProbeTarget) -> CheckResult;
}

/// HTTP implementation of [`Probe`] backed by a shared `reqwest` client
#[derive(Clone)]
pub struct HttpProbe {
    /// HTTP client (reused across requests, timeouts are set per request)
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    #[instrument(skip(self, target), fields(monitor = %target.monitor_id, url = %target.url))]
    async fn execute(&self, target: &ProbeTarget) -> CheckResult {
        trace!("probing {} {}", target.method, target.url);

        let method = match target.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Head => reqwest::Method::HEAD,
        };
        let timeout = Duration::from_secs(target.timeout_secs.max(1));

        let start = Instant::now();
        let response = self
            .client
            .request(method, &target.url)
            .timeout(timeout)
            .send()
            .await;
        let response_time = start.elapsed().as_millis() as u64;

        match response {
            Ok(response) => {
                let status_code = response.status().as_u16();
                classify(target, status_code, response_time)
            }
            Err(e) => {
                let message = error_chain(&e);
                warn!("probe failed after {response_time}ms: {message}");
                CheckResult::down(target.monitor_id.clone(), response_time, None, message)
            }
        }
    }
}

/// Classify a received response against the expected status code
pub fn classify(target: &ProbeTarget, status_code: u16, response_time: u64) -> CheckResult {
    if status_code == target.expected_status {
        CheckResult::up(target.monitor_id.clone(), response_time, status_code)
    } else {
        CheckResult::down(
            target.monitor_id.clone(),
            response_time,
            Some(status_code),
            format!(
                "Expected status {}, got {}",
                target.expected_status, status_code
            ),
        )
    }
}

/// Render an error together with its source chain
///
/// `reqwest` keeps the interesting part ("operation timed out", "Connection
/// refused") in the source, so the top-level message alone is not enough.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
