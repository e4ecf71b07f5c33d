//! Result reporting.
//!
//! Forwards each verdict, together with the annotated image, to a remote
//! validation API. Reporting is fire-and-forget: the pipeline records its
//! history entry first and dispatches the report on a detached thread, so a
//! dead endpoint can never alter a run's outcome. Failures are logged and
//! swallowed; there is no retry.

use std::time::Duration;

use base64::Engine;
use serde_json::json;

/// Reporting sink. Side-effecting only; callers never consume a result.
///
/// The trait seam exists so tests can inject a fake and exercise the
/// pipeline without a live endpoint.
pub trait Reporter: Send + Sync {
    fn report(&self, verdict: &str, image: &[u8], timestamp: &str);
}

/// Build the wire payload: `{"Estado", "Image", "DataValidacao"}`.
///
/// `Image` is the standard-alphabet base64 encoding of the annotated image
/// bytes; `DataValidacao` is the run timestamp (`YYYY-MM-DD HH:MM:SS`).
pub fn report_payload(verdict: &str, image: &[u8], timestamp: &str) -> serde_json::Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    json!({
        "Estado": verdict,
        "Image": encoded,
        "DataValidacao": timestamp,
    })
}

/// Reporter that POSTs JSON to the configured validation endpoint.
pub struct HttpReporter {
    url: String,
    agent: ureq::Agent,
}

impl HttpReporter {
    pub fn new(url: String, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { url, agent }
    }
}

impl Reporter for HttpReporter {
    fn report(&self, verdict: &str, image: &[u8], timestamp: &str) {
        let payload = report_payload(verdict, image, timestamp);
        match self.agent.post(&self.url).send_json(payload) {
            Ok(response) => {
                log::info!("report accepted by {} ({})", self.url, response.status());
            }
            Err(ureq::Error::Status(code, _)) => {
                log::warn!("report rejected by {}: status {}", self.url, code);
            }
            Err(e) => {
                log::warn!("report to {} failed: {}", self.url, e);
            }
        }
    }
}

/// Reporter used when no endpoint is configured. Keeps the offline stub
/// deployment runnable end to end.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, verdict: &str, _image: &[u8], timestamp: &str) {
        log::debug!(
            "no report endpoint configured; dropping verdict '{}' from {}",
            verdict,
            timestamp
        );
    }
}
