//! Delivery of alignment requests to an aligner, local or remote.

use std::thread;
use std::time::Instant;

use layered_drafts::{AlignmentConfig, DraftError, DraftResult, TransportConfig};
use tracing::{debug, warn};

use crate::engine::align;
use crate::wire::{AlignmentRequest, AlignmentResponse};

/// Something that can answer an [`AlignmentRequest`].
///
/// `Err` means the request never produced a response (unreachable backend,
/// undecodable body). A response with `success: false` is not an error.
pub trait AlignmentTransport {
    fn send(&self, request: &AlignmentRequest) -> DraftResult<AlignmentResponse>;
}

/// Runs the aligner in-process.
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    config: AlignmentConfig,
}

impl LocalTransport {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }
}

impl AlignmentTransport for LocalTransport {
    fn send(&self, request: &AlignmentRequest) -> DraftResult<AlignmentResponse> {
        Ok(align(request, &self.config))
    }
}

/// Decode a response body from an alignment backend.
pub fn parse_response(body: &str) -> DraftResult<AlignmentResponse> {
    serde_json::from_str(body)
        .map_err(|e| DraftError::transport(format!("malformed alignment response: {}", e)))
}

/// Send with at most `policy.max_retries` retries after a fixed backoff.
///
/// Never fails: when every attempt errors, the zero-filled failure response
/// carries the last error message.
pub fn request_alignment(
    transport: &dyn AlignmentTransport,
    request: &AlignmentRequest,
    policy: &TransportConfig,
) -> AlignmentResponse {
    let started = Instant::now();
    let attempts = policy.max_retries.min(1) + 1;
    let mut last_error = None;

    for attempt in 1..=attempts {
        match transport.send(request) {
            Ok(response) => {
                debug!(attempt, success = response.success, "alignment response received");
                return response;
            }
            Err(err) => {
                warn!(attempt, error = %err, "alignment request failed");
                last_error = Some(err);
                if attempt < attempts {
                    thread::sleep(policy.backoff());
                }
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "alignment request was not sent".to_string());
    AlignmentResponse::failure(message, started.elapsed().as_secs_f64())
}

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use layered_drafts::{DraftError, DraftResult};

    use super::{parse_response, AlignmentTransport};
    use crate::wire::{AlignmentRequest, AlignmentResponse};

    /// POSTs requests as JSON to a remote alignment endpoint.
    pub struct HttpTransport {
        url: String,
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        pub fn new(url: impl Into<String>, timeout: Duration) -> DraftResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| DraftError::transport(format!("failed to build HTTP client: {}", e)))?;
            Ok(Self {
                url: url.into(),
                client,
            })
        }
    }

    impl AlignmentTransport for HttpTransport {
        fn send(&self, request: &AlignmentRequest) -> DraftResult<AlignmentResponse> {
            let response = self
                .client
                .post(&self.url)
                .json(request)
                .send()
                .map_err(|e| DraftError::transport(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .map_err(|e| DraftError::transport(e.to_string()))?;
            if !status.is_success() {
                return Err(DraftError::transport(format!(
                    "alignment backend returned {}",
                    status
                )));
            }
            parse_response(&body)
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;
