//! Leaf error type for the compute client, converted into
//! [`seatview_core::PipelineError`] at call sites inside `seatview-engine`.

use seatview_core::PipelineError;
use thiserror::Error;

/// Error body the compute backend returns on non-2xx responses.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorBody {
    /// A short machine-readable error code, e.g. `"rate_limited"`.
    pub code: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
}

/// Errors raised by [`crate::client::ComputeClient`] calls.
#[derive(Debug, Clone, Error)]
pub enum ComputeError {
    /// The backend rejected the request as rate-limited (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The backend reported a configuration problem unrecoverable by retry.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend rejected the request as authentication-invalid,
    /// non-retryable for image synthesis per the AI retry policy.
    #[error("auth error: {0}")]
    Auth(String),

    /// Transport-level or unclassified server error, retryable.
    #[error("transient compute error: {0}")]
    Transient(String),
}

impl From<ComputeError> for PipelineError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::RateLimited(msg) => PipelineError::RateLimited(msg),
            ComputeError::Configuration(msg) => PipelineError::NonRetryable(msg),
            ComputeError::Auth(msg) => PipelineError::NonRetryable(msg),
            ComputeError::Transient(msg) => PipelineError::Transient(msg),
        }
    }
}
