//! Shared error taxonomy.
//!
//! Each downstream crate (`seatview-compute`, `seatview-store`) defines its
//! own small leaf error enum and `From`-converts into [`PipelineError`] at
//! the call sites inside `seatview-engine`, the same layering
//! `bbr-client-engine`'s `BackendError` feeds into `anyhow::Result`.

use thiserror::Error;

/// The error kinds the orchestrator distinguishes for retry and
/// failure-propagation purposes.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Malformed or unsatisfiable input; surfaced to the caller, the run
    /// never starts.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Rate-limited by a remote call (HTTP 429 or equivalent). Retried
    /// under the applicable policy with jitter; treated as [`Self::Transient`]
    /// once retries are exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport-level failure expected to succeed on retry.
    #[error("transient error: {0}")]
    Transient(String),

    /// Configuration or auth error that retrying cannot fix.
    #[error("non-retryable configuration error: {0}")]
    NonRetryable(String),

    /// Requested artifact does not exist. Never an error in resume logic —
    /// callers treat it as "absent".
    #[error("not found: {0}")]
    NotFound(String),

    /// The run was cancelled.
    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Whether this error kind should be retried under a backoff policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Transient(_))
    }

    /// Short description suitable for `PipelineResult::error_message`.
    pub fn short_description(&self) -> String {
        self.to_string()
    }
}
