//! Leaf error type for artifact store adapters.

use seatview_core::PipelineError;
use thiserror::Error;

/// Errors raised by an [`crate::ArtifactStore`] implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested key does not exist. Never surfaced as a failure in
    /// resume logic — callers treat it as "absent".
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other transport failure; retryable.
    #[error("transient store error: {0}")]
    Transient(String),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => PipelineError::NotFound(key),
            StoreError::Transient(msg) => PipelineError::Transient(msg),
        }
    }
}
