//! Discrete event stream external callers can subscribe to, independent of
//! the progress-snapshot watch channel. Mirrors the tagged-variant shape of
//! `bbr-client-engine::api::EngineEvent`.

use seatview_core::model::Stage;
use seatview_core::RunId;
use serde::{Deserialize, Serialize};

/// One discrete occurrence during a run's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// The run was created and the runner task started.
    Started {
        /// Run this event belongs to.
        run_id: RunId,
    },
    /// The run entered a new stage.
    StageChanged {
        /// Run this event belongs to.
        run_id: RunId,
        /// The stage just entered.
        stage: Stage,
        /// Human-readable status line.
        message: String,
    },
    /// A retryable error was retried.
    Retrying {
        /// Run this event belongs to.
        run_id: RunId,
        /// What was being attempted, e.g. `"depth render batch 2"`.
        operation: String,
        /// 1-based attempt number about to be retried.
        attempt: u32,
        /// Short description of the error that triggered the retry.
        error: String,
    },
    /// A single seat's synthesis (or, rarely, depth render) exhausted
    /// retry and was recorded as a per-item failure.
    ItemFailed {
        /// Run this event belongs to.
        run_id: RunId,
        /// The seat id that failed.
        seat_id: String,
        /// Short description of the terminal error.
        error: String,
    },
    /// Cancellation was requested; the run will terminate CANCELLED at the
    /// next stage or batch boundary.
    CancelRequested {
        /// Run this event belongs to.
        run_id: RunId,
    },
    /// The run reached a terminal stage.
    Finished {
        /// Run this event belongs to.
        run_id: RunId,
        /// Terminal stage reached (COMPLETED, FAILED, or CANCELLED).
        stage: Stage,
    },
}
