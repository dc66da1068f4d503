//! Serde DTOs matching the REST contract of §6. No HTTP listener is
//! implemented here — a REST frontend is out of scope — these exist purely
//! so a caller of this crate can serialize/deserialize against that
//! contract.

use serde::{Deserialize, Serialize};

use crate::ids::RunId;
use crate::model::{InputSnapshot, ProgressSnapshot};

/// Body of `POST /pipelines`.
pub type StartRequest = InputSnapshot;

/// Response of `POST /pipelines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    /// Server-generated run id.
    pub run_id: RunId,
    /// Always `"started"`.
    pub status: String,
}

impl StartResponse {
    /// Builds the canonical `{run_id, status:"started"}` response.
    pub fn started(run_id: RunId) -> Self {
        Self {
            run_id,
            status: "started".to_string(),
        }
    }
}

/// Response of `GET /pipelines/{run_id}`. Terminal runs return their last
/// snapshot as-is.
pub type ProgressResponse = ProgressSnapshot;

/// Response of `GET /pipelines/{run_id}/result`.
pub use crate::model::PipelineResult as PipelineResultDto;

/// Response of `POST /pipelines/{run_id}/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Always `"cancel_requested"`.
    pub status: String,
}

impl Default for CancelResponse {
    fn default() -> Self {
        Self {
            status: "cancel_requested".to_string(),
        }
    }
}
