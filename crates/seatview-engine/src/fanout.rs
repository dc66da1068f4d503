//! Parallel Fan-out Coordinator: batches and bounds concurrent
//! image-synthesis calls, merging successes and per-seat failures. The
//! concurrency bound is a per-batch barrier via `tokio::task::JoinSet` —
//! not a long-lived worker pool — the same primitive
//! `bbr-client-engine::engine::EngineRuntime` uses to bound its own worker
//! fleet, reused here at the batch level per §4.2/§5.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use seatview_compute::ComputeBackend;
use seatview_core::artifact::ArtifactKind;
use seatview_core::model::InputSnapshot;
use seatview_core::retry::AI_SYNTHESIS;
use seatview_core::{PipelineError, RunId};
use seatview_store::{layout, ArtifactStore};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::warn;

use crate::cancel::CancelFlag;
use crate::events::PipelineEvent;
use crate::retry::run_with_retry;

/// Result of one `synthesize` call: accumulated artifact paths and the
/// seats whose synthesis exhausted retry.
pub(crate) struct FanoutOutcome {
    /// Seat id -> persisted final-image artifact path.
    pub(crate) image_paths: BTreeMap<String, String>,
    /// Seat ids that exhausted the AI retry policy.
    pub(crate) failed: Vec<String>,
    /// Number of newly synthesized images (excludes `existing`).
    pub(crate) newly_synthesized: u32,
}

#[allow(clippy::too_many_arguments)]
async fn synthesize_one(
    compute: &dyn ComputeBackend,
    depth_bytes: &[u8],
    input: &InputSnapshot,
) -> Result<Vec<u8>, PipelineError> {
    compute
        .synthesize_image(
            depth_bytes,
            &input.prompt,
            input.model,
            input.strength,
            input.reference_image.as_deref(),
            input.ip_adapter_scale,
        )
        .await
        .map(|img| img.image)
        .map_err(PipelineError::from)
}

/// Synthesizes images for every seat in `depth_maps` not already present
/// in `existing`, in batches of `input.controls.parallel_image_batch_size`,
/// checking `cancel` after every batch.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn synthesize(
    compute: &Arc<dyn ComputeBackend>,
    store: &dyn ArtifactStore,
    venue_id: &str,
    depth_maps: &BTreeMap<String, Vec<u8>>,
    existing: &BTreeSet<String>,
    input: &InputSnapshot,
    cancel: &CancelFlag,
    events: &broadcast::Sender<PipelineEvent>,
    run_id: RunId,
) -> FanoutOutcome {
    let existing_paths: BTreeMap<String, String> = existing
        .iter()
        .map(|seat_id| {
            (
                seat_id.clone(),
                layout::venue_seat_key(venue_id, ArtifactKind::FinalImage, seat_id),
            )
        })
        .collect();

    let pending: Vec<&String> = depth_maps
        .keys()
        .filter(|seat_id| !existing.contains(*seat_id))
        .collect();

    if pending.is_empty() {
        return FanoutOutcome {
            image_paths: existing_paths,
            failed: Vec::new(),
            newly_synthesized: 0,
        };
    }

    let batch_size = input.controls.parallel_image_batch_size.max(1);
    let mut image_paths = existing_paths;
    let mut failed = Vec::new();
    let mut newly_synthesized = 0u32;

    for batch in pending.chunks(batch_size) {
        let mut tasks: JoinSet<(String, Result<Vec<u8>, PipelineError>)> = JoinSet::new();
        let mut seat_by_task = std::collections::HashMap::new();
        for seat_id in batch {
            let seat_id = (*seat_id).clone();
            let depth_bytes = depth_maps[&seat_id].clone();
            let compute = Arc::clone(compute);
            let input = input.clone();
            let events = events.clone();
            let seat_id_for_task = seat_id.clone();
            let abort_handle = tasks.spawn(async move {
                let result = run_with_retry(
                    &AI_SYNTHESIS,
                    || synthesize_one(compute.as_ref(), &depth_bytes, &input),
                    |attempt, err| {
                        warn!(seat_id = %seat_id, attempt, error = %err, "retrying image synthesis");
                        let _ = events.send(PipelineEvent::Retrying {
                            run_id,
                            operation: format!("image synthesis for seat {seat_id}"),
                            attempt,
                            error: err.to_string(),
                        });
                    },
                )
                .await;
                (seat_id, result)
            });
            seat_by_task.insert(abort_handle.id(), seat_id_for_task);
        }

        let mut staging: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (seat_id, Ok(bytes)))) => {
                    staging.insert(seat_id, bytes);
                }
                Ok((_, (seat_id, Err(err)))) => {
                    warn!(seat_id = %seat_id, error = %err, "image synthesis exhausted retry");
                    failed.push(seat_id);
                }
                Err(join_err) => {
                    let seat_id = seat_by_task.remove(&join_err.id());
                    warn!(seat_id = ?seat_id, error = %join_err, "image synthesis task panicked");
                    if let Some(seat_id) = seat_id {
                        failed.push(seat_id);
                    }
                }
            }
        }

        for (seat_id, bytes) in staging {
            let key = layout::venue_seat_key(venue_id, ArtifactKind::FinalImage, &seat_id);
            match store.put(&key, &bytes).await {
                Ok(path) => {
                    image_paths.insert(seat_id, path);
                    newly_synthesized += 1;
                }
                Err(err) => {
                    warn!(seat_id = %seat_id, error = %err, "failed to persist synthesized image");
                    failed.push(seat_id);
                }
            }
        }

        if cancel.is_set() {
            break;
        }
    }

    FanoutOutcome {
        image_paths,
        failed,
        newly_synthesized,
    }
}
