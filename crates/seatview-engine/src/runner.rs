//! Workflow Runner: drives one run through the four-stage state machine,
//! persisting artifacts at each checkpoint and producing a
//! [`PipelineResult`] that is always returned, never thrown — errors are
//! captured into the result, matching `venue_pipeline.py`'s
//! `_make_result`/`_make_cancelled_result` split.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use seatview_compute::ComputeBackend;
use seatview_core::artifact::ArtifactKind;
use seatview_core::cost;
use seatview_core::error::PipelineError;
use seatview_core::geometry;
use seatview_core::model::{InputSnapshot, PipelineResult, SectionParams, Seat, Stage};
use seatview_core::{RunId, VenueId};
use seatview_store::{layout, ArtifactStore};
use tracing::{info, instrument, warn};

use crate::cancel::CancelFlag;
use crate::events::PipelineEvent;
use crate::progress::ProgressCell;
use crate::registry::VenueRunRegistry;
use crate::resume::{self, ModelProbe};
use crate::retry::run_with_retry;

async fn persist_with_retry(
    store: &dyn ArtifactStore,
    key: &str,
    bytes: &[u8],
    progress: &ProgressCell,
    run_id: RunId,
    operation: &str,
) -> Result<String, PipelineError> {
    run_with_retry(
        &seatview_core::retry::FAST,
        || async { store.put(key, bytes).await.map_err(PipelineError::from) },
        |attempt, err| {
            warn!(key, attempt, error = %err, "retrying artifact store write");
            progress.emit(PipelineEvent::Retrying {
                run_id,
                operation: operation.to_string(),
                attempt,
                error: err.to_string(),
            });
        },
    )
    .await
}

fn filtered_sections(input: &InputSnapshot) -> BTreeMap<String, SectionParams> {
    match &input.selected_section_ids {
        Some(ids) => input
            .sections
            .iter()
            .filter(|(id, _)| ids.contains(*id))
            .map(|(id, params)| (id.clone(), params.clone()))
            .collect(),
        None => input.sections.clone(),
    }
}

/// Owns the dependencies and per-run state needed to drive one pipeline
/// run to completion. Constructed fresh per run by
/// [`crate::handle::start_pipeline`].
pub(crate) struct Runner {
    run_id: RunId,
    venue_id: VenueId,
    input: InputSnapshot,
    compute: Arc<dyn ComputeBackend>,
    store: Arc<dyn ArtifactStore>,
    registry: Arc<VenueRunRegistry>,
    cancel: CancelFlag,
    progress: ProgressCell,
}

impl Runner {
    /// Builds a runner for a fresh run. `progress` is expected to already
    /// be in the PENDING stage, matching `run_id`.
    pub(crate) fn new(
        run_id: RunId,
        venue_id: VenueId,
        input: InputSnapshot,
        compute: Arc<dyn ComputeBackend>,
        store: Arc<dyn ArtifactStore>,
        registry: Arc<VenueRunRegistry>,
        cancel: CancelFlag,
        progress: ProgressCell,
    ) -> Self {
        Self {
            run_id,
            venue_id,
            input,
            compute,
            store,
            registry,
            cancel,
            progress,
        }
    }

    fn venue_str(&self) -> &str {
        self.venue_id.as_str()
    }

    fn fail(
        &mut self,
        err: &PipelineError,
        seats_generated: u32,
        started_at: Instant,
    ) -> PipelineResult {
        let message = err.short_description();
        let snapshot = self.progress.advance_stage(Stage::Failed, message.clone());
        self.progress.emit(PipelineEvent::Finished {
            run_id: self.run_id,
            stage: Stage::Failed,
        });
        PipelineResult {
            venue_id: self.venue_str().to_string(),
            success: false,
            all_seats_count: seats_generated.max(snapshot.seats_generated),
            depth_maps_rendered: snapshot.depth_maps_rendered,
            images_generated: snapshot.images_generated,
            image_paths: Vec::new(),
            failed_seats: snapshot.failed_items,
            total_cost: snapshot.actual_cost,
            duration_seconds: started_at.elapsed().as_secs_f64(),
            error_message: Some(message),
        }
    }

    fn cancelled(&mut self, image_paths: Vec<String>, started_at: Instant) -> PipelineResult {
        let snapshot = self.progress.advance_stage(Stage::Cancelled, "cancelled");
        self.progress.emit(PipelineEvent::Finished {
            run_id: self.run_id,
            stage: Stage::Cancelled,
        });
        PipelineResult {
            venue_id: self.venue_str().to_string(),
            success: false,
            all_seats_count: snapshot.seats_generated,
            depth_maps_rendered: snapshot.depth_maps_rendered,
            images_generated: snapshot.images_generated,
            image_paths,
            failed_seats: snapshot.failed_items,
            total_cost: snapshot.actual_cost,
            duration_seconds: started_at.elapsed().as_secs_f64(),
            error_message: None,
        }
    }

    fn completed(&mut self, image_paths: Vec<String>, started_at: Instant) -> PipelineResult {
        let snapshot = self.progress.advance_stage(Stage::Completed, "completed");
        self.progress.emit(PipelineEvent::Finished {
            run_id: self.run_id,
            stage: Stage::Completed,
        });
        PipelineResult {
            venue_id: self.venue_str().to_string(),
            success: true,
            all_seats_count: snapshot.seats_generated,
            depth_maps_rendered: snapshot.depth_maps_rendered,
            images_generated: snapshot.images_generated,
            image_paths,
            failed_seats: snapshot.failed_items,
            total_cost: snapshot.actual_cost,
            duration_seconds: started_at.elapsed().as_secs_f64(),
            error_message: None,
        }
    }

    /// Executes the full state machine for this run. Always returns a
    /// result; errors from compute/store calls are captured into it
    /// rather than propagated.
    #[instrument(skip_all, fields(run_id = %self.run_id, venue_id = %self.venue_id))]
    pub(crate) async fn run(mut self) -> PipelineResult {
        let started_at = Instant::now();
        let _venue_guard = self.registry.acquire(&self.venue_id).await;
        self.progress.emit(PipelineEvent::Started {
            run_id: self.run_id,
        });

        let sections = filtered_sections(&self.input);

        // Stage 1: seat generation (pure computation).
        self.progress
            .advance_stage(Stage::GeneratingSeats, "generating seats");
        let all_seats = geometry::generate_all_seats(&sections);
        let anchors = geometry::anchor_seats(&sections, &all_seats);
        let seats_to_render: Vec<Seat> = geometry::seats_to_render(
            self.input.custom_seats.as_ref(),
            &all_seats,
            &anchors,
        )
        .into_iter()
        .cloned()
        .collect();

        let venue_id_owned = self.venue_str().to_string();
        if let Err(err) = self
            .persist_seats_json(&venue_id_owned, &all_seats, &anchors)
            .await
        {
            return self.fail(&err, all_seats.len() as u32, started_at);
        }

        self.progress.mutate(|p| {
            p.seats_generated = all_seats.len() as u32;
            p.actual_cost += cost::SEAT_GENERATION;
        });

        if self.cancel.is_set() {
            return self.cancelled(Vec::new(), started_at);
        }

        // Stage 2: model build (or resume from cache).
        self.progress
            .advance_stage(Stage::BuildingModel, "building venue model");
        let input_hash = resume::model_input_hash(&self.input.surface_config, &sections);
        let blend = match resume::probe_model(
            self.store.as_ref(),
            self.venue_str(),
            self.input.controls.skip_model_build,
            &input_hash,
        )
        .await
        {
            ModelProbe::Reusable(bytes) => {
                info!("reusing cached venue model");
                bytes
            }
            ModelProbe::NeedsBuild => {
                match self.build_model(&sections, &input_hash).await {
                    Ok(bytes) => bytes,
                    Err(err) => return self.fail(&err, all_seats.len() as u32, started_at),
                }
            }
        };

        if self.cancel.is_set() {
            return self.cancelled(Vec::new(), started_at);
        }

        if self.input.controls.stop_after_model {
            return self.completed(Vec::new(), started_at);
        }

        // Stage 3: depth rendering (or partial resume).
        self.progress
            .advance_stage(Stage::RenderingDepths, "rendering depth maps");
        let depth_maps = match self
            .render_depths(&blend, &seats_to_render)
            .await
        {
            Ok(RenderOutcome::Completed(maps)) => maps,
            Ok(RenderOutcome::Cancelled) => return self.cancelled(Vec::new(), started_at),
            Err(err) => return self.fail(&err, all_seats.len() as u32, started_at),
        };

        if self.input.controls.stop_after_depths || self.input.controls.skip_ai_generation {
            return self.completed(Vec::new(), started_at);
        }

        // Stage 4: image synthesis, delegated to the fan-out coordinator.
        self.progress
            .advance_stage(Stage::GeneratingImages, "synthesizing images");
        let existing = resume::existing_final_images(self.store.as_ref(), self.venue_str()).await;
        let outcome = crate::fanout::synthesize(
            &self.compute,
            self.store.as_ref(),
            self.venue_str(),
            &depth_maps,
            &existing,
            &self.input,
            &self.cancel,
            &self.progress.events_sender(),
            self.run_id,
        )
        .await;

        for seat_id in &outcome.failed {
            self.progress.emit(PipelineEvent::ItemFailed {
                run_id: self.run_id,
                seat_id: seat_id.clone(),
                error: "image synthesis exhausted retry".to_string(),
            });
        }

        self.progress.mutate(|p| {
            p.images_generated += outcome.newly_synthesized;
            p.actual_cost += outcome.newly_synthesized as f64 * self.input.model.cost();
            p.failed_items.extend(outcome.failed.iter().cloned());
        });

        let image_paths: Vec<String> = outcome.image_paths.values().cloned().collect();

        if self.cancel.is_set() {
            return self.cancelled(image_paths, started_at);
        }

        self.completed(image_paths, started_at)
    }

    async fn persist_seats_json(
        &self,
        venue_id: &str,
        all_seats: &[Seat],
        anchors: &[Seat],
    ) -> Result<(), PipelineError> {
        #[derive(serde::Serialize)]
        struct SeatsDoc<'a> {
            venue: &'a str,
            seats: &'a [Seat],
        }
        let seats_doc = SeatsDoc {
            venue: venue_id,
            seats: all_seats,
        };
        let seats_bytes =
            serde_json::to_vec_pretty(&seats_doc).expect("seat list always serializes");
        persist_with_retry(
            self.store.as_ref(),
            &layout::venue_key(venue_id, ArtifactKind::SeatsJson),
            &seats_bytes,
            &self.progress,
            self.run_id,
            "persist seats.json",
        )
        .await?;

        let anchor_bytes =
            serde_json::to_vec_pretty(anchors).expect("anchor seat list always serializes");
        persist_with_retry(
            self.store.as_ref(),
            &layout::venue_key(venue_id, ArtifactKind::AnchorSeatsJson),
            &anchor_bytes,
            &self.progress,
            self.run_id,
            "persist anchor_seats.json",
        )
        .await?;
        Ok(())
    }

    async fn build_model(
        &mut self,
        sections: &BTreeMap<String, SectionParams>,
        input_hash: &str,
    ) -> Result<Vec<u8>, PipelineError> {
        let compute = Arc::clone(&self.compute);
        let surface_config = self.input.surface_config.clone();
        let sections_owned = sections.clone();
        let built = run_with_retry(
            &seatview_core::retry::BLENDER,
            || {
                let compute = Arc::clone(&compute);
                let surface_config = surface_config.clone();
                let sections_owned = sections_owned.clone();
                async move {
                    compute
                        .build_model(&surface_config, &sections_owned)
                        .await
                        .map_err(PipelineError::from)
                }
            },
            |attempt, err| {
                warn!(attempt, error = %err, "retrying model build");
                self.progress.emit(PipelineEvent::Retrying {
                    run_id: self.run_id,
                    operation: "model build".to_string(),
                    attempt,
                    error: err.to_string(),
                });
            },
        )
        .await?;

        let venue_id = self.venue_str().to_string();
        persist_with_retry(
            self.store.as_ref(),
            &layout::venue_key(&venue_id, ArtifactKind::Model),
            &built.blend,
            &self.progress,
            self.run_id,
            "persist venue model",
        )
        .await?;
        persist_with_retry(
            self.store.as_ref(),
            &layout::venue_key(&venue_id, ArtifactKind::Preview),
            &built.preview,
            &self.progress,
            self.run_id,
            "persist model preview",
        )
        .await?;
        persist_with_retry(
            self.store.as_ref(),
            &layout::venue_model_hash_key(&venue_id),
            input_hash.as_bytes(),
            &self.progress,
            self.run_id,
            "persist model hash",
        )
        .await?;

        self.progress.mutate(|p| p.actual_cost += cost::MODEL_BUILD);
        Ok(built.blend)
    }

    async fn render_depths(
        &mut self,
        blend: &[u8],
        seats_to_render: &[Seat],
    ) -> Result<RenderOutcome, PipelineError> {
        let probe = resume::probe_depths(
            self.store.as_ref(),
            self.venue_str(),
            self.input.controls.skip_depth_render,
            seats_to_render,
        )
        .await;

        let mut depth_maps = probe.existing;
        if !depth_maps.is_empty() {
            self.progress
                .mutate(|p| p.depth_maps_rendered = depth_maps.len() as u32);
        }

        let batch_size = self.input.controls.depth_batch_size.max(1);
        for batch in probe.missing.chunks(batch_size) {
            let compute = Arc::clone(&self.compute);
            let blend_owned = blend.to_vec();
            let batch_owned = batch.to_vec();
            let rendered = run_with_retry(
                &seatview_core::retry::BLENDER,
                || {
                    let compute = Arc::clone(&compute);
                    let blend_owned = blend_owned.clone();
                    let batch_owned = batch_owned.clone();
                    async move {
                        compute
                            .render_depth_batch(&blend_owned, &batch_owned)
                            .await
                            .map_err(PipelineError::from)
                    }
                },
                |attempt, err| {
                    warn!(attempt, error = %err, "retrying depth render batch");
                    self.progress.emit(PipelineEvent::Retrying {
                        run_id: self.run_id,
                        operation: "depth render batch".to_string(),
                        attempt,
                        error: err.to_string(),
                    });
                },
            )
            .await?;

            let venue_id = self.venue_str().to_string();
            for (seat_id, bytes) in &rendered {
                persist_with_retry(
                    self.store.as_ref(),
                    &layout::venue_seat_key(&venue_id, ArtifactKind::DepthMap, seat_id),
                    bytes,
                    &self.progress,
                    self.run_id,
                    "persist depth map",
                )
                .await?;
            }

            let rendered_count = rendered.len() as u32;
            depth_maps.extend(rendered);
            self.progress.mutate(|p| {
                p.depth_maps_rendered += rendered_count;
                p.actual_cost += rendered_count as f64 * cost::DEPTH_RENDER_PER_SEAT;
            });

            if self.cancel.is_set() {
                return Ok(RenderOutcome::Cancelled);
            }
        }

        Ok(RenderOutcome::Completed(depth_maps))
    }
}

enum RenderOutcome {
    Completed(BTreeMap<String, Vec<u8>>),
    Cancelled,
}
