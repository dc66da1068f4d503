//! `PipelineHandle`: the in-process handle a caller holds to query,
//! cancel, and await a running pipeline, after
//! `bbr-client-engine::api::EngineHandle`.

use std::sync::Arc;

use seatview_core::model::{InputSnapshot, PipelineResult, ProgressSnapshot};
use seatview_core::{RunId, VenueId};
use seatview_compute::ComputeBackend;
use seatview_store::ArtifactStore;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::cancel::CancelFlag;
use crate::events::PipelineEvent;
use crate::progress::ProgressCell;
use crate::registry::VenueRunRegistry;
use crate::runner::Runner;

/// Handle to a single in-flight (or finished) run.
pub struct PipelineHandle {
    run_id: RunId,
    progress_rx: watch::Receiver<ProgressSnapshot>,
    events_tx: broadcast::Sender<PipelineEvent>,
    cancel: CancelFlag,
    join: JoinHandle<PipelineResult>,
}

impl PipelineHandle {
    /// Stable identifier for this run.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Wait-free read of the current progress. Never blocks the runner.
    pub fn query(&self) -> ProgressSnapshot {
        self.progress_rx.borrow().clone()
    }

    /// Subscribes to the run's discrete event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events_tx.subscribe()
    }

    /// Requests cancellation. Idempotent; a cancel observed before
    /// COMPLETED/FAILED forces the terminal stage to CANCELLED.
    pub fn cancel(&self) {
        self.cancel.request();
        let _ = self.events_tx.send(PipelineEvent::CancelRequested {
            run_id: self.run_id,
        });
    }

    /// Awaits the run to completion and returns its result. Consumes the
    /// handle, matching `EngineHandle::wait`.
    pub async fn wait(self) -> anyhow::Result<PipelineResult> {
        Ok(self.join.await?)
    }
}

/// Starts a run as a detached `tokio` task and returns a handle to it.
pub fn start_pipeline(
    venue_id: VenueId,
    input: InputSnapshot,
    compute: Arc<dyn ComputeBackend>,
    store: Arc<dyn ArtifactStore>,
    registry: Arc<VenueRunRegistry>,
) -> PipelineHandle {
    let run_id = RunId::new();
    let progress = ProgressCell::new(ProgressSnapshot::pending(run_id));
    let progress_rx = progress.watch();
    let events_tx = progress.events_sender();
    let cancel = CancelFlag::new();

    let runner = Runner::new(
        run_id,
        venue_id,
        input,
        compute,
        store,
        registry,
        cancel.clone(),
        progress,
    );
    let join = tokio::spawn(runner.run());

    PipelineHandle {
        run_id,
        progress_rx,
        events_tx,
        cancel,
        join,
    }
}
