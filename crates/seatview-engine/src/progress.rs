//! Progress Model: a single owned snapshot behind one monitor, with
//! wait-free reads via a `tokio::sync::watch` channel — the same
//! single-writer/clone-on-read shape `bbr-client-engine::engine::EngineInner`
//! uses for its status snapshot, just scoped to one run instead of one
//! worker fleet.

use seatview_core::model::{ProgressSnapshot, Stage};
use tokio::sync::watch;

use crate::events::PipelineEvent;

/// Owns the run's mutable progress. Only the runner task (and, within a
/// batch, the fan-out coordinator acting on the runner's behalf) mutates
/// it; all other observers read a cloned snapshot.
pub(crate) struct ProgressCell {
    tx: watch::Sender<ProgressSnapshot>,
    events: tokio::sync::broadcast::Sender<PipelineEvent>,
}

impl ProgressCell {
    /// Starts a fresh cell in the PENDING stage.
    pub(crate) fn new(initial: ProgressSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        let (events, _) = tokio::sync::broadcast::channel(256);
        Self { tx, events }
    }

    /// Wait-free read of the current snapshot. Never blocks the writer.
    pub(crate) fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// A receiver that observes every future snapshot update.
    pub(crate) fn watch(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    /// Subscribes to the run's discrete event stream, independent of the
    /// snapshot watch channel — logging is for operators, this is for
    /// callers.
    pub(crate) fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// A clone of the broadcast sender, kept by
    /// [`crate::handle::PipelineHandle`] so callers can subscribe at any
    /// point in the run's lifetime, not just before the runner task starts.
    pub(crate) fn events_sender(&self) -> tokio::sync::broadcast::Sender<PipelineEvent> {
        self.events.clone()
    }

    /// Applies `mutate` to the progress struct and pushes the resulting
    /// snapshot to watchers. Must only be called from the runner's own
    /// task — this is the "one monitor" the spec requires, enforced here
    /// by `&mut self` rather than interior mutability.
    pub(crate) fn mutate(&mut self, mutate: impl FnOnce(&mut ProgressSnapshot)) -> ProgressSnapshot {
        let mut snapshot = self.tx.borrow().clone();
        mutate(&mut snapshot);
        let _ = self.tx.send(snapshot.clone());
        snapshot
    }

    /// Emits a discrete event without touching the snapshot (e.g. a
    /// stage-transition notice already reflected by a prior `mutate` call).
    pub(crate) fn emit(&self, event: PipelineEvent) {
        let _ = self.events.send(event);
    }

    /// Transitions to `stage`, updating `current_step`/`message` to match,
    /// and emits a `StageChanged` event. Enforces the forward-only
    /// ordering invariant with a debug assertion; production callers are
    /// expected to only ever call this with a later stage.
    pub(crate) fn advance_stage(&mut self, stage: Stage, message: impl Into<String>) -> ProgressSnapshot {
        let message = message.into();
        let snapshot = self.mutate(|p| {
            debug_assert!(
                p.stage <= stage,
                "stage transitions must be forward-only: {:?} -> {:?}",
                p.stage,
                stage
            );
            p.stage = stage;
            p.current_step = stage.current_step();
            p.message = message.clone();
            p.current_item = None;
        });
        self.emit(PipelineEvent::StageChanged {
            run_id: snapshot.run_id,
            stage,
            message,
        });
        snapshot
    }
}
