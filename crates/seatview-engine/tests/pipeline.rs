//! Async integration tests against a fake [`ComputeBackend`] and a
//! `tempfile`-backed local artifact store, following
//! `freddiehaddad-oxidized`'s convention of scoping the `tokio` runtime to
//! test-only async code.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use seatview_compute::{BuiltModel, ComputeBackend, ComputeError, SynthesizedImage};
use seatview_core::model::{
    ExecutionControls, ImageModel, InputSnapshot, SectionParams, SurfaceConfig, SurfaceKind, Tier,
};
use seatview_core::VenueId;
use seatview_engine::{start_pipeline, VenueRunRegistry};
use seatview_store::{ArtifactStore, CompositeStore, LocalStore};

struct FakeBackend {
    build_calls: AtomicU32,
    render_calls: AtomicU32,
    failing_seats: Vec<String>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            build_calls: AtomicU32::new(0),
            render_calls: AtomicU32::new(0),
            failing_seats: Vec::new(),
        }
    }

    fn with_failing_seats(seats: Vec<String>) -> Self {
        Self {
            failing_seats: seats,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ComputeBackend for FakeBackend {
    async fn build_model(
        &self,
        _surface_config: &SurfaceConfig,
        _sections: &BTreeMap<String, SectionParams>,
    ) -> Result<BuiltModel, ComputeError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BuiltModel {
            blend: b"fake-blend".to_vec(),
            preview: b"fake-preview".to_vec(),
        })
    }

    async fn render_depth_batch(
        &self,
        _blend: &[u8],
        seats: &[seatview_core::model::Seat],
    ) -> Result<BTreeMap<String, Vec<u8>>, ComputeError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        Ok(seats
            .iter()
            .map(|s| (s.id.clone(), format!("depth-{}", s.id).into_bytes()))
            .collect())
    }

    async fn synthesize_image(
        &self,
        depth: &[u8],
        _prompt: &str,
        _model: ImageModel,
        _strength: f64,
        _reference_image: Option<&[u8]>,
        _ip_adapter_scale: Option<f64>,
    ) -> Result<SynthesizedImage, ComputeError> {
        let depth_str = String::from_utf8_lossy(depth).to_string();
        let seat_id = depth_str.strip_prefix("depth-").unwrap_or(&depth_str);
        if self.failing_seats.iter().any(|s| s == seat_id) {
            return Err(ComputeError::Auth("no access for this seat".to_string()));
        }
        Ok(SynthesizedImage {
            image: format!("image-{seat_id}").into_bytes(),
        })
    }
}

fn one_section_input(venue: &str) -> InputSnapshot {
    let mut sections = BTreeMap::new();
    sections.insert(
        "101".to_string(),
        SectionParams {
            tier: Tier::Lower,
            angle: 0.0,
            inner_radius: 18.0,
            rows: 21,
            row_depth: 0.85,
            row_rise: 0.4,
            base_height: 2.0,
        },
    );
    InputSnapshot {
        venue_id: venue.to_string(),
        sections,
        selected_section_ids: None,
        custom_seats: None,
        surface_config: SurfaceConfig {
            kind: SurfaceKind::Rink,
            width: 30.0,
            length: 60.0,
            extra: None,
        },
        prompt: "a hockey rink seat view".to_string(),
        model: ImageModel::Sdxl,
        strength: 0.8,
        reference_image: None,
        ip_adapter_scale: None,
        controls: ExecutionControls::default(),
    }
}

fn composite_store(root: &std::path::Path) -> Arc<dyn ArtifactStore> {
    Arc::new(CompositeStore::local_only(LocalStore::new(root)))
}

#[tokio::test]
async fn stop_after_model_completes_with_no_depths_or_images() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::new());

    let mut input = one_section_input("venue-a");
    input.controls.stop_after_model = true;

    let handle = start_pipeline(
        VenueId::new("venue-a"),
        input,
        backend.clone() as Arc<dyn ComputeBackend>,
        store.clone(),
        registry,
    );
    let result = handle.wait().await.unwrap();

    assert!(result.success);
    assert_eq!(result.depth_maps_rendered, 0);
    assert_eq!(result.images_generated, 0);
    assert_eq!(backend.build_calls.load(Ordering::SeqCst), 1);

    let blend = store.get("venue-a/venue_model.blend").await.unwrap();
    assert_eq!(blend, b"fake-blend");
}

#[tokio::test]
async fn happy_path_generates_images_for_anchor_seats() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::new());

    let input = one_section_input("venue-b");
    let handle = start_pipeline(
        VenueId::new("venue-b"),
        input,
        backend.clone() as Arc<dyn ComputeBackend>,
        store,
        registry,
    );

    let mut progress_seen = Vec::new();
    let mut sub = handle.subscribe();
    let result_task = tokio::spawn(async move { handle.wait().await.unwrap() });
    while let Ok(event) = sub.recv().await {
        progress_seen.push(event);
    }
    let result = result_task.await.unwrap();

    assert!(result.success);
    assert!(result.failed_seats.is_empty());
    // single section, single tier sampled -> one anchor section -> front+back.
    assert_eq!(result.images_generated, 2);
    assert_eq!(result.depth_maps_rendered, 2);
    assert!(!progress_seen.is_empty());
}

#[tokio::test]
async fn resume_skips_remote_calls_on_second_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::new());

    let input = one_section_input("venue-c");
    let handle = start_pipeline(
        VenueId::new("venue-c"),
        input.clone(),
        backend.clone() as Arc<dyn ComputeBackend>,
        store.clone(),
        registry.clone(),
    );
    let first = handle.wait().await.unwrap();
    assert!(first.success);
    assert_eq!(backend.build_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.render_calls.load(Ordering::SeqCst), 1);

    let mut resumed_input = input;
    resumed_input.controls.skip_model_build = true;
    resumed_input.controls.skip_depth_render = true;

    let handle = start_pipeline(
        VenueId::new("venue-c"),
        resumed_input,
        backend.clone() as Arc<dyn ComputeBackend>,
        store,
        registry,
    );
    let second = handle.wait().await.unwrap();

    assert!(second.success);
    assert_eq!(backend.build_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.render_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.image_paths.len(), first.image_paths.len());
}

#[tokio::test]
async fn per_seat_failure_is_isolated_from_run_success() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::with_failing_seats(vec![
        "101_Front_1".to_string(),
    ]));

    let input = one_section_input("venue-d");
    let handle = start_pipeline(
        VenueId::new("venue-d"),
        input,
        backend as Arc<dyn ComputeBackend>,
        store,
        registry,
    );
    let result = handle.wait().await.unwrap();

    assert!(result.success);
    assert_eq!(result.failed_seats, vec!["101_Front_1".to_string()]);
    assert_eq!(result.images_generated + 1, 2);
}

#[tokio::test]
async fn cancel_before_start_yields_cancelled_terminal_stage() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::new());

    let input = one_section_input("venue-e");
    let handle = start_pipeline(
        VenueId::new("venue-e"),
        input,
        backend as Arc<dyn ComputeBackend>,
        store,
        registry,
    );
    handle.cancel();
    let result = handle.wait().await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error_message, None);
}

#[tokio::test]
async fn query_reaches_completed_stage_after_the_run_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let store = composite_store(dir.path());
    let registry = Arc::new(VenueRunRegistry::new());
    let backend = Arc::new(FakeBackend::new());

    let mut input = one_section_input("venue-f");
    input.controls.stop_after_model = true;
    let handle = start_pipeline(
        VenueId::new("venue-f"),
        input,
        backend as Arc<dyn ComputeBackend>,
        store,
        registry,
    );

    // `query()` is wait-free and must never panic, regardless of how far
    // the run has progressed by the time it's called.
    let _initial = handle.query();

    let run_id = handle.run_id();
    let result = handle.wait().await.unwrap();
    assert_eq!(run_id, run_id);
    assert!(result.success);
}
