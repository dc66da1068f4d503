//! Domain types for the Input Snapshot, derived seats, and run progress.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// Coarse elevation band of a seating section, controlling geometric
/// defaults and anchor-sampling grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Field/court-level seating.
    Floor,
    /// Lower bowl.
    Lower,
    /// Mid-level bowl.
    Mid,
    /// Upper bowl.
    Upper,
    /// Premium club seating.
    Club,
}

/// Kind of playing surface the venue is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Ice rink.
    Rink,
    /// Basketball-style court.
    Court,
    /// Concert/event stage.
    Stage,
    /// Open field.
    Field,
}

/// Geometry parameters for a single seating section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    /// Elevation band this section belongs to.
    pub tier: Tier,
    /// Section center azimuth, degrees, -180..180.
    pub angle: f64,
    /// Distance from surface center to row 0, meters.
    pub inner_radius: f64,
    /// Number of rows in the section.
    pub rows: u32,
    /// Radial distance added per row, meters.
    pub row_depth: f64,
    /// Height added per row, meters.
    pub row_rise: f64,
    /// Height of row 0 above the surface, meters.
    pub base_height: f64,
}

/// Surface dimensions plus kind-specific attributes forwarded verbatim to
/// the compute backend's model-build call. The orchestrator never inspects
/// `extra` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Kind of surface (rink, court, stage, field).
    pub kind: SurfaceKind,
    /// Surface width, meters.
    pub width: f64,
    /// Surface length, meters.
    pub length: f64,
    /// Kind-specific knobs (ice markings, free-throw geometry, ...)
    /// interpreted only by the out-of-scope geometry scripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Generative model variant used for image synthesis, and its per-call cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageModel {
    /// Flux diffusion model.
    Flux,
    /// Stable Diffusion XL.
    Sdxl,
    /// ControlNet-conditioned synthesis.
    Controlnet,
    /// IP-Adapter-conditioned synthesis.
    IpAdapter,
}

/// Execution controls that steer which stages run and how far they go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionControls {
    /// Terminate as COMPLETED right after model build + persistence.
    #[serde(default)]
    pub stop_after_model: bool,
    /// Terminate as COMPLETED right after depth rendering.
    #[serde(default)]
    pub stop_after_depths: bool,
    /// Skip image synthesis entirely (terminate as COMPLETED after depths).
    #[serde(default)]
    pub skip_ai_generation: bool,
    /// Reuse an existing `venue_model.blend` if present.
    #[serde(default)]
    pub skip_model_build: bool,
    /// Reuse existing depth maps if present.
    #[serde(default)]
    pub skip_depth_render: bool,
    /// Seats per remote depth-render call.
    #[serde(default = "default_depth_batch_size")]
    pub depth_batch_size: usize,
    /// Seats per concurrent image-synthesis batch.
    #[serde(default = "default_parallel_image_batch_size")]
    pub parallel_image_batch_size: usize,
}

fn default_depth_batch_size() -> usize {
    10
}

fn default_parallel_image_batch_size() -> usize {
    5
}

impl Default for ExecutionControls {
    fn default() -> Self {
        Self {
            stop_after_model: false,
            stop_after_depths: false,
            skip_ai_generation: false,
            skip_model_build: false,
            skip_depth_render: false,
            depth_batch_size: default_depth_batch_size(),
            parallel_image_batch_size: default_parallel_image_batch_size(),
        }
    }
}

/// Immutable input to a run, captured at start time and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Venue this run targets.
    pub venue_id: String,
    /// Section id -> geometry parameters.
    pub sections: BTreeMap<String, SectionParams>,
    /// Optional subset filter over `sections`; absent means all sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_section_ids: Option<BTreeSet<String>>,
    /// Optional explicit seat id list overriding the anchor subset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_seats: Option<BTreeSet<String>>,
    /// Playing-surface geometry.
    pub surface_config: SurfaceConfig,
    /// Text prompt for image synthesis.
    pub prompt: String,
    /// Generator variant.
    pub model: ImageModel,
    /// Denoising strength passed to the generator.
    pub strength: f64,
    /// Optional conditioning reference image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<Vec<u8>>,
    /// IP-Adapter conditioning scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_adapter_scale: Option<f64>,
    /// Stage/skip/early-stop controls.
    #[serde(default)]
    pub controls: ExecutionControls,
}

/// Row position within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowLabel {
    /// Row 0.
    Front,
    /// Row `rows / 2`.
    Middle,
    /// Row `rows - 1`.
    Back,
}

impl RowLabel {
    /// String form used in seat ids (`"{section}_{row_label}_{seat}"`).
    pub fn as_str(self) -> &'static str {
        match self {
            RowLabel::Front => "Front",
            RowLabel::Middle => "Middle",
            RowLabel::Back => "Back",
        }
    }
}

/// A single derived seat, computed deterministically from section geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    /// `"{section}_{row_label}_{seat}"`.
    pub id: String,
    /// Owning section id.
    pub section: String,
    /// Row label (Front/Middle/Back).
    pub row: RowLabel,
    /// Column-1 seat number (always 1; single center column per row).
    pub seat: u32,
    /// Elevation band inherited from the section.
    pub tier: Tier,
    /// Meters, 3-decimal rounded.
    pub x: f64,
    /// Meters, 3-decimal rounded.
    pub y: f64,
    /// Meters, 3-decimal rounded.
    pub z: f64,
    /// Degrees, 2-decimal rounded, facing the surface center.
    pub look_angle: f64,
}

/// Forward-only pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Run created, not yet started.
    Pending,
    /// Computing `all_seats`/`anchor_seats`.
    GeneratingSeats,
    /// Building or loading the venue 3D model.
    BuildingModel,
    /// Rendering or loading per-seat depth maps.
    RenderingDepths,
    /// Synthesizing final images.
    GeneratingImages,
    /// Terminal: finished, possibly with per-seat failures.
    Completed,
    /// Terminal: unrecoverable error.
    Failed,
    /// Terminal: cancelled by caller.
    Cancelled,
}

impl Stage {
    /// `current_step` in the 1-4 progress counter, or `None` for terminal
    /// and pre-start stages.
    pub fn current_step(self) -> Option<u8> {
        match self {
            Stage::Pending => None,
            Stage::GeneratingSeats => Some(1),
            Stage::BuildingModel => Some(2),
            Stage::RenderingDepths => Some(3),
            Stage::GeneratingImages => Some(4),
            Stage::Completed | Stage::Failed | Stage::Cancelled => None,
        }
    }

    /// Whether this stage is one of the three terminal stages.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed | Stage::Cancelled)
    }
}

/// Total number of non-terminal stages in the state machine.
pub const TOTAL_STEPS: u8 = 4;

/// Point-in-time, wait-free-readable copy of a run's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Run this snapshot belongs to.
    pub run_id: RunId,
    /// Current stage.
    pub stage: Stage,
    /// 1-4, or `None` outside the four numbered stages.
    pub current_step: Option<u8>,
    /// Always `TOTAL_STEPS`.
    pub total_steps: u8,
    /// Human-readable status line.
    pub message: String,
    /// Seat id currently being processed, if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,
    /// Monotonic non-decreasing while the run is non-terminal.
    pub seats_generated: u32,
    /// Monotonic non-decreasing while the run is non-terminal.
    pub depth_maps_rendered: u32,
    /// Monotonic non-decreasing while the run is non-terminal.
    pub images_generated: u32,
    /// Seat ids that exhausted retry during image synthesis. Append-only.
    pub failed_items: Vec<String>,
    /// Running estimated cost, USD.
    pub estimated_cost: f64,
    /// Running actual cost, USD, incremented on each successful call.
    pub actual_cost: f64,
}

impl ProgressSnapshot {
    /// Fresh PENDING snapshot for a new run.
    pub fn pending(run_id: RunId) -> Self {
        Self {
            run_id,
            stage: Stage::Pending,
            current_step: None,
            total_steps: TOTAL_STEPS,
            message: "pending".to_string(),
            current_item: None,
            seats_generated: 0,
            depth_maps_rendered: 0,
            images_generated: 0,
            failed_items: Vec::new(),
            estimated_cost: 0.0,
            actual_cost: 0.0,
        }
    }
}

/// Outcome of a completed `Run`, returned to the caller regardless of
/// success (errors are captured, never thrown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Venue the run targeted.
    pub venue_id: String,
    /// `true` unless the run terminated FAILED.
    pub success: bool,
    /// `all_seats` count computed in stage 1.
    pub all_seats_count: u32,
    /// Count of depth maps rendered (or reused) in stage 3.
    pub depth_maps_rendered: u32,
    /// Count of images synthesized in stage 4.
    pub images_generated: u32,
    /// Artifact paths of the synthesized images.
    pub image_paths: Vec<String>,
    /// Seat ids whose synthesis exhausted retry.
    pub failed_seats: Vec<String>,
    /// Running total cost, USD.
    pub total_cost: f64,
    /// Wall-clock run duration, seconds.
    pub duration_seconds: f64,
    /// Populated only when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
