//! Wire DTOs for the three remote compute calls. Byte payloads are
//! base64-encoded only at this boundary; callers inside `seatview-engine`
//! work with raw `Vec<u8>` in memory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use seatview_core::model::{ImageModel, Seat, SurfaceConfig};

/// Request for `build_venue_model`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildModelRequest<'a> {
    /// Surface geometry and kind-specific attributes.
    pub surface_config: &'a SurfaceConfig,
    /// Sections filtered by `selected_section_ids`, keyed by section id.
    pub sections: &'a BTreeMap<String, seatview_core::model::SectionParams>,
}

/// Response from `build_venue_model`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildModelResponse {
    /// Base64-encoded `.blend` file bytes.
    pub blend_base64: String,
    /// Base64-encoded preview PNG bytes.
    pub preview_base64: String,
}

/// Request for one batched depth-render call.
#[derive(Debug, Clone, Serialize)]
pub struct RenderDepthBatchRequest<'a> {
    /// Base64-encoded `.blend` file bytes.
    pub blend_base64: String,
    /// Seats to render in this batch.
    pub seats: &'a [Seat],
}

/// Response from a batched depth-render call.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderDepthBatchResponse {
    /// Seat id -> base64-encoded depth PNG bytes.
    pub depths_base64: BTreeMap<String, String>,
}

/// Request for one image-synthesis call.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesizeImageRequest<'a> {
    /// Base64-encoded depth-map PNG bytes for this seat.
    pub depth_base64: String,
    /// Text prompt.
    pub prompt: &'a str,
    /// Generator variant, drives backend routing and cost.
    pub model: ImageModel,
    /// Denoising strength.
    pub strength: f64,
    /// Optional base64-encoded conditioning reference image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_base64: Option<String>,
    /// IP-Adapter conditioning scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_adapter_scale: Option<f64>,
}

/// Response from one image-synthesis call.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizeImageResponse {
    /// Base64-encoded final JPEG bytes.
    pub image_base64: String,
}
