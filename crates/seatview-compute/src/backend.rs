//! `ComputeBackend`: the injected-dependency seam for the three remote
//! compute calls, so test suites can substitute a fake backend instead of
//! the real `reqwest`-based [`crate::client::ComputeClient`] — the same
//! re-architecture §9 calls for in place of a module-level singleton
//! client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use seatview_core::model::{SectionParams, Seat, SurfaceConfig};

use crate::client::{BuiltModel, ComputeClient, SynthesizedImage};
use crate::error::ComputeError;

/// The three blocking remote jobs the orchestrator invokes as RPC-style
/// calls: model build, batched depth render, and image synthesis.
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    /// `build_venue_model_activity`.
    async fn build_model(
        &self,
        surface_config: &SurfaceConfig,
        sections: &BTreeMap<String, SectionParams>,
    ) -> Result<BuiltModel, ComputeError>;

    /// `render_depth_maps_activity` for one batch.
    async fn render_depth_batch(
        &self,
        blend: &[u8],
        seats: &[Seat],
    ) -> Result<BTreeMap<String, Vec<u8>>, ComputeError>;

    /// `generate_ai_image_activity` for one seat.
    #[allow(clippy::too_many_arguments)]
    async fn synthesize_image(
        &self,
        depth: &[u8],
        prompt: &str,
        model: seatview_core::model::ImageModel,
        strength: f64,
        reference_image: Option<&[u8]>,
        ip_adapter_scale: Option<f64>,
    ) -> Result<SynthesizedImage, ComputeError>;
}

#[async_trait]
impl ComputeBackend for ComputeClient {
    async fn build_model(
        &self,
        surface_config: &SurfaceConfig,
        sections: &BTreeMap<String, SectionParams>,
    ) -> Result<BuiltModel, ComputeError> {
        ComputeClient::build_model(self, surface_config, sections).await
    }

    async fn render_depth_batch(
        &self,
        blend: &[u8],
        seats: &[Seat],
    ) -> Result<BTreeMap<String, Vec<u8>>, ComputeError> {
        ComputeClient::render_depth_batch(self, blend, seats).await
    }

    async fn synthesize_image(
        &self,
        depth: &[u8],
        prompt: &str,
        model: seatview_core::model::ImageModel,
        strength: f64,
        reference_image: Option<&[u8]>,
        ip_adapter_scale: Option<f64>,
    ) -> Result<SynthesizedImage, ComputeError> {
        ComputeClient::synthesize_image(
            self,
            depth,
            prompt,
            model,
            strength,
            reference_image,
            ip_adapter_scale,
        )
        .await
    }
}
