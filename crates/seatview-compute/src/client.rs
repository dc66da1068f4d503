//! HTTP client wrapping the three remote compute-backend calls: model
//! build, batched depth render, and image synthesis.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode, Url};
use seatview_core::model::{ImageModel, Seat, SectionParams, SurfaceConfig};

use crate::dto::{
    BuildModelRequest, BuildModelResponse, RenderDepthBatchRequest, RenderDepthBatchResponse,
    SynthesizeImageRequest, SynthesizeImageResponse,
};
use crate::error::{ApiErrorBody, ComputeError};

/// Output of a successful model-build call, decoded to raw bytes.
pub struct BuiltModel {
    /// `.blend` file bytes.
    pub blend: Vec<u8>,
    /// Preview PNG bytes.
    pub preview: Vec<u8>,
}

/// Output of a successful synthesis call.
pub struct SynthesizedImage {
    /// Final JPEG bytes.
    pub image: Vec<u8>,
}

/// Thin wrapper over [`reqwest::Client`] for the compute backend's three
/// blocking jobs, per §1's "RPC-style calls with bytes in / bytes out".
#[derive(Debug, Clone)]
pub struct ComputeClient {
    http: Client,
    base_url: Url,
}

impl ComputeClient {
    /// Builds a client against `base_url`, with per-call timeouts matching
    /// the upper bounds in §5 applied by the caller via `tokio::time::timeout`
    /// rather than here, since each call has a different bound. A trailing
    /// slash is appended to the path if missing so `Url::join` extends it
    /// instead of replacing its last segment.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(15 * 60))
                .build()
                .expect("reqwest client builds with default TLS backend"),
            base_url,
        }
    }

    /// `build_venue_model_activity`: `(surface_config, filtered sections) -> (blend, preview)`.
    pub async fn build_model(
        &self,
        surface_config: &SurfaceConfig,
        sections: &BTreeMap<String, SectionParams>,
    ) -> Result<BuiltModel, ComputeError> {
        let url = join(&self.base_url, "build-model");
        let body = BuildModelRequest {
            surface_config,
            sections,
        };
        let resp: BuildModelResponse = post_json(&self.http, url, &body).await?;
        Ok(BuiltModel {
            blend: decode(&resp.blend_base64)?,
            preview: decode(&resp.preview_base64)?,
        })
    }

    /// `render_depth_maps_activity` for one batch: `(blend, batch seats) -> {seat_id: png}`.
    pub async fn render_depth_batch(
        &self,
        blend: &[u8],
        seats: &[Seat],
    ) -> Result<BTreeMap<String, Vec<u8>>, ComputeError> {
        let url = join(&self.base_url, "render-depth-batch");
        let body = RenderDepthBatchRequest {
            blend_base64: BASE64.encode(blend),
            seats,
        };
        let resp: RenderDepthBatchResponse = post_json(&self.http, url, &body).await?;
        resp.depths_base64
            .into_iter()
            .map(|(seat_id, b64)| decode(&b64).map(|bytes| (seat_id, bytes)))
            .collect()
    }

    /// `generate_ai_image_activity`: `(depth, prompt, model, strength, ref_image?, ip_adapter_scale?) -> image`.
    #[allow(clippy::too_many_arguments)]
    pub async fn synthesize_image(
        &self,
        depth: &[u8],
        prompt: &str,
        model: ImageModel,
        strength: f64,
        reference_image: Option<&[u8]>,
        ip_adapter_scale: Option<f64>,
    ) -> Result<SynthesizedImage, ComputeError> {
        let url = join(&self.base_url, "synthesize-image");
        let body = SynthesizeImageRequest {
            depth_base64: BASE64.encode(depth),
            prompt,
            model,
            strength,
            reference_image_base64: reference_image.map(|bytes| BASE64.encode(bytes)),
            ip_adapter_scale,
        };
        let resp: SynthesizeImageResponse = post_json(&self.http, url, &body).await?;
        Ok(SynthesizedImage {
            image: decode(&resp.image_base64)?,
        })
    }
}

fn join(base: &Url, segment: &str) -> Url {
    base.join(segment)
        .expect("compute backend path segments are static and always valid")
}

fn decode(b64: &str) -> Result<Vec<u8>, ComputeError> {
    BASE64
        .decode(b64)
        .map_err(|e| ComputeError::Transient(format!("malformed base64 payload: {e}")))
}

async fn post_json<B, R>(http: &Client, url: Url, body: &B) -> Result<R, ComputeError>
where
    B: serde::Serialize + ?Sized,
    R: serde::de::DeserializeOwned,
{
    let res = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ComputeError::Transient(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        let text = res
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if let Ok(err_body) = serde_json::from_str::<ApiErrorBody>(&text) {
            return Err(classify(status, &err_body));
        }
        return Err(ComputeError::Transient(format!("http {status}: {text}")));
    }

    res.json::<R>()
        .await
        .map_err(|e| ComputeError::Transient(format!("malformed response body: {e}")))
}

fn classify(status: StatusCode, body: &ApiErrorBody) -> ComputeError {
    match body.code.as_str() {
        "rate_limited" => ComputeError::RateLimited(body.message.clone()),
        "invalid_config" | "configuration_error" => {
            ComputeError::Configuration(body.message.clone())
        }
        "auth_error" | "unauthorized" => ComputeError::Auth(body.message.clone()),
        _ if status == StatusCode::TOO_MANY_REQUESTS => {
            ComputeError::RateLimited(body.message.clone())
        }
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            ComputeError::Auth(body.message.clone())
        }
        _ => ComputeError::Transient(body.message.clone()),
    }
}
