//! Resume Probe: answers "what can we skip?" without performing work, by
//! asking the artifact store what already exists. Degrades to "nothing
//! exists" when the store is unreachable — the probe never invents state
//! it cannot justify from a read.

use std::collections::{BTreeMap, BTreeSet};

use seatview_core::artifact::ArtifactKind;
use seatview_core::model::{SectionParams, Seat, SurfaceConfig};
use seatview_store::{layout, ArtifactStore};

/// Content hash of the inputs that determine a venue model's shape,
/// resolving Open Question 2: the bare presence of `venue_model.blend`
/// does not prove it matches the current input, so a hash sidecar is
/// checked alongside it.
pub(crate) fn model_input_hash(surface_config: &SurfaceConfig, sections: &BTreeMap<String, SectionParams>) -> String {
    let mut hasher = blake3::Hasher::new();
    let surface_bytes =
        serde_json::to_vec(surface_config).expect("SurfaceConfig always serializes");
    let sections_bytes = serde_json::to_vec(sections).expect("sections always serialize");
    hasher.update(&surface_bytes);
    hasher.update(&sections_bytes);
    hasher.finalize().to_hex().to_string()
}

/// Outcome of probing for a reusable model build.
pub(crate) enum ModelProbe {
    /// A cached model matching the current input hash was found; its
    /// bytes are returned for reuse.
    Reusable(Vec<u8>),
    /// No cached model, or the cached one doesn't match the current
    /// input; the build stage should run.
    NeedsBuild,
}

/// If `skip_model_build` is set, checks for a cached `.blend` whose hash
/// sidecar matches `input_hash`. Returns [`ModelProbe::NeedsBuild`] both
/// when skipping is disabled and when the store has nothing to offer.
pub(crate) async fn probe_model(
    store: &dyn ArtifactStore,
    venue_id: &str,
    skip_model_build: bool,
    input_hash: &str,
) -> ModelProbe {
    if !skip_model_build {
        return ModelProbe::NeedsBuild;
    }
    let hash_key = layout::venue_model_hash_key(venue_id);
    let Ok(stored_hash) = store.get(&hash_key).await else {
        return ModelProbe::NeedsBuild;
    };
    if stored_hash != input_hash.as_bytes() {
        return ModelProbe::NeedsBuild;
    }
    let model_key = layout::venue_key(venue_id, ArtifactKind::Model);
    match store.get(&model_key).await {
        Ok(bytes) => ModelProbe::Reusable(bytes),
        Err(_) => ModelProbe::NeedsBuild,
    }
}

/// Outcome of probing for reusable depth maps.
pub(crate) struct DepthProbe {
    /// Depth bytes already present for seats in `seats_to_render`.
    pub(crate) existing: BTreeMap<String, Vec<u8>>,
    /// Seats still missing a depth map and requiring a render call.
    pub(crate) missing: Vec<Seat>,
}

/// If `skip_depth_render` is set, loads existing depth bytes for every
/// seat in `seats_to_render` that the store already has. Seats without a
/// stored depth map are returned in `missing` for a partial render
/// (resolves Open Question 1: partial resume renders only the gap rather
/// than a full re-render or a hard failure).
pub(crate) async fn probe_depths(
    store: &dyn ArtifactStore,
    venue_id: &str,
    skip_depth_render: bool,
    seats_to_render: &[Seat],
) -> DepthProbe {
    if !skip_depth_render {
        return DepthProbe {
            existing: BTreeMap::new(),
            missing: seats_to_render.to_vec(),
        };
    }

    let mut existing = BTreeMap::new();
    let mut missing = Vec::new();
    for seat in seats_to_render {
        let key = layout::venue_seat_key(venue_id, ArtifactKind::DepthMap, &seat.id);
        match store.get(&key).await {
            Ok(bytes) => {
                existing.insert(seat.id.clone(), bytes);
            }
            Err(_) => missing.push(seat.clone()),
        }
    }
    DepthProbe { existing, missing }
}

/// Lists the seat ids with a final image already persisted, treated as
/// `existing` by the fan-out coordinator regardless of any skip flag —
/// image synthesis always checks this before dispatching work.
pub(crate) async fn existing_final_images(
    store: &dyn ArtifactStore,
    venue_id: &str,
) -> BTreeSet<String> {
    let prefix = layout::venue_list_prefix(venue_id, ArtifactKind::FinalImage);
    let venue_prefix = format!("{venue_id}/");
    let Ok(keys) = store.list(&prefix).await else {
        return BTreeSet::new();
    };
    keys.iter()
        .filter_map(|key| {
            let relative = key.strip_prefix(&venue_prefix)?;
            ArtifactKind::FinalImage.seat_id_from_key(relative)
        })
        .collect()
}
