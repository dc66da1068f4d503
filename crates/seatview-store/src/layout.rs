//! Canonical key layout, relative to a venue-scoped prefix `{venue_id}/`.

use seatview_core::artifact::ArtifactKind;

/// Joins a venue id and an [`ArtifactKind`]'s canonical singleton key.
pub fn venue_key(venue_id: &str, kind: ArtifactKind) -> String {
    format!("{venue_id}/{}", kind.key())
}

/// Joins a venue id and an [`ArtifactKind`]'s canonical per-seat key.
pub fn venue_seat_key(venue_id: &str, kind: ArtifactKind, seat_id: &str) -> String {
    format!("{venue_id}/{}", kind.key_for_seat(seat_id))
}

/// Joins a venue id and the model's content-hash sidecar key (resolves
/// Open Question 2: cache validation beyond bare file presence).
pub fn venue_model_hash_key(venue_id: &str) -> String {
    format!("{venue_id}/{}", ArtifactKind::model_hash_key())
}

/// Joins a venue id and a listable kind's directory prefix (`DepthMap`,
/// `FinalImage`).
pub fn venue_list_prefix(venue_id: &str, kind: ArtifactKind) -> String {
    let prefix = kind
        .list_prefix()
        .expect("venue_list_prefix called with a non-listable kind");
    format!("{venue_id}/{prefix}")
}
