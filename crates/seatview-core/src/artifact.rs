//! Canonical artifact kinds and path layout, relative to a venue-scoped
//! prefix `{venue_id}/`.

use std::fmt;

/// The four kinds of artifact the pipeline produces, plus the per-seat
/// JSON seat dumps used by the resume probe and the REST contract's
/// documented layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `venue_model.blend`, one per run.
    Model,
    /// `preview.png`, one per run.
    Preview,
    /// `depth_maps/{seat_id}_depth.png`.
    DepthMap,
    /// `final_images/{seat_id}_final.jpg`.
    FinalImage,
    /// `seats.json`, the full `all_seats` + `anchor_seats` dump.
    SeatsJson,
    /// `anchor_seats.json`, the bare anchor-subset array.
    AnchorSeatsJson,
}

impl ArtifactKind {
    /// The directory `List` operates over, for kinds that are listable by
    /// seat id (`DepthMap`, `FinalImage`). Other kinds are singletons.
    pub fn list_prefix(self) -> Option<&'static str> {
        match self {
            ArtifactKind::DepthMap => Some("depth_maps/"),
            ArtifactKind::FinalImage => Some("final_images/"),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::DepthMap => "_depth.png",
            ArtifactKind::FinalImage => "_final.jpg",
            _ => "",
        }
    }

    /// Canonical key for a seat-scoped artifact kind.
    pub fn key_for_seat(self, seat_id: &str) -> String {
        match self {
            ArtifactKind::DepthMap => format!("depth_maps/{seat_id}{}", self.suffix()),
            ArtifactKind::FinalImage => format!("final_images/{seat_id}{}", self.suffix()),
            _ => panic!("{self:?} is not a seat-scoped artifact kind"),
        }
    }

    /// Canonical key for a singleton artifact kind.
    pub fn key(self) -> &'static str {
        match self {
            ArtifactKind::Model => "venue_model.blend",
            ArtifactKind::Preview => "preview.png",
            ArtifactKind::SeatsJson => "seats.json",
            ArtifactKind::AnchorSeatsJson => "anchor_seats.json",
            ArtifactKind::DepthMap | ArtifactKind::FinalImage => {
                panic!("{self:?} is seat-scoped, use key_for_seat")
            }
        }
    }

    /// Hash sidecar key for the model artifact (resolves Open Question 2:
    /// model-cache validation by content hash, not file presence alone).
    pub fn model_hash_key() -> &'static str {
        "venue_model.blend.hash"
    }

    /// Strips a listed key back down to its bare seat id, given this kind's
    /// prefix and suffix. Returns `None` if the key doesn't match the
    /// expected shape.
    pub fn seat_id_from_key(self, key: &str) -> Option<String> {
        let prefix = self.list_prefix()?;
        let stripped = key.strip_prefix(prefix)?;
        stripped.strip_suffix(self.suffix()).map(|s| s.to_string())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => write!(f, "model"),
            ArtifactKind::Preview => write!(f, "preview"),
            ArtifactKind::DepthMap => write!(f, "depth_map"),
            ArtifactKind::FinalImage => write!(f, "final_image"),
            ArtifactKind::SeatsJson => write!(f, "seats_json"),
            ArtifactKind::AnchorSeatsJson => write!(f, "anchor_seats_json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_seat_id_through_key() {
        let key = ArtifactKind::DepthMap.key_for_seat("101_Front_1");
        assert_eq!(key, "depth_maps/101_Front_1_depth.png");
        assert_eq!(
            ArtifactKind::DepthMap.seat_id_from_key(&key).as_deref(),
            Some("101_Front_1")
        );
    }
}
