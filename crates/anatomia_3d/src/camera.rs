//! Coarse camera regions
//!
//! The camera controller only understands a handful of framing presets. A
//! hotspot's anchor picks one of them: anything far off the midline is on a
//! hand, otherwise height decides between head, torso and legs.

use crate::catalog::HotspotEntry;
use anatomia_core::Vec3;
use serde::{Deserialize, Serialize};

/// Lateral offset beyond which an anchor is framed as a hand
pub const HAND_LATERAL_THRESHOLD: f32 = 25.0;
/// Height above which an anchor is framed as the head
pub const HEAD_HEIGHT_THRESHOLD: f32 = 155.0;
/// Height above which an anchor is framed as the torso
pub const TORSO_HEIGHT_THRESHOLD: f32 = 80.0;

/// Camera framing preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraRegion {
    Head,
    Torso,
    Hand,
    Legs,
}

impl CameraRegion {
    /// Resolve the framing for an anchor position
    ///
    /// `x` is the lateral offset from the midline, `y` the height.
    pub fn for_position(position: Vec3) -> Self {
        if position.x.abs() > HAND_LATERAL_THRESHOLD {
            CameraRegion::Hand
        } else if position.y > HEAD_HEIGHT_THRESHOLD {
            CameraRegion::Head
        } else if position.y > TORSO_HEIGHT_THRESHOLD {
            CameraRegion::Torso
        } else {
            CameraRegion::Legs
        }
    }

    pub fn for_hotspot(entry: &HotspotEntry) -> Self {
        Self::for_position(entry.position)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CameraRegion::Head => "head",
            CameraRegion::Torso => "torso",
            CameraRegion::Hand => "hand",
            CameraRegion::Legs => "legs",
        }
    }
}

impl std::fmt::Display for CameraRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> CameraRegion {
        CameraRegion::for_position(Vec3::new(x, y, 0.0))
    }

    #[test]
    fn test_lateral_offset_wins() {
        assert_eq!(at(26.0, 170.0), CameraRegion::Hand);
        assert_eq!(at(-26.0, 10.0), CameraRegion::Hand);
        assert_eq!(at(25.0, 170.0), CameraRegion::Head);
        assert_eq!(at(-25.0, 10.0), CameraRegion::Legs);
    }

    #[test]
    fn test_height_thresholds_are_strict() {
        assert_eq!(at(0.0, 155.1), CameraRegion::Head);
        assert_eq!(at(0.0, 155.0), CameraRegion::Torso);
        assert_eq!(at(0.0, 80.1), CameraRegion::Torso);
        assert_eq!(at(0.0, 80.0), CameraRegion::Legs);
        assert_eq!(at(0.0, -5.0), CameraRegion::Legs);
    }

    #[test]
    fn test_for_hotspot_and_display() {
        let entry = HotspotEntry::new("nasus", "Nasus", Vec3::new(0.0, 162.0, 9.0), 158.0, 166.0);
        let region = CameraRegion::for_hotspot(&entry);
        assert_eq!(region, CameraRegion::Head);
        assert_eq!(region.to_string(), "head");
    }
}
