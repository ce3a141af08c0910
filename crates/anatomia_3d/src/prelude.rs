//! Common imports for scene composition
//!
//! ```ignore
//! use anatomia_3d::prelude::*;
//! ```

pub use crate::bounds::BoundingBox;
pub use crate::camera::CameraRegion;
pub use crate::catalog::{HotspotCatalog, HotspotEntry, HotspotKind};
pub use crate::highlight::{HighlightController, HighlightStyle, SpatialHighlightIndex};
pub use crate::model::{MeshModel, PartId, SceneModel, Tint};

pub use anatomia_animation::{FrameScheduler, MotionReader, SharedMotionState};
pub use anatomia_core::{Color, Vec3};
