//! Anatomia 3D
//!
//! The interactive half of the anatomy viewer:
//!
//! - **Catalog**: immutable hotspot definitions (anchor, label, vertical band)
//! - **Model**: the narrow interface to a mounted 3D model, plus an in-memory
//!   mesh model used by headless hosts and tests
//! - **Highlight**: a per-mount cache of sub-part vertical centers that turns
//!   the per-frame "what lies under this hotspot band" query into lookups
//! - **Camera**: coarse camera regions resolved from hotspot geometry

pub mod bounds;
pub mod camera;
pub mod catalog;
pub mod error;
pub mod highlight;
pub mod model;
pub mod prelude;

pub use bounds::BoundingBox;
pub use camera::CameraRegion;
pub use catalog::{HotspotCatalog, HotspotEntry, HotspotKind};
pub use error::{CatalogError, Result};
pub use highlight::{HighlightController, HighlightOutcome, HighlightStyle, SpatialHighlightIndex};
pub use model::{MeshModel, MeshPart, PartId, SceneModel, Tint};
