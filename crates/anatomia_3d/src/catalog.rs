//! Hotspot catalog
//!
//! The catalog is loaded once from static content and never mutated. It is
//! cheap to clone: entries and the id index are shared.

use crate::error::{CatalogError, Result};
use anatomia_animation::MotionSnapshot;
use anatomia_core::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Marker classification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    /// A single anatomical landmark, drawn as a pulsing dot
    #[default]
    Point,
    /// A region, drawn as a breathing ring
    Area,
}

impl HotspotKind {
    /// Marker scale for this kind in the given frame
    pub fn marker_scale(self, motion: &MotionSnapshot) -> f32 {
        match self {
            HotspotKind::Point => motion.pulse_scale,
            HotspotKind::Area => motion.area_ring_scale,
        }
    }
}

/// One cataloged anatomical region or point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotspotEntry {
    pub id: String,
    /// 3D anchor of the marker
    pub position: Vec3,
    /// Display label, also the expected answer in dictation
    pub label: String,
    /// Grammatical forms of the label, shown as a hint
    #[serde(default)]
    pub word_forms: Option<String>,
    /// Lower bound of the vertical coverage band
    pub y_min: f32,
    /// Upper bound of the vertical coverage band
    pub y_max: f32,
    /// Marker size
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default)]
    pub kind: HotspotKind,
    /// Pronunciation clip reference
    #[serde(default)]
    pub audio: Option<String>,
}

fn default_size() -> f32 {
    1.0
}

impl HotspotEntry {
    /// Create a point hotspot with the given band
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        position: Vec3,
        y_min: f32,
        y_max: f32,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
            word_forms: None,
            y_min,
            y_max,
            size: default_size(),
            kind: HotspotKind::Point,
            audio: None,
        }
    }

    /// Check if a height lies inside the band (inclusive)
    pub fn covers_height(&self, y: f32) -> bool {
        y >= self.y_min && y <= self.y_max
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyId(index));
        }
        if self.label.trim().is_empty() {
            return Err(CatalogError::EmptyLabel(self.id.clone()));
        }
        if !self.y_min.is_finite() || !self.y_max.is_finite() || self.y_min > self.y_max {
            return Err(CatalogError::InvalidBand {
                id: self.id.clone(),
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }
}

/// Immutable, validated set of hotspots
#[derive(Clone, Debug)]
pub struct HotspotCatalog {
    entries: Arc<[HotspotEntry]>,
    by_id: Arc<FxHashMap<String, usize>>,
}

impl HotspotCatalog {
    /// Validate and index a list of entries
    ///
    /// Rejects empty ids and labels, duplicate ids and inverted bands.
    pub fn new(entries: Vec<HotspotEntry>) -> Result<Self> {
        let mut by_id = FxHashMap::default();
        by_id.reserve(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            entry.validate(index)?;
            if by_id.insert(entry.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }

        tracing::debug!("HotspotCatalog: loaded {} hotspots", entries.len());
        Ok(Self {
            entries: entries.into(),
            by_id: Arc::new(by_id),
        })
    }

    /// Parse a JSON array of entries
    pub fn from_json(source: &str) -> Result<Self> {
        let entries: Vec<HotspotEntry> = serde_json::from_str(source)?;
        Self::new(entries)
    }

    /// Serialize the catalog back to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.entries)?)
    }

    pub fn get(&self, id: &str) -> Option<&HotspotEntry> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HotspotEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HotspotEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a HotspotCatalog {
    type Item = &'a HotspotEntry;
    type IntoIter = std::slice::Iter<'a, HotspotEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
