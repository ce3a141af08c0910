//! Axis-aligned bounds of model parts
//!
//! The highlight cache only ever asks one question of a part's geometry:
//! where is its vertical center. Bounds are measured once per part from its
//! local vertices and shifted into world space.

use anatomia_core::Vec3;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Inverted box that any point expands
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; empty for no points
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        points.into_iter().fold(Self::empty(), |mut bounds, point| {
            bounds.expand_to_include(*point);
            bounds
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Vertical (Y) center, or `None` for an empty box
    pub fn vertical_center(&self) -> Option<f32> {
        (!self.is_empty()).then(|| (self.min.y + self.max.y) * 0.5)
    }

    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Shift into another frame; empty boxes stay empty
    pub fn translated(&self, offset: Vec3) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let shift = |v: Vec3| Vec3::new(v.x + offset.x, v.y + offset.y, v.z + offset.z);
        BoundingBox::new(shift(self.min), shift(self.max))
    }
}
