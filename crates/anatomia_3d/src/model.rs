//! Scene model interface
//!
//! Asset loading is somebody else's job. The highlight engine only needs to
//! enumerate a mounted model's renderable sub-parts, measure them and read or
//! write a per-part tint; [`SceneModel`] is exactly that surface.
//! [`MeshModel`] is the in-memory implementation used by headless hosts,
//! benches and tests.

use crate::bounds::BoundingBox;
use anatomia_core::{Color, Vec3};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a sub-part of a mounted model
    pub struct PartId;
}

/// Emissive tint applied to a sub-part's material
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint {
    pub emissive: Color,
    pub intensity: f32,
}

impl Tint {
    /// No emission
    pub const NEUTRAL: Tint = Tint {
        emissive: Color::BLACK,
        intensity: 0.0,
    };

    pub const fn new(emissive: Color, intensity: f32) -> Self {
        Self {
            emissive,
            intensity,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Tint::NEUTRAL
    }
}

impl Default for Tint {
    fn default() -> Self {
        Tint::NEUTRAL
    }
}

/// A mounted 3D model as seen by the highlight engine
pub trait SceneModel {
    /// Visit every renderable sub-part once
    fn for_each_part(&self, visit: &mut dyn FnMut(PartId));

    /// World-space bounds of a sub-part
    ///
    /// May be expensive (walks geometry); callers cache the result.
    fn compute_bounds(&self, part: PartId) -> Option<BoundingBox>;

    /// Current tint, `None` if the part does not exist
    fn tint(&self, part: PartId) -> Option<Tint>;

    /// Overwrite a part's tint; unknown parts are ignored
    fn set_tint(&mut self, part: PartId, tint: Tint);
}

/// One sub-part of a [`MeshModel`]
#[derive(Clone, Debug)]
pub struct MeshPart {
    pub name: String,
    /// Local-space vertex positions
    pub vertices: Vec<Vec3>,
    /// Local-to-world translation
    pub offset: Vec3,
    /// Non-renderable parts (bones, empties) are never enumerated
    pub renderable: bool,
    pub tint: Tint,
}

impl MeshPart {
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            vertices,
            offset: Vec3::ZERO,
            renderable: true,
            tint: Tint::NEUTRAL,
        }
    }

    /// Axis-aligned box part spanning `[y_min, y_max]` vertically
    pub fn slab(name: impl Into<String>, y_min: f32, y_max: f32) -> Self {
        Self::new(
            name,
            vec![Vec3::new(-1.0, y_min, -1.0), Vec3::new(1.0, y_max, 1.0)],
        )
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn non_renderable(mut self) -> Self {
        self.renderable = false;
        self
    }
}

/// In-memory model: a keyed set of parts owning their tints
#[derive(Clone, Debug, Default)]
pub struct MeshModel {
    parts: SlotMap<PartId, MeshPart>,
    tint_writes: u64,
}

impl MeshModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_part(&mut self, part: MeshPart) -> PartId {
        self.parts.insert(part)
    }

    pub fn part(&self, id: PartId) -> Option<&MeshPart> {
        self.parts.get(id)
    }

    pub fn part_by_name(&self, name: &str) -> Option<PartId> {
        self.parts
            .iter()
            .find(|(_, part)| part.name == name)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of `set_tint` calls that reached an existing part
    pub fn tint_writes(&self) -> u64 {
        self.tint_writes
    }

    /// A fresh instance of the same geometry with its own neutral tints
    ///
    /// Mirrors re-cloning a loaded asset for a new mount: geometry is shared
    /// content, tint state is not.
    pub fn instantiate(&self) -> MeshModel {
        let mut parts = self.parts.clone();
        for (_, part) in parts.iter_mut() {
            part.tint = Tint::NEUTRAL;
        }
        MeshModel {
            parts,
            tint_writes: 0,
        }
    }
}

impl SceneModel for MeshModel {
    fn for_each_part(&self, visit: &mut dyn FnMut(PartId)) {
        for (id, part) in self.parts.iter() {
            if part.renderable {
                visit(id);
            }
        }
    }

    fn compute_bounds(&self, part: PartId) -> Option<BoundingBox> {
        let part = self.parts.get(part)?;
        let bounds = BoundingBox::from_points(&part.vertices);
        if bounds.is_empty() {
            None
        } else {
            Some(bounds.translated(part.offset))
        }
    }

    fn tint(&self, part: PartId) -> Option<Tint> {
        self.parts.get(part).map(|p| p.tint)
    }

    fn set_tint(&mut self, part: PartId, tint: Tint) {
        if let Some(p) = self.parts.get_mut(part) {
            p.tint = tint;
            self.tint_writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerates_only_renderable_parts() {
        let mut model = MeshModel::new();
        let skin = model.add_part(MeshPart::slab("skin", 0.0, 10.0));
        model.add_part(MeshPart::slab("bone", 0.0, 10.0).non_renderable());

        let mut seen = Vec::new();
        model.for_each_part(&mut |id| seen.push(id));
        assert_eq!(seen, vec![skin]);
    }

    #[test]
    fn test_bounds_include_offset() {
        let mut model = MeshModel::new();
        let id = model
            .add_part(MeshPart::slab("arm", 0.0, 10.0).with_offset(Vec3::new(0.0, 100.0, 0.0)));
        let bounds = model.compute_bounds(id).unwrap();
        assert_eq!(bounds.vertical_center(), Some(105.0));

        let empty = model.add_part(MeshPart::new("empty", Vec::new()));
        assert!(model.compute_bounds(empty).is_none());
    }

    #[test]
    fn test_instantiate_resets_tints() {
        let mut model = MeshModel::new();
        let id = model.add_part(MeshPart::slab("leg", 0.0, 50.0));
        model.set_tint(id, Tint::new(Color::rgb(0.0, 1.0, 1.0), 0.5));
        assert_eq!(model.tint_writes(), 1);

        let fresh = model.instantiate();
        assert!(fresh.tint(id).unwrap().is_neutral());
        assert_eq!(fresh.tint_writes(), 0);
        assert_eq!(fresh.part_by_name("leg"), Some(id));
    }

    #[test]
    fn test_set_tint_on_unknown_part_is_ignored() {
        let mut model = MeshModel::new();
        let id = model.add_part(MeshPart::slab("leg", 0.0, 50.0));
        let mut donor = MeshModel::new();
        donor.add_part(MeshPart::slab("a", 0.0, 1.0));
        let foreign = donor.add_part(MeshPart::slab("b", 0.0, 1.0));

        model.set_tint(foreign, Tint::new(Color::rgb(0.0, 1.0, 1.0), 1.0));
        assert_eq!(model.tint_writes(), 0);
        assert!(model.tint(id).unwrap().is_neutral());
    }
}
