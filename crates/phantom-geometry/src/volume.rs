use std::fmt;

use glam::{DMat3, DVec3};
use phantom_core::constants::{DEFAULT_MATERIAL, WORLD_MATERIAL, WORLD_NAME};
use serde::{Deserialize, Serialize};

use crate::shape::{Shape, ShapeKind};

/// A named geometric node: shape, material, placement and mother.
///
/// Children are never stored here; they are derived by the volume tree from
/// the `mother` names of all volumes. Instances are produced by
/// [`crate::manager::VolumeManager`], which owns the name registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    name: String,
    pub shape: Shape,
    pub material: String,
    pub translation: DVec3,
    pub rotation: DMat3,
    /// Parent volume name. `None` only for world roots.
    mother: Option<String>,
}

impl Volume {
    /// A fresh volume of `kind` with registry defaults, placed in the main world.
    pub(crate) fn new(kind: ShapeKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            shape: Shape::defaults(kind),
            material: DEFAULT_MATERIAL.to_string(),
            translation: DVec3::ZERO,
            rotation: DMat3::IDENTITY,
            mother: Some(WORLD_NAME.to_string()),
        }
    }

    /// The default main world volume.
    pub(crate) fn main_world() -> Self {
        Self {
            name: WORLD_NAME.to_string(),
            shape: Shape::world_box(),
            material: WORLD_MATERIAL.to_string(),
            translation: DVec3::ZERO,
            rotation: DMat3::IDENTITY,
            mother: None,
        }
    }

    /// Root volume of a parallel world.
    pub(crate) fn parallel_world(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shape: Shape::ParallelWorld,
            material: WORLD_MATERIAL.to_string(),
            translation: DVec3::ZERO,
            rotation: DMat3::IDENTITY,
            mother: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn mother(&self) -> Option<&str> {
        self.mother.as_deref()
    }

    /// Reparent this volume. Takes effect on the next tree rebuild.
    pub fn set_mother(&mut self, mother: impl Into<String>) {
        self.mother = Some(mother.into());
    }

    pub fn is_world_root(&self) -> bool {
        self.mother.is_none()
    }

    /// Every attribute except the name.
    pub fn info(&self) -> VolumeInfo {
        VolumeInfo {
            shape: self.shape.clone(),
            material: self.material.clone(),
            translation: self.translation,
            rotation: self.rotation,
            mother: self.mother.clone(),
        }
    }

    /// Overwrite every attribute except the name.
    pub(crate) fn apply_info(&mut self, info: &VolumeInfo) {
        self.shape = info.shape.clone();
        self.material = info.material.clone();
        self.translation = info.translation;
        self.rotation = info.rotation;
        self.mother = info.mother.clone();
    }
}

/// Attribute set of a volume, as stored in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub shape: Shape,
    pub material: String,
    pub translation: DVec3,
    pub rotation: DMat3,
    pub mother: Option<String>,
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) material: {}, mother: {}, translation: [{}, {}, {}]",
            self.name,
            self.kind(),
            self.material,
            self.mother.as_deref().unwrap_or("-"),
            self.translation.x,
            self.translation.y,
            self.translation.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_volume_defaults_to_main_world() {
        let v = Volume::new(ShapeKind::Sphere, "ball");
        assert_eq!(v.name(), "ball");
        assert_eq!(v.kind(), ShapeKind::Sphere);
        assert_eq!(v.mother(), Some(WORLD_NAME));
        assert_eq!(v.rotation, DMat3::IDENTITY);
        assert!(!v.is_world_root());
    }

    #[test]
    fn test_world_roots_have_no_mother() {
        assert!(Volume::main_world().is_world_root());
        let pw = Volume::parallel_world("pw1");
        assert!(pw.is_world_root());
        assert_eq!(pw.kind(), ShapeKind::ParallelWorld);
    }

    #[test]
    fn test_apply_info_keeps_name() {
        let mut target = Volume::new(ShapeKind::Box, "a");
        let mut source = Volume::new(ShapeKind::Tubs, "b");
        source.material = "G4_WATER".into();
        source.translation = DVec3::new(0.0, 0.0, 110.0);
        source.set_mother("c");
        target.apply_info(&source.info());
        assert_eq!(target.name(), "a");
        assert_eq!(target.kind(), ShapeKind::Tubs);
        assert_eq!(target.material, "G4_WATER");
        assert_eq!(target.mother(), Some("c"));
    }

    #[test]
    fn test_display_mentions_kind_and_mother() {
        let v = Volume::new(ShapeKind::Box, "waterbox");
        let s = v.to_string();
        assert!(s.contains("waterbox (Box)"));
        assert!(s.contains("mother: world"));
    }
}
