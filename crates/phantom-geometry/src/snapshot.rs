//! Plain-data form of the volume registry and its two-phase restore.
//!
//! Restore first creates every node so that forward mother references
//! resolve, then applies the attributes, then checks that each volume landed
//! in the world the snapshot says it belongs to.

use log::{debug, info};
use phantom_core::constants::WORLD_NAME;
use phantom_core::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

use crate::manager::VolumeManager;
use crate::shape::ShapeKind;
use crate::volume::{Volume, VolumeInfo};

/// One volume as recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub kind: ShapeKind,
    pub name: String,
    /// World root the volume belonged to when the snapshot was taken.
    pub world: String,
    pub user_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeManagerSnapshot {
    /// Every volume, world roots included, in insertion order.
    pub volumes: Vec<VolumeRecord>,
    pub parallel_worlds: Vec<String>,
}

impl VolumeManager {
    /// Capture every volume with its world. Requires an acyclic hierarchy.
    pub fn to_snapshot(&mut self) -> Result<VolumeManagerSnapshot> {
        self.rebuild_tree_if_dirty()?;
        let tree = self.last_tree();
        let volumes = self
            .volumes()
            .map(|v| VolumeRecord {
                kind: v.kind(),
                name: v.name().to_string(),
                world: tree.world_of(v.name()).unwrap_or(v.name()).to_string(),
                user_info: v.info(),
            })
            .collect();
        Ok(VolumeManagerSnapshot {
            volumes,
            parallel_worlds: self.parallel_world_names().to_vec(),
        })
    }

    /// Replace the whole registry with the content of `snapshot`.
    ///
    /// On error the manager holds a partial restore and should be reset.
    pub fn restore(&mut self, snapshot: &VolumeManagerSnapshot) -> Result<()> {
        self.reset();

        let listed = |name: &str| snapshot.parallel_worlds.iter().any(|w| w == name);

        // Phase 1: create every node with registry defaults, in recorded order.
        for record in &snapshot.volumes {
            let is_root = record.name == WORLD_NAME || listed(&record.name);
            if let (true, Some(mother)) = (is_root, record.user_info.mother.as_deref()) {
                return Err(inconsistent(format!(
                    "world root '{}' is recorded with mother '{}'",
                    record.name, mother
                )));
            }
            if record.name == WORLD_NAME {
                continue;
            }
            if (record.kind == ShapeKind::ParallelWorld) != listed(&record.name) {
                return Err(inconsistent(format!(
                    "'{}' is recorded as {} but is {}listed as a parallel world",
                    record.name,
                    record.kind,
                    if listed(&record.name) { "" } else { "not " }
                )));
            }
            let created = if record.kind == ShapeKind::ParallelWorld {
                self.add_parallel_world(&record.name).map(|_| ())
            } else {
                self.add_volume(Volume::new(record.kind, &record.name))
                    .map(|_| ())
            };
            created.map_err(|e| inconsistent(format!("volume '{}': {}", record.name, e)))?;
        }
        for world in &snapshot.parallel_worlds {
            if !self.contains(world) {
                self.add_parallel_world(world)
                    .map_err(|e| inconsistent(format!("parallel world '{}': {}", world, e)))?;
            }
        }

        // Phase 2: attributes, now that every mother name exists.
        for record in &snapshot.volumes {
            let info = &record.user_info;
            if info.shape.kind() != record.kind {
                return Err(inconsistent(format!(
                    "volume '{}' is recorded as {} but its shape is {}",
                    record.name,
                    record.kind,
                    info.shape.kind()
                )));
            }
            match info.mother.as_deref() {
                Some(mother) if !self.contains(mother) => {
                    return Err(inconsistent(format!(
                        "volume '{}' references mother '{}' which is not defined",
                        record.name, mother
                    )));
                }
                None if !self.is_world_root(&record.name) => {
                    return Err(inconsistent(format!(
                        "volume '{}' has no mother",
                        record.name
                    )));
                }
                _ => {}
            }
            self.get_volume_mut(&record.name)?.apply_info(info);
        }

        self.rebuild_tree_if_dirty()?;
        for record in &snapshot.volumes {
            let world = self.last_tree().world_of(&record.name).unwrap_or_default();
            if world != record.world {
                return Err(inconsistent(format!(
                    "volume '{}' is recorded in world '{}' but hangs under '{}'",
                    record.name, record.world, world
                )));
            }
        }

        debug!("Restored {} volumes", snapshot.volumes.len());
        info!(
            "Volume manager restored ({} parallel worlds)",
            snapshot.parallel_worlds.len()
        );
        Ok(())
    }
}

fn inconsistent(msg: String) -> ConfigError {
    ConfigError::SnapshotInconsistent(msg).report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn populated() -> VolumeManager {
        let mut vm = VolumeManager::new();
        // Child added before its mother is reparented into place.
        vm.add_new_volume("Box", "b").expect("b").set_mother("a");
        let a = vm.add_new_volume("Tubs", "a").expect("a");
        a.material = "G4_WATER".into();
        a.translation = DVec3::new(0.0, 0.0, 15.0);
        vm.add_parallel_world("pw").expect("pw");
        vm.add_new_volume("Sphere", "p").expect("p").set_mother("pw");
        vm
    }

    #[test]
    fn test_snapshot_records_worlds() {
        let mut vm = populated();
        let snap = vm.to_snapshot().expect("snapshot");
        let p = snap.volumes.iter().find(|r| r.name == "p").expect("p");
        assert_eq!(p.world, "pw");
        let b = snap.volumes.iter().find(|r| r.name == "b").expect("b");
        assert_eq!(b.world, "world");
        assert_eq!(snap.parallel_worlds, vec!["pw".to_string()]);
    }

    #[test]
    fn test_restore_reproduces_registry() {
        let mut vm = populated();
        let snap = vm.to_snapshot().expect("snapshot");

        let mut restored = VolumeManager::new();
        restored.restore(&snap).expect("restore");
        assert_eq!(restored.all_volume_names(), vm.all_volume_names());
        assert_eq!(restored.get_volume("a").expect("a").material, "G4_WATER");
        assert_eq!(
            restored.dump_tree().expect("tree"),
            vm.dump_tree().expect("tree")
        );
    }

    #[test]
    fn test_restore_rejects_dangling_mother() {
        let mut vm = populated();
        let mut snap = vm.to_snapshot().expect("snapshot");
        let b = snap.volumes.iter_mut().find(|r| r.name == "b").expect("b");
        b.user_info.mother = Some("ghost".into());

        let err = VolumeManager::new().restore(&snap).unwrap_err();
        assert!(matches!(err, ConfigError::SnapshotInconsistent(ref m) if m.contains("ghost")));
    }

    #[test]
    fn test_restore_rejects_world_mismatch() {
        let mut vm = populated();
        let mut snap = vm.to_snapshot().expect("snapshot");
        let p = snap.volumes.iter_mut().find(|r| r.name == "p").expect("p");
        p.world = "world".into();

        let err = VolumeManager::new().restore(&snap).unwrap_err();
        assert!(matches!(err, ConfigError::SnapshotInconsistent(_)));
    }

    #[test]
    fn test_restore_rejects_duplicate_volume() {
        let mut vm = populated();
        let mut snap = vm.to_snapshot().expect("snapshot");
        let dup = snap.volumes.iter().find(|r| r.name == "a").cloned().expect("a");
        snap.volumes.push(dup);

        let err = VolumeManager::new().restore(&snap).unwrap_err();
        assert!(matches!(err, ConfigError::SnapshotInconsistent(_)));
    }
}
