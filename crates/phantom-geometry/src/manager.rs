use indexmap::IndexMap;
use log::{debug, info};
use phantom_core::constants::WORLD_NAME;
use phantom_core::error::{ConfigError, EntityKind, Result};

use crate::shape::{self, ShapeKind};
use crate::tree::VolumeTree;
use crate::volume::Volume;

/// Registry of every volume across the main world and all parallel worlds.
///
/// Volumes live in one insertion-ordered arena keyed by name. The tree is a
/// derived index, rebuilt lazily when `dirty` is set. Handing out a mutable
/// volume marks the tree dirty, since the caller may reassign the mother.
#[derive(Debug, Clone)]
pub struct VolumeManager {
    volumes: IndexMap<String, Volume>,
    parallel_worlds: Vec<String>,
    tree: VolumeTree,
    dirty: bool,
}

impl Default for VolumeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeManager {
    /// A manager holding only the default main world volume.
    pub fn new() -> Self {
        let mut volumes = IndexMap::new();
        volumes.insert(WORLD_NAME.to_string(), Volume::main_world());
        Self {
            volumes,
            parallel_worlds: Vec::new(),
            tree: VolumeTree::default(),
            dirty: true,
        }
    }

    /// Drop every volume and parallel world and return to the default state.
    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("Volume manager reset");
    }

    /// Build a detached volume of `kind` with registry defaults.
    ///
    /// The name is checked against every world so that a later
    /// [`add_volume`](Self::add_volume) of the result cannot clash.
    pub fn create_volume(&self, kind: &str, name: &str) -> Result<Volume> {
        self.check_name_available(name, EntityKind::Volume)?;
        let registration = shape::lookup(kind).map_err(ConfigError::report)?;
        Ok(Volume::new(registration.kind, name))
    }

    /// Register a pre-built volume and return the stored instance.
    pub fn add_volume(&mut self, volume: Volume) -> Result<&mut Volume> {
        self.check_name_available(volume.name(), EntityKind::Volume)?;
        if volume.kind() == ShapeKind::ParallelWorld {
            return Err(ConfigError::InconsistentState(format!(
                "volume '{}' is a parallel world root; use add_parallel_world",
                volume.name()
            ))
            .report());
        }
        debug!("Adding volume '{}' ({})", volume.name(), volume.kind());
        self.dirty = true;
        let entry = self.volumes.entry(volume.name().to_string());
        Ok(entry.or_insert(volume))
    }

    /// Create a volume of `kind` named `name` and register it.
    pub fn add_new_volume(&mut self, kind: &str, name: &str) -> Result<&mut Volume> {
        let volume = self.create_volume(kind, name)?;
        self.add_volume(volume)
    }

    /// Create an independent world whose root is named `name`.
    pub fn add_parallel_world(&mut self, name: &str) -> Result<&mut Volume> {
        self.check_name_available(name, EntityKind::World)?;
        info!("Adding parallel world '{}'", name);
        self.parallel_worlds.push(name.to_string());
        self.dirty = true;
        let entry = self.volumes.entry(name.to_string());
        Ok(entry.or_insert(Volume::parallel_world(name)))
    }

    fn check_name_available(&self, name: &str, kind: EntityKind) -> Result<()> {
        if self.volumes.contains_key(name) {
            return Err(ConfigError::NameConflict {
                kind,
                name: name.to_string(),
                existing: self.all_volume_names(),
            }
            .report());
        }
        Ok(())
    }

    fn not_found(&self, name: &str) -> ConfigError {
        ConfigError::NotFound {
            kind: EntityKind::Volume,
            name: name.to_string(),
            known: self.all_volume_names(),
        }
        .report()
    }

    /// Look up a volume or world root by name.
    pub fn get_volume(&self, name: &str) -> Result<&Volume> {
        self.volumes.get(name).ok_or_else(|| self.not_found(name))
    }

    /// Mutable lookup. Marks the tree dirty.
    pub fn get_volume_mut(&mut self, name: &str) -> Result<&mut Volume> {
        if !self.volumes.contains_key(name) {
            return Err(self.not_found(name));
        }
        self.dirty = true;
        Ok(&mut self.volumes[name])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.volumes.contains_key(name)
    }

    pub fn world_volume(&self) -> &Volume {
        // The main world is inserted first and never removed.
        &self.volumes[0]
    }

    pub fn is_world_root(&self, name: &str) -> bool {
        name == WORLD_NAME || self.parallel_worlds.iter().any(|w| w == name)
    }

    /// Main world first, then parallel worlds in creation order.
    pub fn world_names(&self) -> Vec<String> {
        let mut names = vec![WORLD_NAME.to_string()];
        names.extend(self.parallel_worlds.iter().cloned());
        names
    }

    pub fn parallel_world_names(&self) -> &[String] {
        &self.parallel_worlds
    }

    /// Volume names, excluding parallel world roots.
    pub fn volume_names(&self) -> Vec<String> {
        self.volumes
            .keys()
            .filter(|n| !self.parallel_worlds.contains(n))
            .cloned()
            .collect()
    }

    /// Volume names followed by parallel world names.
    pub fn all_volume_names(&self) -> Vec<String> {
        let mut names = self.volume_names();
        names.extend(self.parallel_worlds.iter().cloned());
        names
    }

    pub fn volumes(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.values()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the tree if anything changed since the last successful build.
    ///
    /// On failure the previous tree is kept and the dirty flag stays set.
    pub fn rebuild_tree_if_dirty(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let tree = VolumeTree::build(&self.volumes, &self.world_names())
            .map_err(ConfigError::report)?;
        debug!("Volume tree rebuilt ({} volumes)", tree.len());
        self.tree = tree;
        self.dirty = false;
        Ok(())
    }

    /// The up-to-date tree, rebuilding it first if needed.
    pub fn tree(&mut self) -> Result<&VolumeTree> {
        self.rebuild_tree_if_dirty()?;
        Ok(&self.tree)
    }

    /// The last successfully built tree, which may be stale.
    pub fn last_tree(&self) -> &VolumeTree {
        &self.tree
    }

    /// The tree if it reflects the current volumes.
    pub fn current_tree(&self) -> Option<&VolumeTree> {
        (!self.dirty).then_some(&self.tree)
    }

    /// Current descendants of `name` in pre-order.
    pub fn descendants(&mut self, name: &str) -> Result<Vec<String>> {
        self.get_volume(name)?;
        Ok(self.tree()?.descendants(name))
    }

    /// Direct children of `name`.
    pub fn children(&mut self, name: &str) -> Result<Vec<String>> {
        self.get_volume(name)?;
        Ok(self.tree()?.children(name).to_vec())
    }

    /// World root `name` belongs to.
    pub fn world_of(&mut self, name: &str) -> Result<String> {
        self.get_volume(name)?;
        let tree = self.tree()?;
        Ok(tree.world_of(name).unwrap_or(WORLD_NAME).to_string())
    }

    /// Indented rendering of all worlds.
    pub fn dump_tree(&mut self) -> Result<String> {
        Ok(self.tree()?.render())
    }

    pub fn dump_volumes(&self) -> String {
        let mut s = format!("Number of volumes: {}", self.volumes.len());
        for volume in self.volumes.values() {
            s.push_str(&format!("\n  {}", volume));
        }
        s
    }

    pub fn dump_volume_types(&self) -> String {
        shape::registered_kind_names().join(" ")
    }

    /// One `<Kind>Volume: description` line per registered kind.
    pub fn describe_volume_types(&self) -> String {
        shape::SHAPE_REGISTRY
            .iter()
            .map(|r| format!("{}Volume: {}\n", r.name, r.doc))
            .collect()
    }

    /// Summary header plus the tree, as printed by inspection tools.
    pub fn summary(&mut self) -> Result<String> {
        let mut s = String::from("**** Volume manager ****\n");
        if !self.parallel_worlds.is_empty() {
            s.push_str(&format!(
                "Number of parallel worlds: {}\nNames of the parallel worlds: {}\n",
                self.parallel_worlds.len(),
                self.parallel_worlds.join(", ")
            ));
        }
        s.push_str(&format!("Number of volumes: {}\n", self.volume_names().len()));
        s.push_str("The volumes are organized in the following hierarchy:\n");
        s.push_str(&self.dump_tree()?);
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_manager_has_world_only() {
        let mut vm = VolumeManager::new();
        assert_eq!(vm.len(), 1);
        assert_eq!(vm.world_volume().name(), WORLD_NAME);
        assert_eq!(vm.dump_tree().expect("tree"), "world\n");
    }

    #[test]
    fn test_add_volume_returns_stored_instance() {
        let mut vm = VolumeManager::new();
        let v = vm.add_new_volume("Box", "waterbox").expect("add");
        v.material = "G4_WATER".into();
        assert_eq!(vm.get_volume("waterbox").expect("get").material, "G4_WATER");
    }

    #[test]
    fn test_duplicate_volume_rejected_state_unchanged() {
        let mut vm = VolumeManager::new();
        vm.add_new_volume("Box", "a").expect("add");
        let before = vm.all_volume_names();
        let err = vm.add_new_volume("Sphere", "a").unwrap_err();
        match err {
            ConfigError::NameConflict { name, existing, .. } => {
                assert_eq!(name, "a");
                assert_eq!(existing, before);
            }
            other => panic!("expected NameConflict, got {:?}", other),
        }
        assert_eq!(vm.all_volume_names(), before);
        assert_eq!(vm.get_volume("a").expect("a").kind(), ShapeKind::Box);
    }

    #[test]
    fn test_world_name_cannot_be_reused() {
        let mut vm = VolumeManager::new();
        assert!(matches!(
            vm.add_new_volume("Box", WORLD_NAME),
            Err(ConfigError::NameConflict { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let vm = VolumeManager::new();
        assert!(matches!(
            vm.create_volume("Torus", "t"),
            Err(ConfigError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_detached_volume_added_later() {
        let mut vm = VolumeManager::new();
        let mut v = vm.create_volume("ConsVolume", "cone").expect("create");
        v.material = "G4_Pb".into();
        assert!(!vm.contains("cone"));
        vm.add_volume(v).expect("add");
        assert_eq!(vm.get_volume("cone").expect("cone").material, "G4_Pb");
    }

    #[test]
    fn test_parallel_world_name_collisions() {
        let mut vm = VolumeManager::new();
        vm.add_new_volume("Box", "a").expect("add");
        vm.add_parallel_world("pw").expect("pw");
        assert!(matches!(
            vm.add_parallel_world("a"),
            Err(ConfigError::NameConflict { kind: EntityKind::World, .. })
        ));
        assert!(matches!(
            vm.add_parallel_world("pw"),
            Err(ConfigError::NameConflict { .. })
        ));
        assert!(matches!(
            vm.add_new_volume("Box", "pw"),
            Err(ConfigError::NameConflict { .. })
        ));
        assert_eq!(vm.parallel_world_names(), ["pw".to_string()]);
        assert_eq!(vm.volume_names(), vec!["world", "a"]);
        assert_eq!(vm.all_volume_names(), vec!["world", "a", "pw"]);
    }

    #[test]
    fn test_get_volume_not_found_lists_names() {
        let mut vm = VolumeManager::new();
        vm.add_parallel_world("pw").expect("pw");
        match vm.get_volume("nope").unwrap_err() {
            ConfigError::NotFound { name, known, .. } => {
                assert_eq!(name, "nope");
                assert_eq!(known, vec!["world", "pw"]);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(vm.get_volume("pw").is_ok());
    }

    #[test]
    fn test_volumes_attach_to_their_world() {
        let mut vm = VolumeManager::new();
        vm.add_parallel_world("pw").expect("pw");
        vm.add_new_volume("Box", "a").expect("a");
        vm.add_new_volume("Box", "p").expect("p").set_mother("pw");
        vm.add_new_volume("Box", "q").expect("q").set_mother("p");
        assert_eq!(vm.world_of("a").expect("a"), "world");
        assert_eq!(vm.world_of("q").expect("q"), "pw");
        assert_eq!(vm.dump_tree().expect("tree"), "world\n    a\npw\n    p\n        q\n");
    }

    #[test]
    fn test_lazy_rebuild_and_dirty_flag() {
        let mut vm = VolumeManager::new();
        vm.rebuild_tree_if_dirty().expect("rebuild");
        assert!(!vm.is_dirty());
        vm.add_new_volume("Box", "a").expect("a");
        assert!(vm.is_dirty());
        assert!(vm.current_tree().is_none());
        assert_eq!(vm.children("world").expect("children"), vec!["a"]);
        assert!(!vm.is_dirty());
        assert!(vm.current_tree().is_some());
    }

    #[test]
    fn test_cycle_keeps_last_good_tree() {
        let mut vm = VolumeManager::new();
        vm.add_new_volume("Box", "a").expect("a");
        vm.add_new_volume("Box", "b").expect("b").set_mother("a");
        let good = vm.dump_tree().expect("tree");

        vm.get_volume_mut("a").expect("a").set_mother("b");
        let err = vm.rebuild_tree_if_dirty().unwrap_err();
        assert!(matches!(err, ConfigError::CyclicGraph { .. }));
        assert!(vm.is_dirty());
        assert_eq!(vm.last_tree().render(), good);
        assert_eq!(vm.last_tree().children("a"), ["b".to_string()]);

        // Repairing the mother link makes the tree buildable again.
        vm.get_volume_mut("a").expect("a").set_mother(WORLD_NAME);
        assert_eq!(vm.dump_tree().expect("tree"), good);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut vm = VolumeManager::new();
        vm.add_new_volume("Box", "a").expect("a");
        vm.add_parallel_world("pw").expect("pw");
        vm.reset();
        let once = vm.all_volume_names();
        vm.reset();
        assert_eq!(vm.all_volume_names(), once);
        assert_eq!(once, vec![WORLD_NAME]);
        assert!(vm.get_volume("a").is_err());
    }

    #[test]
    fn test_dump_volume_types() {
        let vm = VolumeManager::new();
        let types = vm.dump_volume_types();
        assert!(types.starts_with("BoxVolume SphereVolume"));
    }

    #[test]
    fn test_describe_volume_types() {
        let vm = VolumeManager::new();
        let described = vm.describe_volume_types();
        assert_eq!(described.lines().count(), shape::SHAPE_REGISTRY.len());
        assert!(described.starts_with("BoxVolume: Rectangular box\n"));
    }

    #[test]
    fn test_world_root_cannot_be_reparented() {
        let mut vm = VolumeManager::new();
        vm.add_new_volume("Box", "a").expect("a");
        let good = vm.dump_tree().expect("tree");

        vm.get_volume_mut(WORLD_NAME).expect("world").set_mother("a");
        let err = vm.dump_tree().unwrap_err();
        assert!(matches!(err, ConfigError::InconsistentState(_)));
        assert_eq!(vm.last_tree().render(), good);
        assert!(vm.to_snapshot().is_err());
    }
}
