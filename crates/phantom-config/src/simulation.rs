use log::{info, warn};
use phantom_core::constants::SNAPSHOT_FORMAT_VERSION;
use phantom_core::error::{ConfigError, Result};
use phantom_geometry::{Volume, VolumeManager};
use phantom_physics::{PhysicsManager, Region, UserLimitKind};
use serde_json::Value;

use crate::compat;
use crate::engine::{EngineView, SimulationEngine};
use crate::snapshot::SimulationSnapshot;

pub const DEFAULT_SIMULATION_NAME: &str = "simulation";

/// Root of a configuration: the volume registry plus the physics settings.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub name: String,
    pub volume_manager: VolumeManager,
    pub physics_manager: PhysicsManager,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATION_NAME)
    }
}

impl Simulation {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            volume_manager: VolumeManager::new(),
            physics_manager: PhysicsManager::new(),
        }
    }

    /// Drop all volumes and regions. The name is kept.
    pub fn reset(&mut self) {
        self.volume_manager.reset();
        self.physics_manager.reset();
        info!("Simulation '{}' reset", self.name);
    }

    pub fn world(&self) -> &Volume {
        self.volume_manager.world_volume()
    }

    pub fn add_volume(&mut self, kind: &str, name: &str) -> Result<&mut Volume> {
        self.volume_manager.add_new_volume(kind, name)
    }

    pub fn add_parallel_world(&mut self, name: &str) -> Result<&mut Volume> {
        self.volume_manager.add_parallel_world(name)
    }

    pub fn get_volume(&self, name: &str) -> Result<&Volume> {
        self.volume_manager.get_volume(name)
    }

    pub fn get_volume_mut(&mut self, name: &str) -> Result<&mut Volume> {
        self.volume_manager.get_volume_mut(name)
    }

    pub fn add_region(&mut self, name: &str) -> Result<&mut Region> {
        self.physics_manager.add_region(name)
    }

    /// Region settings may only name volumes that exist.
    fn check_volume(&self, volume: &str) -> Result<()> {
        self.volume_manager.get_volume(volume).map(|_| ())
    }

    pub fn set_production_cut(&mut self, volume: &str, particle: &str, value: f64) -> Result<()> {
        self.check_volume(volume)?;
        self.physics_manager
            .set_production_cut(volume, particle, value)
    }

    pub fn associate_volume(&mut self, region: &str, volume: &str) -> Result<()> {
        self.check_volume(volume)?;
        self.physics_manager.associate_volume(region, volume)
    }

    pub fn set_user_limit(&mut self, kind: &str, volume: &str, value: f64) -> Result<()> {
        self.check_volume(volume)?;
        self.physics_manager.set_user_limit(kind, volume, value)
    }

    pub fn set_max_step_size(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxStepSize, volume, value)
    }

    pub fn set_max_track_length(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxTrackLength, volume, value)
    }

    pub fn set_min_ekine(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MinEkine, volume, value)
    }

    pub fn set_max_time(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxTime, volume, value)
    }

    pub fn set_min_range(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MinRange, volume, value)
    }

    fn set_user_limit_for(&mut self, kind: UserLimitKind, volume: &str, value: f64) -> Result<()> {
        self.check_volume(volume)?;
        self.physics_manager.set_user_limit_for(kind, volume, value)
    }

    pub fn set_production_cut_with_propagation(
        &mut self,
        volume: &str,
        particle: &str,
        value: f64,
    ) -> Result<()> {
        self.physics_manager.set_production_cut_with_propagation(
            &mut self.volume_manager,
            volume,
            particle,
            value,
        )
    }

    /// Volume tree followed by the production cut tables.
    pub fn summary(&mut self) -> Result<String> {
        let mut s = format!("Simulation '{}'\n", self.name);
        s.push_str(&self.volume_manager.summary()?);
        s.push_str(&self.physics_manager.dump_production_cuts());
        Ok(s)
    }

    pub fn to_typed_snapshot(&mut self) -> Result<SimulationSnapshot> {
        Ok(SimulationSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            name: self.name.clone(),
            volume_manager: self.volume_manager.to_snapshot()?,
            physics_manager: self.physics_manager.to_snapshot(),
        })
    }

    /// The whole configuration as a JSON document.
    pub fn to_snapshot(&mut self) -> Result<Value> {
        let typed = self.to_typed_snapshot()?;
        serde_json::to_value(typed)
            .map_err(|e| ConfigError::SnapshotMalformed(e.to_string()).report())
    }

    /// Replace the configuration with the content of `doc`.
    ///
    /// The document is rebuilt into a fresh configuration first, so on error
    /// `self` is left as it was.
    pub fn from_snapshot(&mut self, doc: &Value) -> Result<()> {
        let warnings = compat::validate_document(doc).map_err(ConfigError::report)?;
        for w in &warnings {
            warn!("{}", w);
        }
        let typed: SimulationSnapshot = serde_json::from_value(doc.clone())
            .map_err(|e| ConfigError::SnapshotMalformed(e.to_string()).report())?;
        self.restore(&typed)
    }

    pub fn restore(&mut self, snapshot: &SimulationSnapshot) -> Result<()> {
        let mut fresh = Simulation::new(&snapshot.name);
        fresh.volume_manager.restore(&snapshot.volume_manager)?;
        fresh
            .physics_manager
            .restore(&snapshot.physics_manager, &fresh.volume_manager)?;
        *self = fresh;
        info!(
            "Simulation '{}' restored: {} volumes, {} regions",
            self.name,
            self.volume_manager.len(),
            self.physics_manager.regions().count()
        );
        Ok(())
    }

    /// Hand the configuration to `engine` for one run.
    ///
    /// The tree is rebuilt first, so a cyclic hierarchy never reaches the
    /// engine. Region handles returned by the engine are attached for the
    /// duration of the run and released once it closes.
    pub fn run(&mut self, engine: &mut dyn SimulationEngine) -> Result<()> {
        self.physics_manager.enable_decay()?;
        self.volume_manager.rebuild_tree_if_dirty()?;
        info!("Starting simulation '{}'", self.name);

        let handles = {
            let view = self.engine_view()?;
            match engine.initialize(&view) {
                Ok(h) => h,
                Err(e) => {
                    engine.close();
                    return Err(ConfigError::Engine(e).report());
                }
            }
        };
        for (region, handle) in handles {
            match self.physics_manager.region_mut(&region) {
                Ok(r) => r.attach_engine_handle(handle),
                Err(e) => {
                    engine.close();
                    self.release_engine_references();
                    return Err(e);
                }
            }
        }

        let outcome = {
            let view = self.engine_view()?;
            engine.run(&view)
        };
        engine.close();
        self.release_engine_references();
        outcome.map_err(|e| ConfigError::Engine(e).report())?;
        info!("Simulation '{}' finished", self.name);
        Ok(())
    }

    fn engine_view(&self) -> Result<EngineView<'_>> {
        let tree = self.volume_manager.current_tree().ok_or_else(|| {
            ConfigError::InconsistentState("volume tree is out of date".to_string()).report()
        })?;
        Ok(EngineView {
            name: &self.name,
            volumes: &self.volume_manager,
            physics: &self.physics_manager,
            tree,
        })
    }

    /// Forget engine-side objects once the engine has closed. The
    /// configuration itself is untouched.
    pub fn release_engine_references(&mut self) {
        self.physics_manager.release_engine_references();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phantom_physics::EngineHandle;

    use crate::engine::RegionHandles;

    #[derive(Default)]
    struct RecordingEngine {
        seen_volumes: Vec<String>,
        region_handles: Vec<Option<EngineHandle>>,
        fail_run: bool,
        closed: bool,
    }

    impl SimulationEngine for RecordingEngine {
        fn initialize(&mut self, view: &EngineView<'_>) -> std::result::Result<RegionHandles, String> {
            self.seen_volumes = view.tree.walk().iter().map(|(_, n)| n.to_string()).collect();
            Ok(view
                .physics
                .regions()
                .enumerate()
                .map(|(i, r)| (r.name().to_string(), EngineHandle(i as u64)))
                .collect())
        }

        fn run(&mut self, view: &EngineView<'_>) -> std::result::Result<(), String> {
            self.region_handles = view.physics.regions().map(Region::engine_handle).collect();
            if self.fail_run {
                return Err("beam off".to_string());
            }
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn test_run_lends_rebuilt_tree_and_releases_handles() {
        let mut sim = Simulation::default();
        sim.add_volume("Box", "a").expect("a");
        sim.set_production_cut("a", "gamma", 1.0).expect("cut");

        let mut engine = RecordingEngine::default();
        sim.run(&mut engine).expect("run");
        assert_eq!(engine.seen_volumes, vec!["world", "a"]);
        assert_eq!(engine.region_handles, vec![Some(EngineHandle(0))]);
        assert!(engine.closed);
        let region = sim.physics_manager.region("a_region").expect("region");
        assert_eq!(region.engine_handle(), None);
    }

    #[test]
    fn test_engine_failure_still_closes() {
        let mut sim = Simulation::default();
        let mut engine = RecordingEngine {
            fail_run: true,
            ..Default::default()
        };
        let err = sim.run(&mut engine).unwrap_err();
        assert!(matches!(err, ConfigError::Engine(ref m) if m == "beam off"));
        assert!(engine.closed);
    }

    #[test]
    fn test_cyclic_tree_never_reaches_engine() {
        let mut sim = Simulation::default();
        sim.add_volume("Box", "a").expect("a").set_mother("b");
        sim.add_volume("Box", "b").expect("b").set_mother("a");
        let mut engine = RecordingEngine::default();
        let err = sim.run(&mut engine).unwrap_err();
        assert!(matches!(err, ConfigError::CyclicGraph { .. }));
        assert!(engine.seen_volumes.is_empty());
        assert!(!engine.closed);
    }

    #[test]
    fn test_failed_restore_keeps_state() {
        let mut sim = Simulation::default();
        sim.add_volume("Box", "a").expect("a");
        let mut doc = sim.to_snapshot().expect("snapshot");
        doc["volume_manager"]["volumes"][1]["user_info"]["mother"] = Value::from("ghost");

        let mut target = Simulation::new("other");
        target.add_volume("Sphere", "keep").expect("keep");
        let err = target.from_snapshot(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::SnapshotInconsistent(_)));
        assert_eq!(target.name, "other");
        assert!(target.get_volume("keep").is_ok());
    }

    #[test]
    fn test_region_settings_reject_unknown_volume() {
        let mut sim = Simulation::default();
        sim.add_volume("Box", "a").expect("a");

        let err = sim.set_production_cut("typo", "gamma", 1.0).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { ref name, .. } if name == "typo"));
        assert!(sim.set_max_step_size("typo", 1.0).unwrap_err().is_not_found());
        assert!(sim.set_user_limit("max_time", "typo", 1.0).unwrap_err().is_not_found());
        sim.add_region("r").expect("r");
        assert!(sim.associate_volume("r", "typo").unwrap_err().is_not_found());

        assert_eq!(sim.physics_manager.region_names(), vec!["r"]);
        assert!(sim.physics_manager.volumes_regions_lut().is_empty());

        sim.set_min_range("a", 0.5).expect("limit");
        let doc = sim.to_snapshot().expect("snapshot");
        Simulation::default().from_snapshot(&doc).expect("restorable");
    }

    #[test]
    fn test_reset_keeps_name() {
        let mut sim = Simulation::new("phantom");
        sim.add_volume("Box", "a").expect("a");
        sim.reset();
        assert_eq!(sim.name, "phantom");
        assert_eq!(sim.volume_manager.len(), 1);
    }
}
