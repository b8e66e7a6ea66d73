//! Hand-off of a finished configuration to a simulation engine.

use phantom_geometry::{VolumeManager, VolumeTree};
use phantom_physics::{EngineHandle, PhysicsManager};

/// Read-only view of the configuration lent to an engine for one run.
#[derive(Debug, Clone, Copy)]
pub struct EngineView<'a> {
    pub name: &'a str,
    pub volumes: &'a VolumeManager,
    pub physics: &'a PhysicsManager,
    /// Freshly rebuilt tree over every world.
    pub tree: &'a VolumeTree,
}

/// Engine-side object ids for the regions an engine materialized.
pub type RegionHandles = Vec<(String, EngineHandle)>;

/// A consumer of the configuration.
///
/// `initialize` builds engine-side geometry and regions, `run` executes, and
/// `close` is always called afterwards, whether or not the run succeeded.
pub trait SimulationEngine {
    fn initialize(&mut self, view: &EngineView<'_>) -> Result<RegionHandles, String>;

    fn run(&mut self, view: &EngineView<'_>) -> Result<(), String>;

    fn close(&mut self);
}
