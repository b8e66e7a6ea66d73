use phantom_core::constants::SNAPSHOT_FORMAT_VERSION;
use phantom_geometry::VolumeManagerSnapshot;
use phantom_physics::PhysicsManagerSnapshot;
use serde::{Deserialize, Serialize};

/// Typed form of the snapshot document.
///
/// In memory the document travels as a `serde_json::Value`; this struct is
/// what that value is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    #[serde(default = "current_format_version")]
    pub format_version: u16,
    pub name: String,
    #[serde(default)]
    pub volume_manager: VolumeManagerSnapshot,
    #[serde(default)]
    pub physics_manager: PhysicsManagerSnapshot,
}

fn current_format_version() -> u16 {
    SNAPSHOT_FORMAT_VERSION
}
