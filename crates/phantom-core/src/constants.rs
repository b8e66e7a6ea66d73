//! Shared names and defaults used by every phantom crate.

use crate::units::M;

/// Name of the main world volume. Always present, never removable.
pub const WORLD_NAME: &str = "world";

/// Material filling the default world volume.
pub const WORLD_MATERIAL: &str = "G4_AIR";

/// Side length of the default (cubic) world volume.
pub const WORLD_SIZE: f64 = 3.0 * M;

/// Material assigned to freshly created volumes.
pub const DEFAULT_MATERIAL: &str = "G4_AIR";

/// Suffix appended to a volume name when a region is created on its behalf.
pub const DEFAULT_REGION_SUFFIX: &str = "_region";

/// Physics list used when the configuration does not name one.
pub const DEFAULT_PHYSICS_LIST: &str = "QGSP_BERT_EMV";

/// Snapshot document format version.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;
