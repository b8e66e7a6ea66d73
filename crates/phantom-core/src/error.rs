use std::fmt;

use thiserror::Error;

/// The kind of named entity involved in a lookup or a name clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Volume,
    World,
    Region,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Volume => "volume",
            EntityKind::World => "world",
            EntityKind::Region => "region",
        };
        f.write_str(s)
    }
}

/// Errors raised while building, validating or restoring a configuration.
///
/// Every variant is terminal: the configuration is malformed and must not
/// reach the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("The {kind} name '{name}' already exists. Existing names are: {}", .existing.join(", "))]
    NameConflict {
        kind: EntityKind,
        name: String,
        existing: Vec<String>,
    },

    #[error("Cannot find {kind} '{name}'. Known {kind} names are: {}", .known.join(", "))]
    NotFound {
        kind: EntityKind,
        name: String,
        known: Vec<String>,
    },

    #[error("Unknown volume type '{name}'. Known types are: {}", .known.join(", "))]
    UnknownKind { name: String, known: Vec<String> },

    #[error("Unknown particle name '{name}'. Eligible names are: {}", .known.join(", "))]
    UnknownParticle { name: String, known: Vec<String> },

    #[error("Unknown user limit '{name}'. Eligible limits are: {}", .known.join(", "))]
    UnknownLimitKind { name: String, known: Vec<String> },

    #[error("Unknown special physics constructor '{name}'. Available constructors are: {}", .known.join(", "))]
    UnknownPhysicsConstructor { name: String, known: Vec<String> },

    #[error("There seems to be a loop in the volume tree involving volume '{volume}'")]
    CyclicGraph { volume: String },

    #[error("Inconsistent configuration: {0}")]
    InconsistentState(String),

    #[error("Snapshot references are inconsistent: {0}")]
    SnapshotInconsistent(String),

    #[error("Malformed snapshot document: {0}")]
    SnapshotMalformed(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Simulation engine failed: {0}")]
    Engine(String),
}

impl ConfigError {
    /// Log the error at the point of detection and hand it back for `?`.
    pub fn report(self) -> Self {
        log::error!("{}", self);
        self
    }

    /// Whether this error belongs to the lookup-failure family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::NotFound { .. }
                | ConfigError::UnknownKind { .. }
                | ConfigError::UnknownParticle { .. }
                | ConfigError::UnknownLimitKind { .. }
                | ConfigError::UnknownPhysicsConstructor { .. }
        )
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
