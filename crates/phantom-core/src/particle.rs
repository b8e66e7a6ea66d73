//! Fixed particle enumerations recognized by the physics configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Species for which a production cut can be configured.
/// `All` overrides the individual species when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutParticle {
    All,
    Gamma,
    Electron,
    Positron,
    Proton,
}

impl CutParticle {
    pub const ALL: [CutParticle; 5] = [
        CutParticle::All,
        CutParticle::Gamma,
        CutParticle::Electron,
        CutParticle::Positron,
        CutParticle::Proton,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CutParticle::All => "all",
            CutParticle::Gamma => "gamma",
            CutParticle::Electron => "electron",
            CutParticle::Positron => "positron",
            CutParticle::Proton => "proton",
        }
    }

    /// Engine-side particle name ("e-", "e+", ...).
    pub fn engine_name(self) -> &'static str {
        match self {
            CutParticle::All => "all",
            CutParticle::Gamma => "gamma",
            CutParticle::Electron => "e-",
            CutParticle::Positron => "e+",
            CutParticle::Proton => "proton",
        }
    }

    fn known_names() -> Vec<String> {
        Self::ALL.iter().map(|p| p.name().to_string()).collect()
    }
}

impl fmt::Display for CutParticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CutParticle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s || p.engine_name() == s)
            .ok_or_else(|| ConfigError::UnknownParticle {
                name: s.to_string(),
                known: Self::known_names(),
            })
    }
}

/// Species selector for the step limiter and other user limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitParticle {
    All,
    AllCharged,
    Gamma,
    Electron,
    Positron,
    Proton,
}

impl LimitParticle {
    pub const ALL: [LimitParticle; 6] = [
        LimitParticle::All,
        LimitParticle::AllCharged,
        LimitParticle::Gamma,
        LimitParticle::Electron,
        LimitParticle::Positron,
        LimitParticle::Proton,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LimitParticle::All => "all",
            LimitParticle::AllCharged => "all_charged",
            LimitParticle::Gamma => "gamma",
            LimitParticle::Electron => "electron",
            LimitParticle::Positron => "positron",
            LimitParticle::Proton => "proton",
        }
    }
}

impl fmt::Display for LimitParticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LimitParticle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownParticle {
                name: s.to_string(),
                known: Self::ALL.iter().map(|p| p.name().to_string()).collect(),
            })
    }
}
