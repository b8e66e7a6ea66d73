use std::fmt;
use std::str::FromStr;

use phantom_core::constants::DEFAULT_PHYSICS_LIST;
use phantom_core::error::ConfigError;
use phantom_core::particle::LimitParticle;
use serde::{Deserialize, Serialize};

use crate::region::ProductionCuts;

/// Optional physics constructors added on top of the physics list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsConstructor {
    Decay,
    RadioactiveDecay,
    Optical,
    EmDna,
}

impl PhysicsConstructor {
    pub const ALL: [PhysicsConstructor; 4] = [
        PhysicsConstructor::Decay,
        PhysicsConstructor::RadioactiveDecay,
        PhysicsConstructor::Optical,
        PhysicsConstructor::EmDna,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhysicsConstructor::Decay => "G4DecayPhysics",
            PhysicsConstructor::RadioactiveDecay => "G4RadioactiveDecayPhysics",
            PhysicsConstructor::Optical => "G4OpticalPhysics",
            PhysicsConstructor::EmDna => "G4EmDNAPhysics",
        }
    }
}

impl fmt::Display for PhysicsConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhysicsConstructor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| ConfigError::UnknownPhysicsConstructor {
                name: s.to_string(),
                known: Self::ALL.iter().map(|c| c.name().to_string()).collect(),
            })
    }
}

/// On/off switch per special physics constructor. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialPhysicsConstructors {
    #[serde(rename = "G4DecayPhysics")]
    pub decay: bool,
    #[serde(rename = "G4RadioactiveDecayPhysics")]
    pub radioactive_decay: bool,
    #[serde(rename = "G4OpticalPhysics")]
    pub optical: bool,
    #[serde(rename = "G4EmDNAPhysics")]
    pub em_dna: bool,
}

impl SpecialPhysicsConstructors {
    pub fn get(&self, constructor: PhysicsConstructor) -> bool {
        match constructor {
            PhysicsConstructor::Decay => self.decay,
            PhysicsConstructor::RadioactiveDecay => self.radioactive_decay,
            PhysicsConstructor::Optical => self.optical,
            PhysicsConstructor::EmDna => self.em_dna,
        }
    }

    pub fn set(&mut self, constructor: PhysicsConstructor, enabled: bool) {
        let slot = match constructor {
            PhysicsConstructor::Decay => &mut self.decay,
            PhysicsConstructor::RadioactiveDecay => &mut self.radioactive_decay,
            PhysicsConstructor::Optical => &mut self.optical,
            PhysicsConstructor::EmDna => &mut self.em_dna,
        };
        *slot = enabled;
    }

    /// Names of the constructors currently switched on.
    pub fn enabled(&self) -> Vec<&'static str> {
        PhysicsConstructor::ALL
            .iter()
            .filter(|c| self.get(**c))
            .map(|c| c.name())
            .collect()
    }
}

/// Particles the step limiter and other user limits apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserLimitsParticles {
    pub all: bool,
    pub all_charged: bool,
    pub gamma: bool,
    pub electron: bool,
    pub positron: bool,
    pub proton: bool,
}

impl Default for UserLimitsParticles {
    fn default() -> Self {
        // Matches the engine default: limits on charged particles only.
        Self {
            all: false,
            all_charged: true,
            gamma: false,
            electron: false,
            positron: false,
            proton: false,
        }
    }
}

impl UserLimitsParticles {
    pub fn get(&self, particle: LimitParticle) -> bool {
        match particle {
            LimitParticle::All => self.all,
            LimitParticle::AllCharged => self.all_charged,
            LimitParticle::Gamma => self.gamma,
            LimitParticle::Electron => self.electron,
            LimitParticle::Positron => self.positron,
            LimitParticle::Proton => self.proton,
        }
    }

    pub fn set(&mut self, particle: LimitParticle, enabled: bool) {
        let slot = match particle {
            LimitParticle::All => &mut self.all,
            LimitParticle::AllCharged => &mut self.all_charged,
            LimitParticle::Gamma => &mut self.gamma,
            LimitParticle::Electron => &mut self.electron,
            LimitParticle::Positron => &mut self.positron,
            LimitParticle::Proton => &mut self.proton,
        };
        *slot = enabled;
    }
}

/// Electromagnetic de-excitation switches. `None` keeps the physics list default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmParameters {
    pub fluo: Option<bool>,
    pub auger: Option<bool>,
    pub auger_cascade: Option<bool>,
    pub pixe: Option<bool>,
    pub deexcitation_ignore_cut: Option<bool>,
}

/// Global physics configuration, independent of any region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub physics_list_name: String,
    /// Cuts applied wherever no region overrides them.
    pub global_production_cuts: ProductionCuts,
    pub apply_cuts: bool,
    /// Secondary production energy range (MeV). `None` keeps the list default.
    pub energy_range_min: Option<f64>,
    pub energy_range_max: Option<f64>,
    pub user_limits_particles: UserLimitsParticles,
    pub em_parameters: EmParameters,
    pub special_physics_constructors: SpecialPhysicsConstructors,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            physics_list_name: DEFAULT_PHYSICS_LIST.to_string(),
            global_production_cuts: ProductionCuts::default(),
            apply_cuts: true,
            energy_range_min: None,
            energy_range_max: None,
            user_limits_particles: UserLimitsParticles::default(),
            em_parameters: EmParameters::default(),
            special_physics_constructors: SpecialPhysicsConstructors::default(),
        }
    }
}
