pub mod manager;
pub mod region;
pub mod settings;

pub use manager::{PhysicsManager, PhysicsManagerSnapshot, RegionAssignment};
pub use region::{EngineHandle, ProductionCuts, Region, UserLimitKind, UserLimits};
pub use settings::{
    EmParameters, PhysicsConstructor, PhysicsSettings, SpecialPhysicsConstructors,
    UserLimitsParticles,
};
