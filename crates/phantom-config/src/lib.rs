pub mod archive;
pub mod compat;
pub mod engine;
pub mod simulation;
pub mod snapshot;

pub use engine::{EngineView, RegionHandles, SimulationEngine};
pub use simulation::Simulation;
pub use snapshot::SimulationSnapshot;
