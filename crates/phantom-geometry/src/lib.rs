pub mod manager;
pub mod shape;
pub mod snapshot;
pub mod tree;
pub mod volume;

pub use manager::VolumeManager;
pub use shape::{Shape, ShapeKind};
pub use snapshot::{VolumeManagerSnapshot, VolumeRecord};
pub use tree::VolumeTree;
pub use volume::{Volume, VolumeInfo};
