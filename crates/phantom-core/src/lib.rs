pub mod constants;
pub mod error;
pub mod particle;
pub mod units;

pub use error::{ConfigError, EntityKind, Result};
