//! Text and file encodings of the snapshot document.
//!
//! Both JSON and RON go through the in-memory `serde_json::Value`, so the
//! same compatibility checks apply whatever the encoding.

use std::fs;
use std::path::Path;

use log::info;
use phantom_core::error::{ConfigError, Result};
use ron::ser::PrettyConfig;
use serde_json::Value;

use crate::simulation::Simulation;

fn malformed(e: impl ToString) -> ConfigError {
    ConfigError::SnapshotMalformed(e.to_string()).report()
}

impl Simulation {
    pub fn to_json_string(&mut self) -> Result<String> {
        let doc = self.to_snapshot()?;
        serde_json::to_string_pretty(&doc).map_err(malformed)
    }

    pub fn from_json_string(&mut self, json: &str) -> Result<()> {
        let doc: Value = serde_json::from_str(json).map_err(malformed)?;
        self.from_snapshot(&doc)
    }

    pub fn to_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|e| ConfigError::from(e).report())?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub fn from_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::from(e).report())?;
        info!("Loading configuration from {}", path.display());
        self.from_json_string(&json)
    }

    pub fn to_ron_string(&mut self) -> Result<String> {
        let doc = self.to_snapshot()?;
        ron::ser::to_string_pretty(&doc, PrettyConfig::default()).map_err(malformed)
    }

    pub fn from_ron_str(&mut self, ron_str: &str) -> Result<()> {
        let options = ron::Options::default();
        let doc: Value = options.from_str(ron_str).map_err(malformed)?;
        self.from_snapshot(&doc)
    }

    pub fn from_ron_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ron_str = fs::read_to_string(path).map_err(|e| ConfigError::from(e).report())?;
        info!("Loading configuration from {}", path.display());
        self.from_ron_str(&ron_str)
    }
}
