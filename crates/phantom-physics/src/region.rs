//! Regions: named groups of volumes sharing production cuts and user limits.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use phantom_core::error::ConfigError;
use phantom_core::particle::CutParticle;
use serde::{Deserialize, Serialize};

/// Per-particle production cuts (range, in mm). `None` falls back to the
/// next level of the lookup chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionCuts {
    pub all: Option<f64>,
    pub gamma: Option<f64>,
    pub electron: Option<f64>,
    pub positron: Option<f64>,
    pub proton: Option<f64>,
}

impl ProductionCuts {
    pub fn get(&self, particle: CutParticle) -> Option<f64> {
        match particle {
            CutParticle::All => self.all,
            CutParticle::Gamma => self.gamma,
            CutParticle::Electron => self.electron,
            CutParticle::Positron => self.positron,
            CutParticle::Proton => self.proton,
        }
    }

    pub fn set(&mut self, particle: CutParticle, value: Option<f64>) {
        let slot = match particle {
            CutParticle::All => &mut self.all,
            CutParticle::Gamma => &mut self.gamma,
            CutParticle::Electron => &mut self.electron,
            CutParticle::Positron => &mut self.positron,
            CutParticle::Proton => &mut self.proton,
        };
        *slot = value;
    }

    /// The cut for `particle`, with `all` taking over when the particle is unset.
    pub fn resolve(&self, particle: CutParticle) -> Option<f64> {
        self.get(particle).or(self.all)
    }

    /// One `name: value` line per particle, `None` for unset entries.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        for p in CutParticle::ALL {
            match self.get(p) {
                Some(v) => s.push_str(&format!("{}: {}\n", p, v)),
                None => s.push_str(&format!("{}: None\n", p)),
            }
        }
        s
    }
}

/// The fixed set of per-region user limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserLimitKind {
    MaxStepSize,
    MaxTrackLength,
    MinEkine,
    MaxTime,
    MinRange,
}

impl UserLimitKind {
    pub const ALL: [UserLimitKind; 5] = [
        UserLimitKind::MaxStepSize,
        UserLimitKind::MaxTrackLength,
        UserLimitKind::MinEkine,
        UserLimitKind::MaxTime,
        UserLimitKind::MinRange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UserLimitKind::MaxStepSize => "max_step_size",
            UserLimitKind::MaxTrackLength => "max_track_length",
            UserLimitKind::MinEkine => "min_ekine",
            UserLimitKind::MaxTime => "max_time",
            UserLimitKind::MinRange => "min_range",
        }
    }
}

impl fmt::Display for UserLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserLimitKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older configurations spell the kinetic energy threshold out.
        let s = if s == "min_kinetic_energy" { "min_ekine" } else { s };
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownLimitKind {
                name: s.to_string(),
                known: Self::ALL.iter().map(|k| k.name().to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserLimits {
    pub max_step_size: Option<f64>,
    pub max_track_length: Option<f64>,
    pub min_ekine: Option<f64>,
    pub max_time: Option<f64>,
    pub min_range: Option<f64>,
}

impl UserLimits {
    pub fn get(&self, kind: UserLimitKind) -> Option<f64> {
        match kind {
            UserLimitKind::MaxStepSize => self.max_step_size,
            UserLimitKind::MaxTrackLength => self.max_track_length,
            UserLimitKind::MinEkine => self.min_ekine,
            UserLimitKind::MaxTime => self.max_time,
            UserLimitKind::MinRange => self.min_range,
        }
    }

    pub fn set(&mut self, kind: UserLimitKind, value: Option<f64>) {
        let slot = match kind {
            UserLimitKind::MaxStepSize => &mut self.max_step_size,
            UserLimitKind::MaxTrackLength => &mut self.max_track_length,
            UserLimitKind::MinEkine => &mut self.min_ekine,
            UserLimitKind::MaxTime => &mut self.max_time,
            UserLimitKind::MinRange => &mut self.min_range,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        UserLimitKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// Opaque identifier of the engine-side object built for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(pub u64);

/// A named group of volumes sharing cuts and limits.
///
/// The volume set is only changed through the physics manager, which keeps
/// the volume→region lookup table in sync with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    name: String,
    #[serde(default)]
    pub production_cuts: ProductionCuts,
    #[serde(default)]
    pub user_limits: UserLimits,
    #[serde(default)]
    volumes: IndexSet<String>,
    /// Volume this region was implicitly created for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_for: Option<String>,
    #[serde(skip)]
    engine_handle: Option<EngineHandle>,
}

impl Region {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            production_cuts: ProductionCuts::default(),
            user_limits: UserLimits::default(),
            volumes: IndexSet::new(),
            created_for: None,
            engine_handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Associated volume names, in association order.
    pub fn volumes(&self) -> &IndexSet<String> {
        &self.volumes
    }

    pub fn contains_volume(&self, volume: &str) -> bool {
        self.volumes.contains(volume)
    }

    pub(crate) fn insert_volume(&mut self, volume: &str) -> bool {
        self.volumes.insert(volume.to_string())
    }

    pub(crate) fn remove_volume(&mut self, volume: &str) -> bool {
        self.volumes.shift_remove(volume)
    }

    /// The volume this region was created for by `find_or_create_region`.
    pub fn created_for(&self) -> Option<&str> {
        self.created_for.as_deref()
    }

    pub(crate) fn mark_created_for(&mut self, volume: &str) {
        self.created_for = Some(volume.to_string());
    }

    pub fn engine_handle(&self) -> Option<EngineHandle> {
        self.engine_handle
    }

    pub fn attach_engine_handle(&mut self, handle: EngineHandle) {
        self.engine_handle = Some(handle);
    }

    /// Forget the engine-side object. Cuts, limits and volumes are kept.
    pub fn release_engine_handle(&mut self) {
        self.engine_handle = None;
    }

    pub fn dump_production_cuts(&self) -> String {
        self.production_cuts.dump()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let volumes: Vec<&str> = self.volumes.iter().map(String::as_str).collect();
        write!(f, "Region {} (volumes: {})", self.name, volumes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_all() {
        let mut cuts = ProductionCuts::default();
        assert_eq!(cuts.resolve(CutParticle::Gamma), None);
        cuts.set(CutParticle::All, Some(1.0));
        assert_eq!(cuts.resolve(CutParticle::Gamma), Some(1.0));
        cuts.set(CutParticle::Gamma, Some(0.1));
        assert_eq!(cuts.resolve(CutParticle::Gamma), Some(0.1));
    }

    #[test]
    fn test_dump_lists_every_particle() {
        let mut cuts = ProductionCuts::default();
        cuts.set(CutParticle::Proton, Some(5.0));
        let dump = cuts.dump();
        assert!(dump.contains("proton: 5\n"));
        assert!(dump.contains("gamma: None\n"));
        assert_eq!(dump.lines().count(), 5);
    }

    #[test]
    fn test_limit_kind_accepts_long_spelling() {
        assert_eq!("min_ekine".parse::<UserLimitKind>(), Ok(UserLimitKind::MinEkine));
        assert_eq!(
            "min_kinetic_energy".parse::<UserLimitKind>(),
            Ok(UserLimitKind::MinEkine)
        );
        let err = "max_speed".parse::<UserLimitKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLimitKind { ref known, .. } if known.len() == 5));
    }

    #[test]
    fn test_user_limits_get_set() {
        let mut limits = UserLimits::default();
        assert!(limits.is_empty());
        limits.set(UserLimitKind::MaxStepSize, Some(1.0));
        assert_eq!(limits.max_step_size, Some(1.0));
        assert!(!limits.is_empty());
    }

    #[test]
    fn test_engine_handle_not_serialized() {
        let mut region = Region::new("r");
        region.insert_volume("a");
        region.attach_engine_handle(EngineHandle(7));
        let value = serde_json::to_value(&region).expect("serialize");
        assert!(value.get("engine_handle").is_none());
        let back: Region = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back.engine_handle(), None);
        assert!(back.contains_volume("a"));
    }
}
