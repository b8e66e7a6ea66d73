use indexmap::IndexMap;
use log::{debug, info};
use phantom_core::constants::{DEFAULT_REGION_SUFFIX, WORLD_NAME};
use phantom_core::error::{ConfigError, EntityKind, Result};
use phantom_core::particle::{CutParticle, LimitParticle};
use phantom_geometry::VolumeManager;
use serde::{Deserialize, Serialize};

use crate::region::{Region, UserLimitKind};
use crate::settings::{PhysicsConstructor, PhysicsSettings};

/// Where a volume stands with respect to regions.
///
/// A volume moves forward only: once it has a region it is never left
/// without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAssignment {
    Unassigned,
    /// In the implicit `<volume>_region` created on first use.
    DefaultRegion,
    NamedRegion,
}

/// Plain-data form of the physics configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsManagerSnapshot {
    #[serde(flatten)]
    pub settings: PhysicsSettings,
    #[serde(default)]
    pub regions: Vec<Region>,
}

/// Physics settings, regions and the volume→region lookup table.
#[derive(Debug, Clone, Default)]
pub struct PhysicsManager {
    pub settings: PhysicsSettings,
    regions: IndexMap<String, Region>,
    /// volume name → region name. Mirrors every region's volume set.
    lut: IndexMap<String, String>,
}

impl PhysicsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to default settings with no regions.
    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("Physics manager reset");
    }

    pub fn add_region(&mut self, name: &str) -> Result<&mut Region> {
        if self.regions.contains_key(name) {
            return Err(ConfigError::NameConflict {
                kind: EntityKind::Region,
                name: name.to_string(),
                existing: self.regions.keys().cloned().collect(),
            }
            .report());
        }
        info!("Adding region '{}'", name);
        let entry = self.regions.entry(name.to_string());
        Ok(entry.or_insert(Region::new(name)))
    }

    fn region_not_found(&self, name: &str) -> ConfigError {
        ConfigError::NotFound {
            kind: EntityKind::Region,
            name: name.to_string(),
            known: self.regions.keys().cloned().collect(),
        }
        .report()
    }

    pub fn region(&self, name: &str) -> Result<&Region> {
        self.regions
            .get(name)
            .ok_or_else(|| self.region_not_found(name))
    }

    pub fn region_mut(&mut self, name: &str) -> Result<&mut Region> {
        if !self.regions.contains_key(name) {
            return Err(self.region_not_found(name));
        }
        Ok(&mut self.regions[name])
    }

    /// Regions in creation order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    pub fn region_for_volume(&self, volume: &str) -> Option<&Region> {
        self.lut.get(volume).and_then(|r| self.regions.get(r))
    }

    pub fn volumes_regions_lut(&self) -> &IndexMap<String, String> {
        &self.lut
    }

    pub fn assignment(&self, volume: &str) -> RegionAssignment {
        match self.lut.get(volume) {
            None => RegionAssignment::Unassigned,
            Some(r) => match self.regions.get(r).and_then(Region::created_for) {
                Some(owner) if owner == volume => RegionAssignment::DefaultRegion,
                _ => RegionAssignment::NamedRegion,
            },
        }
    }

    /// Put `volume` in `region`, moving it out of any region it was in.
    pub fn associate_volume(&mut self, region: &str, volume: &str) -> Result<()> {
        if !self.regions.contains_key(region) {
            return Err(self.region_not_found(region));
        }
        if let Some(previous) = self.lut.get(volume) {
            if previous == region {
                return Ok(());
            }
            debug!("Moving volume '{}' from region '{}' to '{}'", volume, previous, region);
            if let Some(old) = self.regions.get_mut(previous) {
                old.remove_volume(volume);
            }
        }
        self.regions[region].insert_volume(volume);
        self.lut.insert(volume.to_string(), region.to_string());
        Ok(())
    }

    /// The region `volume` is in, or a new `<volume>_region` holding it.
    ///
    /// Fails with a name conflict if `<volume>_region` already exists but
    /// does not hold `volume`.
    pub fn find_or_create_region(&mut self, volume: &str) -> Result<&mut Region> {
        let name = match self.lut.get(volume) {
            Some(r) => r.clone(),
            None => {
                let name = default_region_name(volume);
                self.add_region(&name)?.mark_created_for(volume);
                self.associate_volume(&name, volume)?;
                name
            }
        };
        self.region_mut(&name)
    }

    /// Set a production cut for the region of `volume`. On the world root
    /// this writes the global table instead.
    pub fn set_production_cut(&mut self, volume: &str, particle: &str, value: f64) -> Result<()> {
        let particle: CutParticle = particle.parse().map_err(ConfigError::report)?;
        self.set_production_cut_for(volume, particle, value)
    }

    pub fn set_production_cut_for(
        &mut self,
        volume: &str,
        particle: CutParticle,
        value: f64,
    ) -> Result<()> {
        if volume == WORLD_NAME {
            debug!("Global production cut {} = {}", particle, value);
            self.settings.global_production_cuts.set(particle, Some(value));
            return Ok(());
        }
        let region = self.find_or_create_region(volume)?;
        debug!("Region '{}': production cut {} = {}", region.name(), particle, value);
        region.production_cuts.set(particle, Some(value));
        Ok(())
    }

    /// As [`set_production_cut`](Self::set_production_cut), then put every
    /// current descendant of `volume` into the same region.
    ///
    /// Descendants are taken from the tree as it is now. Volumes added under
    /// `volume` later are not picked up.
    pub fn set_production_cut_with_propagation(
        &mut self,
        volumes: &mut VolumeManager,
        volume: &str,
        particle: &str,
        value: f64,
    ) -> Result<()> {
        let particle: CutParticle = particle.parse().map_err(ConfigError::report)?;
        let descendants = volumes.descendants(volume)?;
        self.set_production_cut_for(volume, particle, value)?;
        if volume == WORLD_NAME {
            return Ok(());
        }
        let region = self.find_or_create_region(volume)?.name().to_string();
        for d in &descendants {
            self.associate_volume(&region, d)?;
        }
        info!(
            "Propagated {} cut from '{}' to {} descendants (region '{}')",
            particle,
            volume,
            descendants.len(),
            region
        );
        Ok(())
    }

    /// The cut that applies to `volume`: region particle, region `all`,
    /// global particle, global `all`, in that order.
    pub fn effective_production_cut(&self, volume: &str, particle: CutParticle) -> Option<f64> {
        self.region_for_volume(volume)
            .and_then(|r| r.production_cuts.resolve(particle))
            .or_else(|| self.settings.global_production_cuts.resolve(particle))
    }

    pub fn set_user_limit(&mut self, kind: &str, volume: &str, value: f64) -> Result<()> {
        let kind: UserLimitKind = kind.parse().map_err(ConfigError::report)?;
        self.set_user_limit_for(kind, volume, value)
    }

    pub fn set_user_limit_for(&mut self, kind: UserLimitKind, volume: &str, value: f64) -> Result<()> {
        let region = self.find_or_create_region(volume)?;
        debug!("Region '{}': {} = {}", region.name(), kind, value);
        region.user_limits.set(kind, Some(value));
        Ok(())
    }

    pub fn set_max_step_size(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxStepSize, volume, value)
    }

    pub fn set_max_track_length(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxTrackLength, volume, value)
    }

    pub fn set_min_ekine(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MinEkine, volume, value)
    }

    pub fn set_max_time(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MaxTime, volume, value)
    }

    pub fn set_min_range(&mut self, volume: &str, value: f64) -> Result<()> {
        self.set_user_limit_for(UserLimitKind::MinRange, volume, value)
    }

    /// Switch user limits on for the named particles. Others are left as
    /// they are. Nothing changes if any name is unknown.
    pub fn set_user_limits_particles(&mut self, names: &[&str]) -> Result<()> {
        let particles = names
            .iter()
            .map(|n| n.parse::<LimitParticle>())
            .collect::<Result<Vec<_>>>()
            .map_err(ConfigError::report)?;
        for p in particles {
            self.settings.user_limits_particles.set(p, true);
        }
        Ok(())
    }

    pub fn set_special_physics_constructor(&mut self, name: &str, enabled: bool) -> Result<()> {
        let constructor: PhysicsConstructor = name.parse().map_err(ConfigError::report)?;
        self.settings
            .special_physics_constructors
            .set(constructor, enabled);
        Ok(())
    }

    /// Whether both decay constructors are on. Fails if only one of them is.
    ///
    /// `false` means the physics list default is kept; decay is not
    /// forcibly removed.
    pub fn enable_decay(&self) -> Result<bool> {
        let spc = &self.settings.special_physics_constructors;
        if spc.decay == spc.radioactive_decay {
            return Ok(spc.decay);
        }
        Err(ConfigError::InconsistentState(format!(
            "Inconsistent decay constructors: {} = {}, {} = {}",
            PhysicsConstructor::Decay,
            spc.decay,
            PhysicsConstructor::RadioactiveDecay,
            spc.radioactive_decay
        ))
        .report())
    }

    pub fn set_enable_decay(&mut self, enabled: bool) {
        let spc = &mut self.settings.special_physics_constructors;
        spc.set(PhysicsConstructor::Decay, enabled);
        spc.set(PhysicsConstructor::RadioactiveDecay, enabled);
    }

    pub fn physics_list_name(&self) -> &str {
        &self.settings.physics_list_name
    }

    pub fn set_physics_list_name(&mut self, name: &str) {
        self.settings.physics_list_name = name.to_string();
    }

    pub fn dump_production_cuts(&self) -> String {
        let mut s = String::from("*** Production cuts for World: ***\n");
        s.push_str(&self.settings.global_production_cuts.dump());
        if self.regions.is_empty() {
            s.push_str("*** No cuts per region defined. ***\n");
            return s;
        }
        s.push_str("*** Production cuts per regions ***\n");
        for region in self.regions.values() {
            s.push_str(&format!("In region {}:\n", region.name()));
            s.push_str(&region.dump_production_cuts());
        }
        s
    }

    /// Drop the engine-side handles regions hold. Configuration data is kept.
    pub fn release_engine_references(&mut self) {
        for region in self.regions.values_mut() {
            region.release_engine_handle();
        }
    }

    pub fn to_snapshot(&self) -> PhysicsManagerSnapshot {
        PhysicsManagerSnapshot {
            settings: self.settings.clone(),
            regions: self.regions.values().cloned().collect(),
        }
    }

    /// Replace everything with `snapshot`. Every region volume must exist in
    /// `volumes`, and no volume may be listed by two regions.
    pub fn restore(
        &mut self,
        snapshot: &PhysicsManagerSnapshot,
        volumes: &VolumeManager,
    ) -> Result<()> {
        self.reset();
        self.settings = snapshot.settings.clone();
        for recorded in &snapshot.regions {
            self.add_region(recorded.name()).map_err(|e| {
                ConfigError::SnapshotInconsistent(format!("region '{}': {}", recorded.name(), e))
                    .report()
            })?;
            let region = &mut self.regions[recorded.name()];
            region.production_cuts = recorded.production_cuts;
            region.user_limits = recorded.user_limits;
            if let Some(owner) = recorded.created_for() {
                region.mark_created_for(owner);
            }

            for volume in recorded.volumes() {
                if !volumes.contains(volume) {
                    return Err(ConfigError::SnapshotInconsistent(format!(
                        "region '{}' references volume '{}' which is not defined",
                        recorded.name(),
                        volume
                    ))
                    .report());
                }
                if let Some(other) = self.lut.get(volume) {
                    return Err(ConfigError::SnapshotInconsistent(format!(
                        "volume '{}' is listed in regions '{}' and '{}'",
                        volume,
                        other,
                        recorded.name()
                    ))
                    .report());
                }
                self.associate_volume(recorded.name(), volume)?;
            }
        }
        info!("Physics manager restored ({} regions)", self.regions.len());
        Ok(())
    }
}

fn default_region_name(volume: &str) -> String {
    format!("{}{}", volume, DEFAULT_REGION_SUFFIX)
}
