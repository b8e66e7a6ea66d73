//! Derived parent→children index over all worlds.
//!
//! The tree never owns volumes. It is rebuilt from the `mother` names held in
//! the volume arena and replaced wholesale, so a failed rebuild leaves the
//! previous index untouched.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use phantom_core::error::{ConfigError, EntityKind, Result};

use crate::volume::Volume;

/// Indentation per depth level in [`VolumeTree::render`].
const RENDER_INDENT: usize = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeTree {
    /// World roots in creation order (main world first).
    roots: Vec<String>,
    /// Children per volume, in volume insertion order.
    children: HashMap<String, Vec<String>>,
    /// World root each volume hangs under.
    world_of: HashMap<String, String>,
}

impl VolumeTree {
    /// Build the index from the volume arena.
    ///
    /// Each non-root volume's mother chain is walked until a world root is
    /// reached. Revisiting a volume on the way means the chain is cyclic.
    ///
    /// `roots` lists the world roots, main world first. A root that names a
    /// mother is rejected.
    pub fn build(volumes: &IndexMap<String, Volume>, roots: &[String]) -> Result<Self> {
        let main_root = roots.first().map(String::as_str).ok_or_else(|| {
            ConfigError::InconsistentState("volume tree needs at least one world root".to_string())
        })?;
        for root in roots {
            if let Some(mother) = volumes.get(root).and_then(Volume::mother) {
                return Err(ConfigError::InconsistentState(format!(
                    "world root '{}' cannot be placed in mother '{}'",
                    root, mother
                )));
            }
        }
        let root_set: HashSet<&str> = roots.iter().map(String::as_str).collect();
        let mut world_of: HashMap<String, String> = roots
            .iter()
            .map(|r| (r.clone(), r.clone()))
            .collect();

        for name in volumes.keys() {
            if world_of.contains_key(name) {
                continue;
            }

            let mut chain: Vec<&str> = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            let mut current = name.as_str();
            let world = loop {
                if let Some(w) = world_of.get(current) {
                    break w.clone();
                }
                if root_set.contains(current) {
                    break current.to_string();
                }
                if !seen.insert(current) {
                    return Err(ConfigError::CyclicGraph {
                        volume: current.to_string(),
                    });
                }
                chain.push(current);

                let volume = volumes.get(current).ok_or_else(|| ConfigError::NotFound {
                    kind: EntityKind::Volume,
                    name: current.to_string(),
                    known: volumes.keys().cloned().collect(),
                })?;
                // A non-root without a mother sits directly in the main world.
                current = volume.mother().unwrap_or(main_root);
            };

            for link in chain {
                world_of.insert(link.to_string(), world.clone());
            }
        }

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for (name, volume) in volumes {
            if root_set.contains(name.as_str()) {
                continue;
            }
            let mother = volume.mother().unwrap_or(main_root);
            children
                .entry(mother.to_string())
                .or_default()
                .push(name.clone());
        }

        Ok(Self {
            roots: roots.to_vec(),
            children,
            world_of,
        })
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn contains(&self, name: &str) -> bool {
        self.world_of.contains_key(name)
    }

    /// Direct children of `name`, empty for leaves and unknown names.
    pub fn children(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name of the world root `name` belongs to.
    pub fn world_of(&self, name: &str) -> Option<&str> {
        self.world_of.get(name).map(String::as_str)
    }

    /// All descendants of `name` in pre-order, excluding `name` itself.
    pub fn descendants(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children(name).iter().rev().map(String::as_str).collect();
        while let Some(current) = stack.pop() {
            out.push(current.to_string());
            stack.extend(self.children(current).iter().rev().map(String::as_str));
        }
        out
    }

    /// Every volume with its depth, world by world, parents before children.
    pub fn walk(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::with_capacity(self.world_of.len());
        for root in &self.roots {
            let mut stack: Vec<(usize, &str)> = vec![(0, root.as_str())];
            while let Some((depth, current)) = stack.pop() {
                out.push((depth, current));
                stack.extend(
                    self.children(current)
                        .iter()
                        .rev()
                        .map(|c| (depth + 1, c.as_str())),
                );
            }
        }
        out
    }

    /// Indented listing of all worlds.
    pub fn render(&self) -> String {
        let mut s = String::new();
        for (depth, name) in self.walk() {
            s.push_str(&" ".repeat(depth * RENDER_INDENT));
            s.push_str(name);
            s.push('\n');
        }
        s
    }

    /// Number of indexed volumes, world roots included.
    pub fn len(&self) -> usize {
        self.world_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world_of.is_empty()
    }
}
