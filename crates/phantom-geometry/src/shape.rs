//! Closed set of shape kinds and their parameter sets.
//!
//! Engine-native solids are built elsewhere; this module only carries the
//! parameters and the static registration table used by the volume factory.

use std::fmt;

use phantom_core::constants::WORLD_SIZE;
use phantom_core::error::{ConfigError, Result};
use phantom_core::units::{CM, DEG, MM};
use serde::{Deserialize, Serialize};

/// Discriminant of [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Sphere,
    Tubs,
    Cons,
    Trd,
    Trap,
    Polyhedra,
    Hexagon,
    /// Root of a parallel world. Not creatable through the registry.
    ParallelWorld,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "Box",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Tubs => "Tubs",
            ShapeKind::Cons => "Cons",
            ShapeKind::Trd => "Trd",
            ShapeKind::Trap => "Trap",
            ShapeKind::Polyhedra => "Polyhedra",
            ShapeKind::Hexagon => "Hexagon",
            ShapeKind::ParallelWorld => "ParallelWorld",
        }
    }

    /// Resolve a user-facing kind name through [`SHAPE_REGISTRY`].
    /// Both "Box" and "BoxVolume" spellings are accepted.
    pub fn from_name(name: &str) -> Result<ShapeKind> {
        lookup(name).map(|r| r.kind)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rectangular box given by its full side lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxShape {
    pub size: [f64; 3],
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            size: [10.0 * CM, 10.0 * CM, 10.0 * CM],
        }
    }
}

/// Spherical shell section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereShape {
    /// Inner radius (0 = solid sphere).
    pub rmin: f64,
    pub rmax: f64,
    pub sphi: f64,
    pub dphi: f64,
    pub stheta: f64,
    pub dtheta: f64,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            rmin: 0.0,
            rmax: 1.0 * MM,
            sphi: 0.0,
            dphi: 360.0 * DEG,
            stheta: 0.0,
            dtheta: 180.0 * DEG,
        }
    }
}

/// Tube segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubsShape {
    pub rmin: f64,
    pub rmax: f64,
    /// Half length along Z.
    pub dz: f64,
    pub sphi: f64,
    pub dphi: f64,
}

impl Default for TubsShape {
    fn default() -> Self {
        Self {
            rmin: 30.0 * MM,
            rmax: 40.0 * MM,
            dz: 40.0 * MM,
            sphi: 0.0,
            dphi: 360.0 * DEG,
        }
    }
}

/// Cone section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsShape {
    pub rmin1: f64,
    pub rmin2: f64,
    pub rmax1: f64,
    pub rmax2: f64,
    pub dz: f64,
    pub sphi: f64,
    pub dphi: f64,
}

impl Default for ConsShape {
    fn default() -> Self {
        Self {
            rmin1: 5.0 * MM,
            rmin2: 20.0 * MM,
            rmax1: 10.0 * MM,
            rmax2: 25.0 * MM,
            dz: 40.0 * MM,
            sphi: 0.0,
            dphi: 45.0 * DEG,
        }
    }
}

/// Trapezoid with x and y half-lengths varying along z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrdShape {
    pub dx1: f64,
    pub dx2: f64,
    pub dy1: f64,
    pub dy2: f64,
    pub dz: f64,
}

impl Default for TrdShape {
    fn default() -> Self {
        Self {
            dx1: 30.0 * MM,
            dx2: 10.0 * MM,
            dy1: 40.0 * MM,
            dy2: 15.0 * MM,
            dz: 15.0 * MM,
        }
    }
}

/// General trapezoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapShape {
    pub dz: f64,
    pub theta: f64,
    pub phi: f64,
    pub dy1: f64,
    pub dx1: f64,
    pub dx2: f64,
    pub alp1: f64,
    pub dy2: f64,
    pub dx3: f64,
    pub dx4: f64,
    pub alp2: f64,
}

impl Default for TrapShape {
    fn default() -> Self {
        Self {
            dz: 60.0 * MM,
            theta: 20.0 * DEG,
            phi: 5.0 * DEG,
            dy1: 40.0 * MM,
            dx1: 30.0 * MM,
            dx2: 40.0 * MM,
            alp1: 10.0 * DEG,
            dy2: 16.0 * MM,
            dx3: 10.0 * MM,
            dx4: 14.0 * MM,
            alp2: 10.0 * DEG,
        }
    }
}

/// Polyhedra defined by z planes and per-side radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyhedraShape {
    pub phi_start: f64,
    pub phi_total: f64,
    pub num_side: u32,
    pub num_zplanes: u32,
    pub zplane: Vec<f64>,
    pub radius_inner: Vec<f64>,
    pub radius_outer: Vec<f64>,
}

impl Default for PolyhedraShape {
    fn default() -> Self {
        Self {
            phi_start: 0.0,
            phi_total: 360.0 * DEG,
            num_side: 6,
            num_zplanes: 2,
            zplane: vec![-2.5 * CM, 2.5 * CM],
            radius_inner: vec![0.0; 6],
            radius_outer: vec![0.15 * CM; 6],
        }
    }
}

/// Six-sided polyhedra given by height and corner radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexagonShape {
    pub height: f64,
    pub radius: f64,
}

impl Default for HexagonShape {
    fn default() -> Self {
        Self {
            height: 5.0 * CM,
            radius: 0.15 * CM,
        }
    }
}

/// Shape parameters of a volume, one variant per [`ShapeKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box(BoxShape),
    Sphere(SphereShape),
    Tubs(TubsShape),
    Cons(ConsShape),
    Trd(TrdShape),
    Trap(TrapShape),
    Polyhedra(PolyhedraShape),
    Hexagon(HexagonShape),
    ParallelWorld,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box(_) => ShapeKind::Box,
            Shape::Sphere(_) => ShapeKind::Sphere,
            Shape::Tubs(_) => ShapeKind::Tubs,
            Shape::Cons(_) => ShapeKind::Cons,
            Shape::Trd(_) => ShapeKind::Trd,
            Shape::Trap(_) => ShapeKind::Trap,
            Shape::Polyhedra(_) => ShapeKind::Polyhedra,
            Shape::Hexagon(_) => ShapeKind::Hexagon,
            Shape::ParallelWorld => ShapeKind::ParallelWorld,
        }
    }

    /// Default parameter set for `kind`.
    pub fn defaults(kind: ShapeKind) -> Shape {
        match kind {
            ShapeKind::Box => Shape::Box(BoxShape::default()),
            ShapeKind::Sphere => Shape::Sphere(SphereShape::default()),
            ShapeKind::Tubs => Shape::Tubs(TubsShape::default()),
            ShapeKind::Cons => Shape::Cons(ConsShape::default()),
            ShapeKind::Trd => Shape::Trd(TrdShape::default()),
            ShapeKind::Trap => Shape::Trap(TrapShape::default()),
            ShapeKind::Polyhedra => Shape::Polyhedra(PolyhedraShape::default()),
            ShapeKind::Hexagon => Shape::Hexagon(HexagonShape::default()),
            ShapeKind::ParallelWorld => Shape::ParallelWorld,
        }
    }

    /// The box a default world volume uses.
    pub fn world_box() -> Shape {
        Shape::Box(BoxShape {
            size: [WORLD_SIZE; 3],
        })
    }
}

/// One entry of the static shape registry.
#[derive(Debug)]
pub struct ShapeRegistration {
    pub kind: ShapeKind,
    pub name: &'static str,
    pub doc: &'static str,
}

/// Shape kinds a user may instantiate by name.
pub const SHAPE_REGISTRY: &[ShapeRegistration] = &[
    ShapeRegistration {
        kind: ShapeKind::Box,
        name: "Box",
        doc: "Rectangular box",
    },
    ShapeRegistration {
        kind: ShapeKind::Sphere,
        name: "Sphere",
        doc: "Spherical shell section",
    },
    ShapeRegistration {
        kind: ShapeKind::Tubs,
        name: "Tubs",
        doc: "Tube segment",
    },
    ShapeRegistration {
        kind: ShapeKind::Cons,
        name: "Cons",
        doc: "Cone section",
    },
    ShapeRegistration {
        kind: ShapeKind::Trd,
        name: "Trd",
        doc: "Trapezoid, x/y varying along z",
    },
    ShapeRegistration {
        kind: ShapeKind::Trap,
        name: "Trap",
        doc: "General trapezoid",
    },
    ShapeRegistration {
        kind: ShapeKind::Polyhedra,
        name: "Polyhedra",
        doc: "Polyhedra from z planes",
    },
    ShapeRegistration {
        kind: ShapeKind::Hexagon,
        name: "Hexagon",
        doc: "Six-sided polyhedra",
    },
];

/// Find the registration for a kind name ("Box" or "BoxVolume").
pub fn lookup(name: &str) -> Result<&'static ShapeRegistration> {
    let bare = name.strip_suffix("Volume").unwrap_or(name);
    SHAPE_REGISTRY
        .iter()
        .find(|r| r.name == bare)
        .ok_or_else(|| ConfigError::UnknownKind {
            name: name.to_string(),
            known: registered_kind_names(),
        })
}

/// Names of all registered kinds, in registry order, with the "Volume" suffix.
pub fn registered_kind_names() -> Vec<String> {
    SHAPE_REGISTRY
        .iter()
        .map(|r| format!("{}Volume", r.name))
        .collect()
}
