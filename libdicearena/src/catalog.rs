//! Die catalog: the fixed set of supported dice and their static description.
//!
//! Every die carries the face-normal table of its ideal solid, but only the d6
//! is simulated with its true shape. The other dice tumble as bounding spheres
//! and their value is drawn at resolution time instead of read from the pose
//! (see [`crate::outcome`]).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use nalgebra::{Matrix3, Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::RollError;
use crate::Real;

/// Supported die types, ordered by side count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub const ALL: [DieType; 7] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
        DieType::D100,
    ];

    pub fn sides(self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        DieType::ALL.into_iter().find(|d| d.sides() == sides)
    }

    pub fn name(self) -> &'static str {
        match self {
            DieType::D4 => "d4",
            DieType::D6 => "d6",
            DieType::D8 => "d8",
            DieType::D10 => "d10",
            DieType::D12 => "d12",
            DieType::D20 => "d20",
            DieType::D100 => "d100",
        }
    }

    /// Static description of this die.
    pub fn spec(self) -> &'static DieSpec {
        spec_for(self)
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DieType {
    type Err = RollError;

    /// Accepts `d6`, `D6` and the bare side count `6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('d')
            .or_else(|| trimmed.strip_prefix('D'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(DieType::from_sides)
            .ok_or_else(|| RollError::UnknownDieType(s.to_string()))
    }
}

/// Collision shape of a die in body space, centered on the center of mass.
#[derive(Clone, Debug, PartialEq)]
pub enum Collider {
    Box { half_extents: Vector3<Real> },
    Sphere { radius: Real },
    /// Convex point cloud; contacts are taken at the points themselves.
    ConvexHull { points: Vec<Point3<Real>> },
}

impl Collider {
    pub fn cube(half: Real) -> Self {
        Collider::Box {
            half_extents: Vector3::repeat(half),
        }
    }

    /// Radius of the smallest origin-centered sphere containing the shape.
    pub fn bounding_radius(&self) -> Real {
        match self {
            Collider::Box { half_extents } => half_extents.norm(),
            Collider::Sphere { radius } => *radius,
            Collider::ConvexHull { points } => points
                .iter()
                .map(|p| p.coords.norm())
                .fold(0.0, Real::max),
        }
    }

    /// Radius used for body-body contacts. Boxes use the mean half extent.
    pub fn contact_radius(&self) -> Real {
        match self {
            Collider::Box { half_extents } => half_extents.sum() / 3.0,
            Collider::Sphere { radius } => *radius,
            Collider::ConvexHull { .. } => self.bounding_radius(),
        }
    }

    /// Corner points in body space, or `None` for a sphere.
    pub fn corners(&self) -> Option<Vec<Point3<Real>>> {
        match self {
            Collider::Box { half_extents: h } => {
                let mut out = Vec::with_capacity(8);
                for sx in [-1.0, 1.0] {
                    for sy in [-1.0, 1.0] {
                        for sz in [-1.0, 1.0] {
                            out.push(Point3::new(sx * h.x, sy * h.y, sz * h.z));
                        }
                    }
                }
                Some(out)
            }
            Collider::Sphere { .. } => None,
            Collider::ConvexHull { points } => Some(points.clone()),
        }
    }

    /// Whether the resting pose of this shape says something about the value.
    pub fn reads_pose(&self) -> bool {
        !matches!(self, Collider::Sphere { .. })
    }

    /// Inverse inertia tensor in body coordinates.
    /// Hulls use the inertia of their axis-aligned bounding box.
    pub fn inv_inertia_body(&self, mass: Real) -> Matrix3<Real> {
        let diag = match self {
            Collider::Box { half_extents } => box_inertia(mass, half_extents),
            Collider::Sphere { radius } => Vector3::repeat(0.4 * mass * radius * radius),
            Collider::ConvexHull { points } => {
                let mut h: Vector3<Real> = Vector3::zeros();
                for p in points {
                    h = h.sup(&p.coords.abs());
                }
                box_inertia(mass, &h)
            }
        };
        Matrix3::from_diagonal(&diag.map(|i| if i > crate::EPS { 1.0 / i } else { 0.0 }))
    }

    /// Distance from the center to the lowest point when resting upright.
    pub fn resting_height(&self) -> Real {
        match self {
            Collider::Box { half_extents } => half_extents.y,
            Collider::Sphere { radius } => *radius,
            Collider::ConvexHull { points } => points
                .iter()
                .map(|p| -p.y)
                .fold(0.0, Real::max),
        }
    }
}

fn box_inertia(mass: Real, h: &Vector3<Real>) -> Vector3<Real> {
    let k = mass / 3.0;
    Vector3::new(
        k * (h.y * h.y + h.z * h.z),
        k * (h.x * h.x + h.z * h.z),
        k * (h.x * h.x + h.y * h.y),
    )
}

/// Identifier for the host's render mesh of a die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderGeometryId {
    Tetrahedron,
    Cube,
    Octahedron,
    PentagonalTrapezohedron,
    PercentileTrapezohedron,
    Dodecahedron,
    Icosahedron,
}

/// Body-space face direction and the value shown when it points up.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceNormal {
    pub direction: Unit<Vector3<Real>>,
    pub value: u32,
}

#[derive(Clone, Debug)]
pub struct DieSpec {
    pub die_type: DieType,
    pub sides: u32,
    pub mass: Real,
    pub collider: Collider,
    pub render_geometry: RenderGeometryId,
    pub face_normals: Vec<FaceNormal>,
}

impl DieSpec {
    /// Face whose world-space normal points most upward (+Y).
    /// Ties go to the first-listed face. `None` for an empty face table.
    pub fn up_face(&self, orientation: &UnitQuaternion<Real>) -> Option<&FaceNormal> {
        let up = Vector3::y();
        let mut best: Option<(&FaceNormal, Real)> = None;
        for face in &self.face_normals {
            let d = (orientation * face.direction.into_inner()).dot(&up);
            if best.map_or(true, |(_, best_dot)| d > best_dot) {
                best = Some((face, d));
            }
        }
        best.map(|(face, _)| face)
    }
}

static CATALOG: LazyLock<Vec<DieSpec>> = LazyLock::new(build_catalog);

/// Static description of a die type.
pub fn spec_for(die: DieType) -> &'static DieSpec {
    // CATALOG is built in `DieType::ALL` order
    &CATALOG[die as usize]
}

fn build_catalog() -> Vec<DieSpec> {
    DieType::ALL
        .into_iter()
        .map(|die_type| {
            let (mass, collider, render_geometry, face_normals) = match die_type {
                DieType::D4 => (
                    0.8,
                    Collider::Sphere { radius: 0.55 },
                    RenderGeometryId::Tetrahedron,
                    tetrahedron_faces(),
                ),
                DieType::D6 => (
                    1.0,
                    Collider::cube(0.5),
                    RenderGeometryId::Cube,
                    cube_faces(),
                ),
                DieType::D8 => (
                    1.0,
                    Collider::Sphere { radius: 0.6 },
                    RenderGeometryId::Octahedron,
                    octahedron_faces(),
                ),
                DieType::D10 => (
                    1.05,
                    Collider::Sphere { radius: 0.6 },
                    RenderGeometryId::PentagonalTrapezohedron,
                    trapezohedron_faces(1),
                ),
                DieType::D12 => (
                    1.15,
                    Collider::Sphere { radius: 0.65 },
                    RenderGeometryId::Dodecahedron,
                    dodecahedron_faces(),
                ),
                DieType::D20 => (
                    1.3,
                    Collider::Sphere { radius: 0.7 },
                    RenderGeometryId::Icosahedron,
                    icosahedron_faces(),
                ),
                DieType::D100 => (
                    1.05,
                    Collider::Sphere { radius: 0.6 },
                    RenderGeometryId::PercentileTrapezohedron,
                    trapezohedron_faces(10),
                ),
            };
            DieSpec {
                die_type,
                sides: die_type.sides(),
                mass,
                collider,
                render_geometry,
                face_normals,
            }
        })
        .collect()
}

// ---------- face tables ----------

fn face(x: Real, y: Real, z: Real, value: u32) -> FaceNormal {
    FaceNormal {
        direction: Unit::new_normalize(Vector3::new(x, y, z)),
        value,
    }
}

/// Each representative and its opposite face, with values summing to `sum`.
fn opposed_pairs(reps: &[[Real; 3]], sum: u32) -> Vec<FaceNormal> {
    let mut out = Vec::with_capacity(reps.len() * 2);
    for (i, [x, y, z]) in reps.iter().copied().enumerate() {
        let v = i as u32 + 1;
        out.push(face(x, y, z, v));
        out.push(face(-x, -y, -z, sum - v));
    }
    out
}

fn cube_faces() -> Vec<FaceNormal> {
    vec![
        face(0.0, 1.0, 0.0, 6),
        face(0.0, -1.0, 0.0, 1),
        face(1.0, 0.0, 0.0, 3),
        face(-1.0, 0.0, 0.0, 4),
        face(0.0, 0.0, 1.0, 2),
        face(0.0, 0.0, -1.0, 5),
    ]
}

/// Faces lie opposite the vertices (1,1,1), (1,-1,-1), (-1,1,-1), (-1,-1,1).
fn tetrahedron_faces() -> Vec<FaceNormal> {
    vec![
        face(-1.0, -1.0, -1.0, 1),
        face(-1.0, 1.0, 1.0, 2),
        face(1.0, -1.0, 1.0, 3),
        face(1.0, 1.0, -1.0, 4),
    ]
}

fn octahedron_faces() -> Vec<FaceNormal> {
    opposed_pairs(
        &[
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
        ],
        9,
    )
}

/// Face normals of a dodecahedron are the icosahedron's vertex directions.
fn dodecahedron_faces() -> Vec<FaceNormal> {
    let phi = golden_ratio();
    opposed_pairs(
        &[
            [0.0, 1.0, phi],
            [0.0, -1.0, phi],
            [1.0, phi, 0.0],
            [-1.0, phi, 0.0],
            [phi, 0.0, 1.0],
            [phi, 0.0, -1.0],
        ],
        13,
    )
}

/// Face normals of an icosahedron are the dodecahedron's vertex directions.
fn icosahedron_faces() -> Vec<FaceNormal> {
    let phi = golden_ratio();
    let inv = 1.0 / phi;
    opposed_pairs(
        &[
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
            [0.0, inv, phi],
            [0.0, -inv, phi],
            [inv, phi, 0.0],
            [-inv, phi, 0.0],
            [phi, 0.0, inv],
            [phi, 0.0, -inv],
        ],
        21,
    )
}

/// Kite faces of a pentagonal trapezohedron: five around the upper apex,
/// five around the lower one rotated by 36 degrees. Values are odd on top and
/// even below, opposite faces summing to 11, all scaled by `scale`.
fn trapezohedron_faces(scale: u32) -> Vec<FaceNormal> {
    const ELEVATION: Real = 0.72;
    let step = std::f32::consts::TAU / 5.0;
    let (sin_e, cos_e) = ELEVATION.sin_cos();
    let mut out = Vec::with_capacity(10);
    for k in 0..5u32 {
        let a = step * k as Real;
        out.push(face(cos_e * a.cos(), sin_e, cos_e * a.sin(), (2 * k + 1) * scale));
    }
    for j in 0..5u32 {
        let a = step * j as Real + step / 2.0;
        // the upper face opposite this one sits half a turn away
        let opposite = (j + 3) % 5;
        out.push(face(
            cos_e * a.cos(),
            -sin_e,
            cos_e * a.sin(),
            (10 - 2 * opposite) * scale,
        ));
    }
    out
}

fn golden_ratio() -> Real {
    (1.0 + (5.0 as Real).sqrt()) / 2.0
}
