//! Rigid-body world: dice, arena planes, fixed sub-step integration and an
//! impulse contact solver.
//!
//! - Semi-implicit Euler with quaternion orientation integration
//! - One contact per body per plane (centroid of the corners within the
//!   contact margin); contacts inside the margin close their gap first
//! - Sphere-sphere contacts between bodies using each collider's contact radius
//! - Normal impulse with thresholded restitution, clamped Coulomb friction
//! - Baumgarte-style positional correction, rolling resistance on the floor
//!
//! The world never decides when a roll is over; see [`crate::settle`].

use std::sync::Arc;

use nalgebra::{Matrix3, Point3, Quaternion, Unit, UnitQuaternion, Vector3};
use serde::Serialize;
use tracing::warn;

use crate::catalog::{Collider, DieSpec, DieType};
use crate::config::{ArenaParams, Tunables};
use crate::{Real, EPS};

/// Bodies further than this outside the arena are treated as escaped.
const ESCAPE_MARGIN: Real = 2.0;

/// Which requested die a body fulfills: the n-th die of its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BodySlot {
    pub die_type: DieType,
    pub ordinal: u32,
}

/// One simulated die.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub id: usize,
    pub slot: BodySlot,
    pub spec: &'static DieSpec,

    pub mass: Real,
    pub inv_mass: Real,
    pub inv_inertia_body: Matrix3<Real>,
    pub linear_damping: Real,
    pub angular_damping: Real,

    // state
    pub position: Point3<Real>,
    pub orientation: UnitQuaternion<Real>,
    pub velocity: Vector3<Real>,
    pub angular_velocity: Vector3<Real>,
}

impl RigidBody {
    /// A body at rest at the origin; the throw parameterizer sets its state.
    pub fn new(id: usize, slot: BodySlot, spec: &'static DieSpec) -> Self {
        Self {
            id,
            slot,
            spec,
            mass: spec.mass,
            inv_mass: 1.0 / spec.mass.max(EPS),
            inv_inertia_body: spec.collider.inv_inertia_body(spec.mass),
            linear_damping: 0.0,
            angular_damping: 0.0,
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    pub fn collider(&self) -> &Collider {
        &self.spec.collider
    }

    pub fn linear_speed(&self) -> Real {
        self.velocity.norm()
    }

    pub fn angular_speed(&self) -> Real {
        self.angular_velocity.norm()
    }

    fn inv_inertia_world(&self) -> Matrix3<Real> {
        let binding = self.orientation.to_rotation_matrix();
        let r = binding.matrix();
        r * self.inv_inertia_body * r.transpose()
    }

    fn velocity_at(&self, r: &Vector3<Real>) -> Vector3<Real> {
        self.velocity + self.angular_velocity.cross(r)
    }

    fn apply_impulse_at_point(&mut self, impulse: Vector3<Real>, contact_r: Vector3<Real>) {
        self.velocity += impulse * self.inv_mass;
        let inv_iw = self.inv_inertia_world();
        self.angular_velocity += inv_iw * contact_r.cross(&impulse);
    }

    /// Inverse effective mass along `dir` for a push at `r`.
    fn inv_effective_mass(&self, r: &Vector3<Real>, dir: &Vector3<Real>) -> Real {
        let inv_i = self.inv_inertia_world();
        self.inv_mass + (inv_i * r.cross(dir)).cross(r).dot(dir)
    }

    fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
    }

    /// Renderable pose of this body.
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            body_id: self.id,
            die_type: self.slot.die_type,
            position: self.position,
            orientation: self.orientation,
        }
    }
}

/// Read-only transform handed to the host's rendering layer after every frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BodySnapshot {
    pub body_id: usize,
    pub die_type: DieType,
    pub position: Point3<Real>,
    pub orientation: UnitQuaternion<Real>,
}

/// Half-space boundary `normal · p >= offset`; the normal points into the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Unit<Vector3<Real>>,
    pub offset: Real,
}

impl Plane {
    pub fn new(normal: Vector3<Real>, offset: Real) -> Self {
        Self {
            normal: Unit::new_normalize(normal),
            offset,
        }
    }

    /// Positive inside the arena, negative when penetrating.
    pub fn signed_distance(&self, p: &Point3<Real>) -> Real {
        self.normal.dot(&p.coords) - self.offset
    }
}

/// Static colliders: the floor and four walls. Shared read-only between sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena {
    pub half_width: Real,
    pub half_depth: Real,
    pub floor: Plane,
    pub walls: [Plane; 4],
}

impl Arena {
    pub fn new(params: &ArenaParams) -> Self {
        let (w, d) = (params.half_width, params.half_depth);
        Self {
            half_width: w,
            half_depth: d,
            floor: Plane::new(Vector3::y(), 0.0),
            walls: [
                Plane::new(Vector3::x(), -w),
                Plane::new(-Vector3::x(), -w),
                Plane::new(Vector3::z(), -d),
                Plane::new(-Vector3::z(), -d),
            ],
        }
    }

    pub fn center(&self) -> Point3<Real> {
        Point3::origin()
    }

    /// Floor first, then walls.
    pub fn planes(&self) -> impl Iterator<Item = &Plane> {
        std::iter::once(&self.floor).chain(self.walls.iter())
    }

    fn has_escaped(&self, p: &Point3<Real>) -> bool {
        p.y < -ESCAPE_MARGIN
            || p.x.abs() > self.half_width + ESCAPE_MARGIN
            || p.z.abs() > self.half_depth + ESCAPE_MARGIN
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new(&ArenaParams::default())
    }
}

/// Contact between body `body` and either a plane or another body.
/// `normal` points from the other side towards `body`.
#[derive(Clone, Debug)]
struct Contact {
    body: usize,
    other: Option<usize>,
    point: Point3<Real>,
    normal: Vector3<Real>,
    /// Negative while the body is still within the margin but not touching.
    depth: Real,
    /// Corners touching the plane; 1 for spheres and body pairs.
    support: u32,
    floor: bool,
}

pub struct World {
    pub gravity: Vector3<Real>,
    arena: Arc<Arena>,
    params: Tunables,
    bodies: Vec<RigidBody>,
    accumulator: Real,
    elapsed: Real,
    anomalies: u32,
}

impl World {
    pub fn new(arena: Arc<Arena>, params: &Tunables) -> Self {
        Self {
            gravity: Vector3::new(0.0, -params.gravity, 0.0),
            arena,
            params: params.clone(),
            bodies: Vec::new(),
            accumulator: 0.0,
            elapsed: 0.0,
            anomalies: 0,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn add_body(&mut self, mut body: RigidBody) {
        body.linear_damping = self.params.linear_damping;
        body.angular_damping = self.params.angular_damping;
        self.bodies.push(body);
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Drops every body. Used when a roll ends or is cancelled.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.accumulator = 0.0;
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> Real {
        self.elapsed
    }

    /// Bodies reset after a non-finite state or escaping the arena.
    pub fn anomalies(&self) -> u32 {
        self.anomalies
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.iter().map(RigidBody::snapshot).collect()
    }

    /// Clamps `frame_delta` and returns how many fixed sub-steps to run for it.
    /// Time beyond the sub-step cap is dropped.
    pub fn plan_substeps(&mut self, frame_delta: Real) -> u32 {
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.params.max_frame_delta)
        } else {
            0.0
        };
        self.accumulator += delta;
        let h = self.params.fixed_step;
        let mut n = 0;
        while self.accumulator + EPS >= h && n < self.params.max_substeps {
            self.accumulator -= h;
            n += 1;
        }
        if n == self.params.max_substeps {
            self.accumulator = self.accumulator.min(h);
        }
        self.accumulator = self.accumulator.max(0.0);
        n
    }

    /// One fixed-size integration step.
    pub fn substep(&mut self) {
        let h = self.params.fixed_step;

        for body in &mut self.bodies {
            body.velocity += self.gravity * h;
            body.velocity *= (1.0 - body.linear_damping).max(0.0).powf(h);
            body.angular_velocity *= (1.0 - body.angular_damping).max(0.0).powf(h);
        }

        let contacts = self.detect_contacts();
        let mut grounded = vec![false; self.bodies.len()];
        for c in &contacts {
            if c.floor {
                grounded[c.body] = true;
            }
            self.resolve_contact_impulses(c);
            self.positional_correction(c);
        }

        let rr = self.params.rolling_resistance;
        for (body, on_floor) in self.bodies.iter_mut().zip(grounded) {
            if on_floor && rr > 0.0 {
                let inv_iw = body.inv_inertia_world();
                let tau = -body.angular_velocity * rr * body.mass;
                let dw = inv_iw * tau * h;
                // never reverse the spin
                if dw.norm() >= body.angular_velocity.norm() {
                    body.angular_velocity.fill(0.0);
                } else {
                    body.angular_velocity += dw;
                }
            }

            body.position += body.velocity * h;

            // quaternion derivative q' = 0.5 * w * q
            let w = body.angular_velocity;
            let q = *body.orientation.quaternion();
            let dq = Quaternion::from_parts(0.0, w) * q * (0.5 * h);
            body.orientation = UnitQuaternion::new_normalize(q + dq);
        }

        self.elapsed += h;
        self.repair_anomalies();
    }

    fn detect_contacts(&self) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let margin = self.params.contact_margin;
        for (idx, body) in self.bodies.iter().enumerate() {
            for (plane_idx, plane) in self.arena.planes().enumerate() {
                if let Some((point, depth, support)) = plane_contact(body, plane, margin) {
                    contacts.push(Contact {
                        body: idx,
                        other: None,
                        point,
                        normal: plane.normal.into_inner(),
                        depth,
                        support,
                        floor: plane_idx == 0,
                    });
                }
            }
        }
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                if let Some(c) = pair_contact(&self.bodies[i], &self.bodies[j], i, j) {
                    contacts.push(c);
                }
            }
        }
        contacts
    }

    /// Normal + friction impulses for one contact.
    fn resolve_contact_impulses(&mut self, c: &Contact) {
        let n = c.normal;
        let (b, a) = bodies_mut(&mut self.bodies, c.body, c.other);
        let rb = c.point - b.position;
        let ra = a.as_ref().map(|a| c.point - a.position);

        let relative = |b: &RigidBody, a: Option<&RigidBody>| -> Vector3<Real> {
            let vb = b.velocity_at(&rb);
            match (a, ra.as_ref()) {
                (Some(a), Some(ra)) => vb - a.velocity_at(ra),
                _ => vb,
            }
        };
        let inv_k = |b: &RigidBody, a: Option<&RigidBody>, dir: &Vector3<Real>| -> Real {
            let kb = b.inv_effective_mass(&rb, dir);
            match (a, ra.as_ref()) {
                (Some(a), Some(ra)) => kb + a.inv_effective_mass(ra, dir),
                _ => kb,
            }
        };

        let v_rel = relative(&*b, a.as_deref());
        let vn = v_rel.dot(&n);
        // approach that only closes the remaining gap this sub-step is left alone
        let gap = (-c.depth).max(0.0);
        let closing = vn + gap / self.params.fixed_step;
        if vn >= 0.0 || closing >= 0.0 {
            return;
        }

        let slow = -vn <= self.params.restitution_threshold;
        let bouncing = gap <= 0.0 && !slow;
        let denom = inv_k(&*b, a.as_deref(), &n).max(EPS);
        let jn = if bouncing {
            -(1.0 + self.params.restitution) * vn / denom
        } else {
            -closing / denom
        }
        .max(0.0);

        let mut a = a;
        b.apply_impulse_at_point(n * jn, rb);
        if let (Some(a), Some(ra)) = (a.as_deref_mut(), ra) {
            a.apply_impulse_at_point(-n * jn, ra);
        }

        // a face resting on a plane cannot tip without lifting
        if a.is_none() && c.support >= 3 && slow {
            b.angular_velocity = n * b.angular_velocity.dot(&n);
        }

        // friction impulse (Coulomb)
        let v_rel_post = relative(&*b, a.as_deref());
        let vt = v_rel_post - n * v_rel_post.dot(&n);
        let vt_len = vt.norm();
        if vt_len > 1e-6 {
            let t = vt / vt_len;
            let denom_t = inv_k(&*b, a.as_deref(), &t).max(EPS);
            let max_friction = self.params.friction * jn;
            let jt = (-v_rel_post.dot(&t) / denom_t).clamp(-max_friction, max_friction);
            b.apply_impulse_at_point(t * jt, rb);
            if let (Some(a), Some(ra)) = (a.as_deref_mut(), ra) {
                a.apply_impulse_at_point(-t * jt, ra);
            }
        }
    }

    /// Push bodies apart along the contact normal, split by inverse mass.
    fn positional_correction(&mut self, c: &Contact) {
        let corr_mag =
            (c.depth - self.params.penetration_slop).max(0.0) * self.params.position_correction;
        if corr_mag <= 0.0 {
            return;
        }
        let correction = c.normal * corr_mag;
        let (b, a) = bodies_mut(&mut self.bodies, c.body, c.other);
        match a {
            Some(a) => {
                let total = a.inv_mass + b.inv_mass;
                if total <= EPS {
                    return;
                }
                b.position += correction * (b.inv_mass / total);
                a.position -= correction * (a.inv_mass / total);
            }
            None => b.position += correction,
        }
    }

    /// Resets bodies with non-finite state, or that left the arena, to rest on the floor.
    fn repair_anomalies(&mut self) {
        for body in &mut self.bodies {
            let finite = body.is_finite();
            if finite && !self.arena.has_escaped(&body.position) {
                continue;
            }
            warn!(
                body = body.id,
                die = %body.slot.die_type,
                finite,
                "resetting body to a resting pose"
            );
            let x = finite_or_zero(body.position.x).clamp(-self.arena.half_width, self.arena.half_width);
            let z = finite_or_zero(body.position.z).clamp(-self.arena.half_depth, self.arena.half_depth);
            let inset = body.collider().bounding_radius();
            body.position = Point3::new(
                clamp_inside(x, self.arena.half_width, inset),
                body.collider().resting_height(),
                clamp_inside(z, self.arena.half_depth, inset),
            );
            body.orientation = UnitQuaternion::identity();
            body.velocity.fill(0.0);
            body.angular_velocity.fill(0.0);
            self.anomalies += 1;
        }
    }
}

fn finite_or_zero(v: Real) -> Real {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn clamp_inside(v: Real, half: Real, inset: Real) -> Real {
    let limit = (half - inset).max(0.0);
    v.clamp(-limit, limit)
}

/// Body at `idx` plus, optionally, a second distinct body.
fn bodies_mut(
    bodies: &mut [RigidBody],
    idx: usize,
    other: Option<usize>,
) -> (&mut RigidBody, Option<&mut RigidBody>) {
    match other {
        Some(o) if o < idx => {
            let (lo, hi) = bodies.split_at_mut(idx);
            (&mut hi[0], Some(&mut lo[o]))
        }
        Some(o) if o > idx => {
            let (lo, hi) = bodies.split_at_mut(o);
            (&mut lo[idx], Some(&mut hi[0]))
        }
        _ => (&mut bodies[idx], None),
    }
}

/// Single contact against a plane: the centroid of the corners closer than
/// `margin` (or the sphere's lowest point), the deepest penetration, and how
/// many corners are involved. A negative depth is the gap still to close.
fn plane_contact(
    body: &RigidBody,
    plane: &Plane,
    margin: Real,
) -> Option<(Point3<Real>, Real, u32)> {
    match body.collider() {
        Collider::Sphere { radius } => {
            let depth = radius - plane.signed_distance(&body.position);
            (depth > -margin)
                .then(|| (body.position - plane.normal.into_inner() * *radius, depth, 1))
        }
        collider => {
            let corners = collider.corners()?;
            let r = body.orientation.to_rotation_matrix();
            let mut centroid = Vector3::zeros();
            let mut count = 0u32;
            let mut depth = Real::MIN;
            for c in &corners {
                let p = body.position + r * c.coords;
                let d = plane.signed_distance(&p);
                if d < margin {
                    centroid += p.coords;
                    count += 1;
                    depth = depth.max(-d);
                }
            }
            (count > 0).then(|| (Point3::from(centroid / count as Real), depth, count))
        }
    }
}

/// Bodies collide as spheres of their contact radius. The normal points from `a` to `b`.
fn pair_contact(a: &RigidBody, b: &RigidBody, ia: usize, ib: usize) -> Option<Contact> {
    let ra = a.collider().contact_radius();
    let rb = b.collider().contact_radius();
    let delta = b.position - a.position;
    let dist = delta.norm();
    let depth = ra + rb - dist;
    if depth <= 0.0 {
        return None;
    }
    let normal = if dist > EPS { delta / dist } else { Vector3::y() };
    Some(Contact {
        body: ib,
        other: Some(ia),
        point: a.position + normal * (ra - depth * 0.5),
        normal,
        depth,
        support: 1,
        floor: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::spec_for;

    fn world() -> World {
        World::new(Arc::new(Arena::default()), &Tunables::default())
    }

    fn body(id: usize, die: DieType, pos: Point3<Real>) -> RigidBody {
        let mut b = RigidBody::new(
            id,
            BodySlot {
                die_type: die,
                ordinal: 0,
            },
            spec_for(die),
        );
        b.position = pos;
        b
    }

    #[test]
    fn plan_substeps_clamps_and_accumulates() {
        let mut w = world();
        // slow frame: clamped to 1/20 s -> 3 sub-steps
        assert_eq!(w.plan_substeps(1.0), 3);
        // half a sub-step carries over
        assert_eq!(w.plan_substeps(1.0 / 120.0), 0);
        assert_eq!(w.plan_substeps(1.0 / 120.0), 1);
        assert_eq!(w.plan_substeps(Real::NAN), 0);
        assert_eq!(w.plan_substeps(-1.0), 0);
    }

    #[test]
    fn free_fall_follows_gravity() {
        let mut w = world();
        w.add_body(body(0, DieType::D6, Point3::new(0.0, 10.0, 0.0)));
        w.substep();
        let b = &w.bodies()[0];
        assert!(b.velocity.y < 0.0);
        assert!(b.position.y < 10.0);
        assert!(w.elapsed() > 0.0);
    }

    #[test]
    fn cube_comes_to_rest_on_floor() {
        let mut w = world();
        let mut b = body(0, DieType::D6, Point3::new(0.0, 2.0, 0.0));
        b.angular_velocity = Vector3::new(3.0, 1.0, -2.0);
        w.add_body(b);
        for _ in 0..540 {
            w.substep();
        }
        // quiet on every one of the last 60 steps, not just the final one
        for step in 0..60 {
            w.substep();
            let b = &w.bodies()[0];
            assert!(b.linear_speed() < 0.05, "step {step}: v = {}", b.linear_speed());
            assert!(b.angular_speed() < 0.1, "step {step}: w = {}", b.angular_speed());
        }
        let b = &w.bodies()[0];
        assert!(b.position.y > 0.4 && b.position.y < 0.6, "y = {}", b.position.y);
        assert_eq!(w.anomalies(), 0);
    }

    #[test]
    fn flat_cube_stays_in_contact() {
        let mut w = world();
        w.add_body(body(0, DieType::D6, Point3::new(0.0, 0.5, 0.0)));
        for step in 0..120 {
            w.substep();
            let b = &w.bodies()[0];
            assert!(b.linear_speed() < 1e-3, "step {step}: v = {}", b.linear_speed());
            assert!((b.position.y - 0.5).abs() < 0.01, "step {step}: y = {}", b.position.y);
        }
    }

    #[test]
    fn hovering_cube_lands_without_bouncing() {
        let mut w = world();
        // just inside the contact margin, above the floor
        w.add_body(body(0, DieType::D6, Point3::new(0.0, 0.51, 0.0)));
        for _ in 0..30 {
            w.substep();
        }
        let b = &w.bodies()[0];
        assert!(b.linear_speed() < 1e-3, "v = {}", b.linear_speed());
        assert!(b.position.y <= 0.5 + 1e-3, "y = {}", b.position.y);
        assert!(b.position.y > 0.49, "y = {}", b.position.y);
    }

    #[test]
    fn sphere_rests_at_its_radius() {
        let mut w = world();
        w.add_body(body(0, DieType::D20, Point3::new(1.0, 3.0, 1.0)));
        for _ in 0..600 {
            w.substep();
        }
        let b = &w.bodies()[0];
        assert!((b.position.y - 0.7).abs() < 0.05, "y = {}", b.position.y);
        assert!(b.linear_speed() < 0.05);
    }

    #[test]
    fn walls_keep_bodies_inside() {
        let mut w = world();
        let mut b = body(0, DieType::D8, Point3::new(0.0, 0.6, 0.0));
        b.velocity = Vector3::new(40.0, 0.0, 0.0);
        w.add_body(b);
        for _ in 0..120 {
            w.substep();
            assert!(w.bodies()[0].position.x < w.arena().half_width + 0.5);
        }
    }

    #[test]
    fn overlapping_bodies_are_pushed_apart() {
        let mut w = world();
        w.add_body(body(0, DieType::D12, Point3::new(0.0, 0.65, 0.0)));
        w.add_body(body(1, DieType::D12, Point3::new(0.3, 0.65, 0.0)));
        for _ in 0..60 {
            w.substep();
        }
        let d = (w.bodies()[1].position - w.bodies()[0].position).norm();
        assert!(d > 1.0, "distance {d}");
    }

    #[test]
    fn nan_body_is_reset_and_counted() {
        let mut w = world();
        let mut b = body(0, DieType::D6, Point3::new(0.0, 1.0, 0.0));
        b.velocity = Vector3::new(Real::NAN, 0.0, 0.0);
        w.add_body(b);
        w.substep();
        let b = &w.bodies()[0];
        assert_eq!(w.anomalies(), 1);
        assert!(b.position.coords.iter().all(|v| v.is_finite()));
        assert_eq!(b.velocity, Vector3::zeros());
        assert_eq!(b.position.y, 0.5);
    }

    #[test]
    fn escaped_body_is_returned_to_the_arena() {
        let mut w = world();
        w.add_body(body(0, DieType::D4, Point3::new(0.0, -100.0, 0.0)));
        w.substep();
        assert_eq!(w.anomalies(), 1);
        assert!((w.bodies()[0].position.y - 0.55).abs() < 1e-6);
    }

    #[test]
    fn clear_drops_bodies() {
        let mut w = world();
        w.add_body(body(0, DieType::D6, Point3::new(0.0, 1.0, 0.0)));
        w.clear();
        assert!(w.bodies().is_empty());
        assert!(w.snapshot().is_empty());
    }

    #[test]
    fn snapshot_mirrors_bodies() {
        let mut w = world();
        w.add_body(body(7, DieType::D10, Point3::new(1.0, 2.0, 3.0)));
        let snap = w.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].body_id, 7);
        assert_eq!(snap[0].die_type, DieType::D10);
        assert_eq!(snap[0].position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn plane_contact_merges_corners() {
        let mut b = body(0, DieType::D6, Point3::new(0.0, 0.45, 0.0));
        b.orientation = UnitQuaternion::identity();
        let (point, depth, support) =
            plane_contact(&b, &Arena::default().floor, 0.0).expect("contact");
        assert!((depth - 0.05).abs() < 1e-5);
        assert_eq!(support, 4);
        // four bottom corners average to the face center
        assert!(point.x.abs() < 1e-5 && point.z.abs() < 1e-5);
    }
}
