//! Throw parameterizer: initial state for every requested die so the dice
//! enter the arena looking thrown rather than dropped in place.

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use rand::Rng;
use tracing::debug;

use crate::catalog::spec_for;
use crate::config::ThrowParams;
use crate::request::RollRequest;
use crate::world::{Arena, BodySlot, RigidBody};
use crate::Real;

/// Creates one body per requested die, in catalog order and then by ordinal.
/// Body ids are their index in the returned vector.
pub fn throw_dice<R: Rng + ?Sized>(
    request: &RollRequest,
    arena: &Arena,
    params: &ThrowParams,
    rng: &mut R,
) -> Vec<RigidBody> {
    let mut bodies = Vec::with_capacity(request.total_dice() as usize);
    for (die_type, count) in request.iter() {
        let spec = spec_for(die_type);
        for ordinal in 0..count {
            let mut body = RigidBody::new(bodies.len(), BodySlot { die_type, ordinal }, spec);
            launch(&mut body, arena, params, rng);
            bodies.push(body);
        }
    }
    debug!(dice = bodies.len(), "dice thrown");
    bodies
}

/// Randomize one body's pose and velocities.
fn launch<R: Rng + ?Sized>(
    body: &mut RigidBody,
    arena: &Arena,
    params: &ThrowParams,
    rng: &mut R,
) {
    // spawn strip along the +Z wall, kept clear of the side walls
    let radius = body.collider().bounding_radius();
    let strip = (arena.half_width - params.edge_inset - radius).max(0.0);
    let z0 = (arena.half_depth - params.edge_inset - radius).max(0.0);
    let px = sample(rng, -strip, strip) + sample(rng, -params.jitter, params.jitter);
    let pz = z0 + sample(rng, -params.jitter, params.jitter);
    let py = sample(rng, params.height_min, params.height_max).max(radius);
    body.position = Point3::new(px, py, pz);

    body.orientation = random_unit_quaternion(rng);

    // horizontal velocity toward the arena center
    let mut toward = arena.center() - body.position;
    toward.y = 0.0;
    let dir = if toward.norm_squared() > 1e-8 {
        toward.normalize()
    } else {
        -Vector3::z()
    };
    let speed = sample(rng, params.speed_min, params.speed_max);
    let vy = -params.downward_bias + sample(rng, -params.vertical_jitter, params.vertical_jitter);
    body.velocity = Vector3::new(dir.x * speed, vy, dir.z * speed);

    body.angular_velocity = Vector3::new(
        sample(rng, -params.spin, params.spin),
        sample(rng, -params.spin, params.spin),
        sample(rng, -params.spin, params.spin),
    );
}

/// Uniform in `[lo, hi)`, or `lo` for an empty range.
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: Real, hi: Real) -> Real {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Uniformly distributed rotation (Shoemake's method).
pub fn random_unit_quaternion<R: Rng + ?Sized>(rng: &mut R) -> UnitQuaternion<Real> {
    let u1: Real = rng.gen();
    let u2: Real = rng.gen();
    let u3: Real = rng.gen();
    let q1 = (1.0 - u1).sqrt();
    let q2 = u1.sqrt();
    let theta1 = std::f32::consts::TAU * u2;
    let theta2 = std::f32::consts::TAU * u3;
    UnitQuaternion::from_quaternion(Quaternion::new(
        q1 * theta1.cos(),
        q1 * theta1.sin(),
        q2 * theta2.cos(),
        q2 * theta2.sin(),
    ))
}
