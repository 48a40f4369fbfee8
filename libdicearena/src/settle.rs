//! Settling detector: declares a roll at rest once every body has stayed
//! below the motion thresholds for a run of consecutive frames.

use crate::config::Tunables;
use crate::world::RigidBody;
use crate::Real;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Something is still moving.
    Moving,
    /// Everything is quiet, but not yet for the full window.
    Calming,
    Settled,
    /// The settle ceiling was reached without settling.
    Forced,
}

impl Verdict {
    pub fn is_final(self) -> bool {
        matches!(self, Verdict::Settled | Verdict::Forced)
    }
}

#[derive(Clone, Debug)]
pub struct SettleDetector {
    linear_threshold: Real,
    angular_threshold: Real,
    window: u32,
    ceiling: Real,
    stable_frames: u32,
}

impl SettleDetector {
    pub fn new(params: &Tunables) -> Self {
        Self {
            linear_threshold: params.settle_linear_speed,
            angular_threshold: params.settle_angular_speed,
            window: params.settle_window.max(1),
            ceiling: params.settle_ceiling,
            stable_frames: 0,
        }
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    /// Feed one simulation frame. `elapsed` is total simulated time.
    pub fn observe(&mut self, bodies: &[RigidBody], elapsed: Real) -> Verdict {
        let quiet = bodies.iter().all(|b| {
            b.linear_speed() < self.linear_threshold && b.angular_speed() < self.angular_threshold
        });
        if quiet {
            self.stable_frames = self.stable_frames.saturating_add(1);
        } else {
            self.stable_frames = 0;
        }

        if self.stable_frames >= self.window {
            Verdict::Settled
        } else if elapsed >= self.ceiling {
            Verdict::Forced
        } else if self.stable_frames > 0 {
            Verdict::Calming
        } else {
            Verdict::Moving
        }
    }

    pub fn reset(&mut self) {
        self.stable_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{spec_for, DieType};
    use crate::world::{Arena, BodySlot, World};
    use nalgebra::{Point3, Vector3};
    use std::sync::Arc;

    fn detector(window: u32) -> SettleDetector {
        SettleDetector::new(&Tunables {
            settle_window: window,
            ..Tunables::default()
        })
    }

    fn body(speed: Real, spin: Real) -> RigidBody {
        let mut b = RigidBody::new(
            0,
            BodySlot {
                die_type: DieType::D6,
                ordinal: 0,
            },
            spec_for(DieType::D6),
        );
        b.velocity = Vector3::new(speed, 0.0, 0.0);
        b.angular_velocity = Vector3::new(0.0, spin, 0.0);
        b
    }

    #[test]
    fn settles_after_full_window() {
        let mut d = detector(3);
        let still = [body(0.0, 0.0), body(0.01, 0.05)];
        assert_eq!(d.observe(&still, 0.1), Verdict::Calming);
        assert_eq!(d.observe(&still, 0.2), Verdict::Calming);
        assert_eq!(d.observe(&still, 0.3), Verdict::Settled);
    }

    #[test]
    fn any_motion_resets_the_counter() {
        let mut d = detector(3);
        let still = [body(0.0, 0.0)];
        d.observe(&still, 0.0);
        d.observe(&still, 0.0);
        assert_eq!(d.stable_frames(), 2);
        // angular speed alone breaks the streak
        assert_eq!(d.observe(&[body(0.0, 0.5)], 0.0), Verdict::Moving);
        assert_eq!(d.stable_frames(), 0);
        assert_eq!(d.observe(&still, 0.0), Verdict::Calming);
        assert_eq!(d.observe(&[body(0.2, 0.0)], 0.0), Verdict::Moving);
    }

    #[test]
    fn one_moving_body_keeps_the_roll_alive() {
        let mut d = detector(1);
        assert_eq!(d.observe(&[body(0.0, 0.0), body(1.0, 0.0)], 0.0), Verdict::Moving);
    }

    #[test]
    fn ceiling_forces_resolution() {
        let mut d = detector(60);
        assert_eq!(d.observe(&[body(5.0, 5.0)], 9.99), Verdict::Moving);
        assert_eq!(d.observe(&[body(5.0, 5.0)], 10.0), Verdict::Forced);
    }

    #[test]
    fn resting_cube_settles_within_one_window() {
        let params = Tunables::default();
        let mut world = World::new(Arc::new(Arena::default()), &params);
        let mut cube = body(0.0, 0.0);
        cube.position = Point3::new(0.0, 0.5, 0.0);
        world.add_body(cube);
        let mut d = SettleDetector::new(&params);
        let mut verdict = Verdict::Moving;
        for frame in 0..params.settle_window {
            world.substep();
            verdict = d.observe(world.bodies(), world.elapsed());
            assert_ne!(verdict, Verdict::Moving, "frame {frame}");
        }
        assert_eq!(verdict, Verdict::Settled);
        assert!(verdict.is_final());
    }

    #[test]
    fn dropped_cube_settles_before_the_ceiling() {
        let params = Tunables::default();
        let mut world = World::new(Arc::new(Arena::default()), &params);
        let mut cube = body(0.0, 0.0);
        cube.position = Point3::new(0.5, 2.0, -0.5);
        cube.angular_velocity = Vector3::new(4.0, -2.0, 1.0);
        world.add_body(cube);
        let mut d = SettleDetector::new(&params);
        let verdict = loop {
            world.substep();
            let v = d.observe(world.bodies(), world.elapsed());
            if v.is_final() {
                break v;
            }
        };
        assert_eq!(verdict, Verdict::Settled);
        assert!(world.elapsed() < params.settle_ceiling);
    }

    #[test]
    fn no_bodies_is_quiet() {
        let mut d = detector(1);
        assert_eq!(d.observe(&[], 0.0), Verdict::Settled);
    }
}
