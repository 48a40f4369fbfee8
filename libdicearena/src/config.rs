//! Named tunables the host may override when building a table.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollError};
use crate::Real;

pub const STANDARD_GRAVITY: Real = 9.81;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Downward acceleration. Stronger than earth gravity to keep rolls short.
    pub gravity: Real,
    /// Fraction of velocity lost per second.
    pub linear_damping: Real,
    pub angular_damping: Real,
    /// Spin decay applied to bodies touching the floor.
    pub rolling_resistance: Real,
    pub restitution: Real,
    pub friction: Real,
    /// Approach speed below which contacts do not bounce.
    pub restitution_threshold: Real,
    /// Fraction of penetration removed per contact per sub-step.
    pub position_correction: Real,
    /// Penetration tolerated without correction.
    pub penetration_slop: Real,
    /// Corners this close to a plane already count as touching it.
    pub contact_margin: Real,

    pub fixed_step: Real,
    pub max_frame_delta: Real,
    pub max_substeps: u32,

    pub settle_linear_speed: Real,
    pub settle_angular_speed: Real,
    /// Consecutive stable frames needed to settle.
    pub settle_window: u32,
    /// Simulated seconds after which resolution is forced.
    pub settle_ceiling: Real,

    pub max_dice_per_type: u32,

    pub arena: ArenaParams,
    pub throw: ThrowParams,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY * 2.5,
            linear_damping: 0.1,
            angular_damping: 0.1,
            rolling_resistance: 1.0,
            restitution: 0.3,
            friction: 0.5,
            restitution_threshold: 1.0,
            position_correction: 0.8,
            penetration_slop: 0.005,
            contact_margin: 0.02,
            fixed_step: 1.0 / 60.0,
            max_frame_delta: 1.0 / 20.0,
            max_substeps: 3,
            settle_linear_speed: 0.05,
            settle_angular_speed: 0.1,
            settle_window: 60,
            settle_ceiling: 10.0,
            max_dice_per_type: 20,
            arena: ArenaParams::default(),
            throw: ThrowParams::default(),
        }
    }
}

impl Tunables {
    /// Rejects values that would stall the simulation clock or produce
    /// non-finite state.
    pub fn validate(&self) -> Result<()> {
        let reals = [
            ("gravity", self.gravity),
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
            ("rolling_resistance", self.rolling_resistance),
            ("restitution", self.restitution),
            ("friction", self.friction),
            ("restitution_threshold", self.restitution_threshold),
            ("position_correction", self.position_correction),
            ("penetration_slop", self.penetration_slop),
            ("contact_margin", self.contact_margin),
            ("settle_linear_speed", self.settle_linear_speed),
            ("settle_angular_speed", self.settle_angular_speed),
        ];
        for (name, value) in reals {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, value));
            }
        }

        let positive = [
            ("fixed_step", self.fixed_step),
            ("max_frame_delta", self.max_frame_delta),
            ("settle_ceiling", self.settle_ceiling),
            ("arena.half_width", self.arena.half_width),
            ("arena.half_depth", self.arena.half_depth),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(name, value));
            }
        }

        if self.max_substeps == 0 {
            return Err(RollError::InvalidTunables("max_substeps must be at least 1".into()));
        }
        if self.settle_window == 0 {
            return Err(RollError::InvalidTunables("settle_window must be at least 1".into()));
        }
        self.throw.validate()
    }
}

fn invalid(name: &str, value: Real) -> RollError {
    RollError::InvalidTunables(format!("{name} = {value}"))
}

/// Rectangular play area centered on the origin, floor at y = 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaParams {
    pub half_width: Real,
    pub half_depth: Real,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            half_width: 5.0,
            half_depth: 4.0,
        }
    }
}

/// Ranges the throw parameterizer samples from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowParams {
    /// Spawn height band above the floor.
    pub height_min: Real,
    pub height_max: Real,
    /// Spawn strip sits this far inside the arena's +Z wall.
    pub edge_inset: Real,
    /// Horizontal jitter added to each spawn point.
    pub jitter: Real,
    pub speed_min: Real,
    pub speed_max: Real,
    pub downward_bias: Real,
    pub vertical_jitter: Real,
    /// Per-axis angular speed range, rad/s.
    pub spin: Real,
}

impl ThrowParams {
    fn validate(&self) -> Result<()> {
        let ranges = [
            ("throw.height", self.height_min, self.height_max),
            ("throw.speed", self.speed_min, self.speed_max),
        ];
        for (name, lo, hi) in ranges {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(RollError::InvalidTunables(format!("{name} range {lo}..{hi}")));
            }
        }
        let reals = [
            ("throw.edge_inset", self.edge_inset),
            ("throw.jitter", self.jitter),
            ("throw.downward_bias", self.downward_bias),
            ("throw.vertical_jitter", self.vertical_jitter),
            ("throw.spin", self.spin),
        ];
        for (name, value) in reals {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, value));
            }
        }
        Ok(())
    }
}

impl Default for ThrowParams {
    fn default() -> Self {
        Self {
            height_min: 3.0,
            height_max: 5.0,
            edge_inset: 1.0,
            jitter: 0.3,
            speed_min: 4.0,
            speed_max: 8.0,
            downward_bias: 2.0,
            vertical_jitter: 1.0,
            spin: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let t = Tunables::default();
        assert!((t.gravity - 24.525).abs() < 1e-3);
        assert_eq!(t.settle_window, 60);
        assert_eq!(t.max_dice_per_type, 20);
        assert_eq!(t.settle_ceiling, 10.0);
        assert_eq!(t.contact_margin, 0.02);
        assert!(t.max_frame_delta >= t.fixed_step);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Tunables::default().validate(), Ok(()));
    }

    #[test]
    fn stalled_clock_is_rejected() {
        let cases = [
            Tunables {
                max_substeps: 0,
                ..Tunables::default()
            },
            Tunables {
                fixed_step: 0.0,
                ..Tunables::default()
            },
            Tunables {
                fixed_step: -1.0 / 60.0,
                ..Tunables::default()
            },
            Tunables {
                max_frame_delta: 0.0,
                ..Tunables::default()
            },
            Tunables {
                settle_ceiling: Real::NAN,
                ..Tunables::default()
            },
            Tunables {
                settle_window: 0,
                ..Tunables::default()
            },
        ];
        for t in cases {
            assert!(
                matches!(t.validate(), Err(RollError::InvalidTunables(_))),
                "{t:?}"
            );
        }
    }

    #[test]
    fn non_finite_physics_is_rejected() {
        let t = Tunables {
            gravity: Real::INFINITY,
            ..Tunables::default()
        };
        assert_eq!(
            t.validate(),
            Err(RollError::InvalidTunables("gravity = inf".into()))
        );
        let t = Tunables {
            throw: ThrowParams {
                speed_min: 9.0,
                speed_max: 2.0,
                ..ThrowParams::default()
            },
            ..Tunables::default()
        };
        assert!(matches!(t.validate(), Err(RollError::InvalidTunables(_))));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let t: Tunables =
            serde_json::from_str(r#"{ "max_dice_per_type": 5, "arena": { "half_width": 3.0 } }"#)
                .expect("parse tunables");
        assert_eq!(t.max_dice_per_type, 5);
        assert_eq!(t.arena.half_width, 3.0);
        assert_eq!(t.arena.half_depth, ArenaParams::default().half_depth);
        assert_eq!(t.friction, Tunables::default().friction);
    }
}
