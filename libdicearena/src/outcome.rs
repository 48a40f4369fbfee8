//! Outcome resolver: the value each settled die shows, plus per-type and
//! grand totals.
//!
//! Dice whose collider is a real solid (box or hull) are read geometrically:
//! the face whose normal points most upward wins. Sphere-approximated dice
//! have no meaningful resting face, so their value is drawn uniformly from
//! `1..=sides` with the session's random source. How such a die looks at rest
//! is therefore unrelated to what it rolled; hosts wanting the two to agree
//! must give the die a hull collider.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::DieType;
use crate::world::RigidBody;

/// Values rolled for one die type, in body-creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieGroup {
    pub values: Vec<u32>,
    pub subtotal: u32,
}

/// Final, immutable summary of one roll.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub groups: BTreeMap<DieType, DieGroup>,
    pub total: u32,
}

impl RollResult {
    /// Aggregate individual values, keeping their order within each type.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (DieType, u32)>,
    {
        let mut groups: BTreeMap<DieType, DieGroup> = BTreeMap::new();
        let mut total = 0;
        for (die, value) in values {
            let group = groups.entry(die).or_default();
            group.values.push(value);
            group.subtotal += value;
            total += value;
        }
        Self { groups, total }
    }

    pub fn values(&self, die: DieType) -> &[u32] {
        self.groups
            .get(&die)
            .map(|g| g.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn subtotal(&self, die: DieType) -> u32 {
        self.groups.get(&die).map_or(0, |g| g.subtotal)
    }

    pub fn dice_count(&self) -> usize {
        self.groups.values().map(|g| g.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Value shown by one settled body. Dice without a readable face draw
/// uniformly.
pub fn read_value<R: Rng + ?Sized>(body: &RigidBody, rng: &mut R) -> u32 {
    let spec = body.spec;
    let face = spec
        .collider
        .reads_pose()
        .then(|| spec.up_face(&body.orientation))
        .flatten();
    match face {
        Some(face) => face.value,
        None => rng.gen_range(1..=spec.sides),
    }
}

/// Resolve every body, in the order given.
pub fn resolve<R: Rng + ?Sized>(bodies: &[RigidBody], rng: &mut R) -> RollResult {
    RollResult::from_values(
        bodies
            .iter()
            .map(|b| (b.slot.die_type, read_value(b, rng))),
    )
}
