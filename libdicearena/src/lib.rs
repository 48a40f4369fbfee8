//! libdicearena: physical dice throws in a walled arena.
//!
//! - Fixed catalog of d4, d6, d8, d10, d12, d20 and d100
//! - Semi-implicit integration at a fixed sub-step, impulse contact solver,
//!   Coulomb friction, rolling resistance
//! - Settle detection over a window of quiet frames, with a time ceiling
//! - Face-up determination for box and hull colliders
//!
//! Public API:
//! - `RollRequest`: die type -> count, also parsed from notation like `"2d6 d20"`
//! - `DiceTable::begin_roll`, `advance` once per frame, `snapshot` for rendering,
//!   `get_result` once resolved, `cancel` at any point
//!
//! Example:
//! let mut table = DiceTable::seeded(Tunables::default(), 7);
//! let handle = table.begin_roll(&"2d6".parse()?)?;
//! while !table.advance(handle, 1.0 / 60.0)?.is_terminal() {}
//! let total = table.get_result(handle)?.total;

pub use nalgebra::{Point3, UnitQuaternion, Vector3};

pub type Real = f32;
pub(crate) const EPS: Real = 1e-6;

pub mod catalog;
pub mod config;
pub mod error;
pub mod outcome;
pub mod request;
pub mod session;
pub mod settle;
pub mod table;
pub mod throw;
pub mod world;

pub use catalog::{spec_for, Collider, DieSpec, DieType, FaceNormal, RenderGeometryId};
pub use config::{ArenaParams, ThrowParams, Tunables};
pub use error::{Result, RollError};
pub use outcome::{DieGroup, RollResult};
pub use request::{parse_dice_notation, RollRequest};
pub use session::{RollSession, SessionStatus};
pub use table::{DiceTable, SessionHandle};
pub use world::{Arena, BodySnapshot};
