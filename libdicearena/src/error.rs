//! Error types surfaced to the host.

use thiserror::Error;

use crate::catalog::DieType;
use crate::session::SessionStatus;
use crate::table::SessionHandle;

/// Everything that can go wrong at the session boundary.
///
/// Numeric trouble inside the integrator is never reported here; the world
/// recovers those locally (see [`crate::world::World::anomalies`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    /// Identifier outside the fixed catalog.
    #[error("unknown die type: {0}")]
    UnknownDieType(String),

    /// Per-type count above the configured cap.
    #[error("too many {die} dice: requested {count}, cap is {cap}")]
    TooManyDice { die: DieType, count: u32, cap: u32 },

    /// Dice expression that could not be parsed (e.g. `2x6`, `d`).
    #[error("invalid dice notation: {0}")]
    InvalidNotation(String),

    /// A result was requested before the roll resolved, or after a cancel.
    #[error("roll has not resolved")]
    NotResolved,

    /// Operation not valid in the session's current state.
    #[error("cannot {operation} while session is {status}")]
    InvalidState {
        status: SessionStatus,
        operation: &'static str,
    },

    /// Host override that would stall or break the simulation.
    #[error("invalid tunables: {0}")]
    InvalidTunables(String),

    /// Handle does not refer to the table's current session.
    #[error("unknown session {0}")]
    UnknownSession(SessionHandle),
}

pub type Result<T, E = RollError> = std::result::Result<T, E>;
