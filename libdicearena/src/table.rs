//! The host-facing table: owns the arena, the random source and at most one
//! session at a time.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Tunables;
use crate::error::{Result, RollError};
use crate::outcome::RollResult;
use crate::request::RollRequest;
use crate::session::{RollSession, SessionStatus};
use crate::world::{Arena, BodySnapshot};
use crate::Real;

/// Opaque id of one roll on a table. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct DiceTable<R: Rng = StdRng> {
    tunables: Tunables,
    arena: Arc<Arena>,
    rng: R,
    current: Option<(SessionHandle, RollSession)>,
    next_handle: u64,
}

impl DiceTable<StdRng> {
    /// Table with an entropy-seeded random source.
    pub fn new(tunables: Tunables) -> Self {
        Self::with_rng(tunables, StdRng::from_entropy())
    }

    /// Reproducible table: same seed, same request, same frame deltas give the
    /// same rolls.
    pub fn seeded(tunables: Tunables, seed: u64) -> Self {
        Self::with_rng(tunables, StdRng::seed_from_u64(seed))
    }
}

impl Default for DiceTable<StdRng> {
    fn default() -> Self {
        Self::new(Tunables::default())
    }
}

impl<R: Rng> DiceTable<R> {
    pub fn with_rng(tunables: Tunables, rng: R) -> Self {
        let arena = Arc::new(Arena::new(&tunables.arena));
        Self {
            tunables,
            arena,
            rng,
            current: None,
            next_handle: 1,
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Start a new roll. Any roll still in flight is cancelled first. On a
    /// rejected request no session is created and the previous one is kept.
    pub fn begin_roll(&mut self, request: &RollRequest) -> Result<SessionHandle> {
        let mut session = RollSession::new(Arc::clone(&self.arena), &self.tunables);
        session.start(request, &mut self.rng)?;

        if let Some((old, mut previous)) = self.current.take() {
            if previous.status().is_live() {
                debug!(session = %old, "replacing roll in flight");
                previous.cancel();
            }
        }

        let handle = SessionHandle(self.next_handle);
        self.next_handle += 1;
        debug!(session = %handle, dice = request.total_dice(), "roll started");
        self.current = Some((handle, session));
        Ok(handle)
    }

    /// Advance the roll by one frame of wall-clock time.
    pub fn advance(&mut self, handle: SessionHandle, frame_delta: Real) -> Result<SessionStatus> {
        let rng = &mut self.rng;
        match self.current.as_mut() {
            Some((h, session)) if *h == handle => session.tick(frame_delta, rng),
            _ => Err(RollError::UnknownSession(handle)),
        }
    }

    pub fn snapshot(&self, handle: SessionHandle) -> Result<Vec<BodySnapshot>> {
        Ok(self.session(handle)?.snapshot())
    }

    /// Cancel a roll. Stale handles and finished rolls are ignored.
    pub fn cancel(&mut self, handle: SessionHandle) {
        if let Some((h, session)) = self.current.as_mut() {
            if *h == handle {
                session.cancel();
            }
        }
    }

    pub fn get_result(&self, handle: SessionHandle) -> Result<RollResult> {
        self.session(handle)?.result().cloned()
    }

    pub fn status(&self, handle: SessionHandle) -> Result<SessionStatus> {
        Ok(self.session(handle)?.status())
    }

    /// Read-only view of a session for diagnostics.
    pub fn session(&self, handle: SessionHandle) -> Result<&RollSession> {
        match &self.current {
            Some((h, session)) if *h == handle => Ok(session),
            _ => Err(RollError::UnknownSession(handle)),
        }
    }

    /// Begin a roll and drive it to completion at a fixed frame rate. For
    /// headless hosts; a delta shorter than one fixed step is raised to it.
    /// Tunables that could never settle are rejected by `begin_roll`.
    pub fn roll(&mut self, request: &RollRequest, frame_delta: Real) -> Result<RollResult> {
        let delta = if frame_delta.is_finite() {
            frame_delta.max(self.tunables.fixed_step)
        } else {
            self.tunables.fixed_step
        };
        let handle = self.begin_roll(request)?;
        while !self.advance(handle, delta)?.is_terminal() {}
        self.get_result(handle)
    }
}
