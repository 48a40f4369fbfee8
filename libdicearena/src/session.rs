//! Roll session: the state machine tying throw, world, settle detection and
//! resolution together.
//!
//! ```text
//! Idle -> Rolling <-> Settling -> Resolved
//!            \           /
//!             Cancelled
//! ```

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Tunables;
use crate::error::{Result, RollError};
use crate::outcome::{resolve, RollResult};
use crate::request::RollRequest;
use crate::settle::{SettleDetector, Verdict};
use crate::throw::throw_dice;
use crate::world::{Arena, BodySnapshot, World};
use crate::Real;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Rolling,
    /// Every die is below the motion thresholds; waiting out the window.
    Settling,
    Resolved,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Resolved | SessionStatus::Cancelled)
    }

    pub fn is_live(self) -> bool {
        matches!(self, SessionStatus::Rolling | SessionStatus::Settling)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Rolling => "rolling",
            SessionStatus::Settling => "settling",
            SessionStatus::Resolved => "resolved",
            SessionStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One roll from request to result. Callers serialize access; every
/// operation takes `&mut self` and none of them block.
pub struct RollSession {
    status: SessionStatus,
    tunables: Tunables,
    world: World,
    detector: SettleDetector,
    result: Option<RollResult>,
    final_poses: Vec<BodySnapshot>,
    forced: bool,
}

impl RollSession {
    pub fn new(arena: Arc<Arena>, tunables: &Tunables) -> Self {
        Self {
            status: SessionStatus::Idle,
            tunables: tunables.clone(),
            world: World::new(arena, tunables),
            detector: SettleDetector::new(tunables),
            result: None,
            final_poses: Vec::new(),
            forced: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Validate the tunables and the request, then throw the dice. On error
    /// nothing is created and the session stays idle. An empty request
    /// resolves immediately.
    pub fn start<R: Rng + ?Sized>(&mut self, request: &RollRequest, rng: &mut R) -> Result<SessionStatus> {
        if self.status != SessionStatus::Idle {
            return Err(RollError::InvalidState {
                status: self.status,
                operation: "start",
            });
        }
        self.tunables.validate()?;
        request.validate(self.tunables.max_dice_per_type)?;

        if request.is_empty() {
            self.result = Some(RollResult::default());
            self.status = SessionStatus::Resolved;
            debug!("empty roll resolved immediately");
            return Ok(self.status);
        }

        for body in throw_dice(request, self.world.arena(), &self.tunables.throw, rng) {
            self.world.add_body(body);
        }
        self.status = SessionStatus::Rolling;
        Ok(self.status)
    }

    /// Advance the simulation by one rendered frame.
    pub fn tick<R: Rng + ?Sized>(&mut self, frame_delta: Real, rng: &mut R) -> Result<SessionStatus> {
        match self.status {
            SessionStatus::Idle => {
                return Err(RollError::InvalidState {
                    status: self.status,
                    operation: "tick",
                })
            }
            SessionStatus::Resolved | SessionStatus::Cancelled => return Ok(self.status),
            SessionStatus::Rolling | SessionStatus::Settling => {}
        }

        let substeps = self.world.plan_substeps(frame_delta);
        for _ in 0..substeps {
            self.world.substep();
            let verdict = self.detector.observe(self.world.bodies(), self.world.elapsed());
            if verdict.is_final() {
                self.finish(verdict, rng);
                break;
            }
            self.status = match verdict {
                Verdict::Calming => SessionStatus::Settling,
                _ => SessionStatus::Rolling,
            };
        }
        Ok(self.status)
    }

    fn finish<R: Rng + ?Sized>(&mut self, verdict: Verdict, rng: &mut R) {
        self.status = SessionStatus::Settling;
        self.forced = verdict == Verdict::Forced;
        if self.forced {
            warn!(
                elapsed = self.world.elapsed(),
                dice = self.world.bodies().len(),
                "dice did not settle, forcing resolution"
            );
        }
        let result = resolve(self.world.bodies(), rng);
        debug!(
            total = result.total,
            elapsed = self.world.elapsed(),
            anomalies = self.world.anomalies(),
            "roll resolved"
        );
        self.final_poses = self.world.snapshot();
        self.world.clear();
        self.result = Some(result);
        self.status = SessionStatus::Resolved;
    }

    /// Abandon an in-flight roll. No result is ever produced afterwards.
    /// Does nothing in any other state.
    pub fn cancel(&mut self) -> SessionStatus {
        if self.status.is_live() {
            debug!(dice = self.world.bodies().len(), "roll cancelled");
            self.world.clear();
            self.detector.reset();
            self.status = SessionStatus::Cancelled;
        }
        self.status
    }

    pub fn result(&self) -> Result<&RollResult> {
        match (&self.result, self.status) {
            (Some(result), SessionStatus::Resolved) => Ok(result),
            _ => Err(RollError::NotResolved),
        }
    }

    /// Current transforms; the final resting poses once resolved.
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        match self.status {
            SessionStatus::Resolved => self.final_poses.clone(),
            _ => self.world.snapshot(),
        }
    }

    /// Bodies still owned by the simulation.
    pub fn live_bodies(&self) -> usize {
        self.world.bodies().len()
    }

    pub fn simulated_time(&self) -> Real {
        self.world.elapsed()
    }

    pub fn anomalies(&self) -> u32 {
        self.world.anomalies()
    }

    /// Whether resolution came from the settle ceiling rather than rest.
    pub fn forced(&self) -> bool {
        self.forced
    }

    pub fn stable_frames(&self) -> u32 {
        self.detector.stable_frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DieType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Real = 1.0 / 60.0;

    fn session() -> RollSession {
        RollSession::new(Arc::new(Arena::default()), &Tunables::default())
    }

    fn run(session: &mut RollSession, rng: &mut StdRng) -> SessionStatus {
        // 15 simulated seconds, beyond the default ceiling
        for _ in 0..900 {
            let status = session.tick(FRAME, rng).expect("tick");
            if status.is_terminal() {
                return status;
            }
        }
        session.status()
    }

    #[test]
    fn starts_idle() {
        let s = session();
        assert_eq!(s.status(), SessionStatus::Idle);
        assert_eq!(s.result(), Err(RollError::NotResolved));
        assert!(s.snapshot().is_empty());
    }

    #[test]
    fn tick_before_start_is_rejected() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            s.tick(FRAME, &mut rng),
            Err(RollError::InvalidState {
                status: SessionStatus::Idle,
                operation: "tick"
            })
        );
    }

    #[test]
    fn invalid_request_leaves_session_idle() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(0);
        let err = s
            .start(&RollRequest::new().with(DieType::D20, 25), &mut rng)
            .unwrap_err();
        assert!(matches!(err, RollError::TooManyDice { count: 25, .. }));
        assert_eq!(s.status(), SessionStatus::Idle);
        assert_eq!(s.live_bodies(), 0);
    }

    #[test]
    fn empty_request_resolves_immediately() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            s.start(&RollRequest::new(), &mut rng),
            Ok(SessionStatus::Resolved)
        );
        let result = s.result().expect("resolved");
        assert_eq!(result.total, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(0);
        s.start(&RollRequest::new().with(DieType::D6, 1), &mut rng)
            .expect("start");
        assert!(matches!(
            s.start(&RollRequest::new().with(DieType::D6, 1), &mut rng),
            Err(RollError::InvalidState { operation: "start", .. })
        ));
    }

    #[test]
    fn roll_resolves_and_releases_bodies() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(11);
        s.start(&RollRequest::new().with(DieType::D6, 2), &mut rng)
            .expect("start");
        assert_eq!(s.live_bodies(), 2);
        assert_eq!(run(&mut s, &mut rng), SessionStatus::Resolved);
        assert!(s.simulated_time() <= 10.0 + FRAME);
        assert_eq!(s.live_bodies(), 0);
        let result = s.result().expect("resolved");
        assert_eq!(result.values(DieType::D6).len(), 2);
        assert_eq!(s.snapshot().len(), 2);
        // further ticks are no-ops
        let again = s.result().expect("resolved").clone();
        assert_eq!(s.tick(FRAME, &mut rng), Ok(SessionStatus::Resolved));
        assert_eq!(s.result(), Ok(&again));
    }

    #[test]
    fn cancel_discards_everything() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(3);
        s.start(&RollRequest::new().with(DieType::D12, 4), &mut rng)
            .expect("start");
        s.tick(FRAME, &mut rng).expect("tick");
        assert_eq!(s.cancel(), SessionStatus::Cancelled);
        assert_eq!(s.live_bodies(), 0);
        assert!(s.snapshot().is_empty());
        assert_eq!(s.result(), Err(RollError::NotResolved));
        // terminal: ticking and cancelling again change nothing
        assert_eq!(s.tick(FRAME, &mut rng), Ok(SessionStatus::Cancelled));
        assert_eq!(s.cancel(), SessionStatus::Cancelled);
    }

    #[test]
    fn cancel_after_resolve_keeps_result() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(0);
        s.start(&RollRequest::new(), &mut rng).expect("start");
        assert_eq!(s.cancel(), SessionStatus::Resolved);
        assert!(s.result().is_ok());
    }

    #[test]
    fn ceiling_forces_resolution() {
        let tunables = Tunables {
            settle_ceiling: 0.5,
            settle_window: 10_000,
            ..Tunables::default()
        };
        let mut s = RollSession::new(Arc::new(Arena::default()), &tunables);
        let mut rng = StdRng::seed_from_u64(8);
        s.start(&RollRequest::new().with(DieType::D20, 3), &mut rng)
            .expect("start");
        assert_eq!(run(&mut s, &mut rng), SessionStatus::Resolved);
        assert!(s.forced());
        assert!(s.simulated_time() < 0.6);
        assert_eq!(s.result().expect("resolved").values(DieType::D20).len(), 3);
    }

    #[test]
    fn invalid_tunables_leave_session_idle() {
        let tunables = Tunables {
            max_substeps: 0,
            ..Tunables::default()
        };
        let mut s = RollSession::new(Arc::new(Arena::default()), &tunables);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            s.start(&RollRequest::new().with(DieType::D6, 1), &mut rng),
            Err(RollError::InvalidTunables(_))
        ));
        assert_eq!(s.status(), SessionStatus::Idle);
        assert_eq!(s.live_bodies(), 0);
    }

    #[test]
    fn status_names() {
        assert_eq!(SessionStatus::Settling.to_string(), "settling");
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Idle.is_live());
    }
}
