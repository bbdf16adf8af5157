//! Per-target interaction state machine.
//!
//! Pure transition function plus a thin session wrapper that owns the
//! timers. Phase transitions are computed from plain data; resolution and
//! reward side effects are returned to the caller, never applied here.

use skyrescue_core::enums::{InteractionPhase, ResolutionKind};
use skyrescue_core::tunables::MissionTunables;
use skyrescue_core::types::SurvivorId;

/// Input to the interaction FSM for one tick.
pub struct SessionContext<'a> {
    pub phase: InteractionPhase,
    /// Time accumulated in the current phase (seconds).
    pub elapsed_in_phase: f64,
    /// Time this target has been the active target (seconds).
    pub elapsed_on_target: f64,
    /// Horizontal distance from the drone to the target (meters).
    pub distance_to_target: f64,
    /// Frozen membership in the resource partition.
    pub is_resource_recipient: bool,
    pub tunables: &'a MissionTunables,
}

/// Output from the interaction FSM.
pub struct SessionUpdate {
    pub new_phase: InteractionPhase,
    pub phase_changed: bool,
    pub effect: Option<SessionEffect>,
}

/// Side effects the caller must apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEffect {
    /// Entered Signaling or DeliveringResource; worth the start reward.
    InteractionStarted { delivering: bool },
    /// Interaction completed; mark the target Resolved, emit the reward,
    /// and request the next target.
    Resolved { kind: ResolutionKind, reward: f64 },
    /// The per-target timeout expired without resolution: a
    /// Done-without-reward transition. The target returns to the pool.
    TimedOut,
}

/// Evaluate the FSM for one tick.
pub fn evaluate(ctx: &SessionContext) -> SessionUpdate {
    let no_change = SessionUpdate {
        new_phase: ctx.phase,
        phase_changed: false,
        effect: None,
    };
    let t = ctx.tunables;

    // Idle and Done wait for an assignment; no transitions here.
    if matches!(ctx.phase, InteractionPhase::Idle | InteractionPhase::Done) {
        return no_change;
    }

    // Per-target timeout overrides everything else. Prevents permanent
    // deadlock against an unreachable target.
    if ctx.elapsed_on_target > t.target_timeout_secs {
        return SessionUpdate {
            new_phase: InteractionPhase::Done,
            phase_changed: true,
            effect: Some(SessionEffect::TimedOut),
        };
    }

    match ctx.phase {
        InteractionPhase::Approaching => {
            if ctx.distance_to_target < t.interaction_distance {
                let delivering = ctx.is_resource_recipient;
                let new_phase = if delivering {
                    InteractionPhase::DeliveringResource
                } else {
                    InteractionPhase::Signaling
                };
                return SessionUpdate {
                    new_phase,
                    phase_changed: true,
                    effect: Some(SessionEffect::InteractionStarted { delivering }),
                };
            }
            no_change
        }
        InteractionPhase::Signaling => {
            if ctx.elapsed_in_phase >= t.signal_duration_secs {
                return SessionUpdate {
                    new_phase: InteractionPhase::Done,
                    phase_changed: true,
                    effect: Some(SessionEffect::Resolved {
                        kind: ResolutionKind::Signaled,
                        reward: t.signal_reward,
                    }),
                };
            }
            no_change
        }
        InteractionPhase::DeliveringResource => {
            if ctx.elapsed_in_phase >= t.delivery_duration_secs {
                return SessionUpdate {
                    new_phase: InteractionPhase::Done,
                    phase_changed: true,
                    effect: Some(SessionEffect::Resolved {
                        kind: ResolutionKind::Delivered,
                        reward: t.delivery_reward,
                    }),
                };
            }
            no_change
        }
        InteractionPhase::Idle | InteractionPhase::Done => no_change,
    }
}

/// The single interaction session, scoped to the current target.
///
/// Phase time is tracked as a tick count and converted with a single
/// multiplication, so fixed-duration transitions land on a deterministic
/// tick (no accumulated float drift).
#[derive(Debug, Default)]
pub struct InteractionSession {
    target: Option<SurvivorId>,
    phase: InteractionPhase,
    ticks_in_phase: u64,
    elapsed_in_phase: f64,
}

impl InteractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next target. Only legal from Idle or the transient Done
    /// phase — a target cannot be reassigned mid-session.
    pub fn assign(&mut self, id: SurvivorId) -> bool {
        if !matches!(self.phase, InteractionPhase::Idle | InteractionPhase::Done) {
            return false;
        }
        self.target = Some(id);
        self.phase = InteractionPhase::Approaching;
        self.ticks_in_phase = 0;
        self.elapsed_in_phase = 0.0;
        true
    }

    /// Drop the session back to Idle (resolution or abandonment).
    pub fn reset(&mut self) {
        self.target = None;
        self.phase = InteractionPhase::Idle;
        self.ticks_in_phase = 0;
        self.elapsed_in_phase = 0.0;
    }

    pub fn target(&self) -> Option<SurvivorId> {
        self.target
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn elapsed_in_phase(&self) -> f64 {
        self.elapsed_in_phase
    }

    /// True while a target occupies the session (including the transient
    /// Done tick before the next assignment).
    pub fn is_engaged(&self) -> bool {
        self.target.is_some()
    }

    /// Advance the session one tick and return any side effect.
    pub fn tick(
        &mut self,
        dt: f64,
        distance_to_target: f64,
        is_resource_recipient: bool,
        elapsed_on_target: f64,
        tunables: &MissionTunables,
    ) -> Option<SessionEffect> {
        if self.target.is_none() {
            return None;
        }
        self.ticks_in_phase += 1;
        self.elapsed_in_phase = self.ticks_in_phase as f64 * dt;

        let update = evaluate(&SessionContext {
            phase: self.phase,
            elapsed_in_phase: self.elapsed_in_phase,
            elapsed_on_target,
            distance_to_target,
            is_resource_recipient,
            tunables,
        });

        if update.phase_changed {
            self.phase = update.new_phase;
            self.ticks_in_phase = 0;
            self.elapsed_in_phase = 0.0;
        }
        update.effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyrescue_core::constants::DT;

    fn tunables() -> MissionTunables {
        MissionTunables::default()
    }

    fn ctx<'a>(
        phase: InteractionPhase,
        elapsed_in_phase: f64,
        distance: f64,
        recipient: bool,
        t: &'a MissionTunables,
    ) -> SessionContext<'a> {
        SessionContext {
            phase,
            elapsed_in_phase,
            elapsed_on_target: elapsed_in_phase,
            distance_to_target: distance,
            is_resource_recipient: recipient,
            tunables: t,
        }
    }

    #[test]
    fn test_approaching_holds_at_range() {
        let t = tunables();
        let update = evaluate(&ctx(InteractionPhase::Approaching, 1.0, 20.0, false, &t));
        assert!(!update.phase_changed);
        assert_eq!(update.new_phase, InteractionPhase::Approaching);
    }

    #[test]
    fn test_approaching_to_signaling_in_range() {
        let t = tunables();
        let update = evaluate(&ctx(InteractionPhase::Approaching, 1.0, 2.5, false, &t));
        assert!(update.phase_changed);
        assert_eq!(update.new_phase, InteractionPhase::Signaling);
        assert_eq!(
            update.effect,
            Some(SessionEffect::InteractionStarted { delivering: false })
        );
    }

    #[test]
    fn test_approaching_to_delivery_for_recipient() {
        let t = tunables();
        let update = evaluate(&ctx(InteractionPhase::Approaching, 1.0, 2.5, true, &t));
        assert!(update.phase_changed);
        assert_eq!(update.new_phase, InteractionPhase::DeliveringResource);
        assert_eq!(
            update.effect,
            Some(SessionEffect::InteractionStarted { delivering: true })
        );
    }

    #[test]
    fn test_signal_completes_after_duration() {
        let t = tunables();
        // Just short of the duration: still signaling.
        let update = evaluate(&ctx(
            InteractionPhase::Signaling,
            t.signal_duration_secs - 0.01,
            1.0,
            false,
            &t,
        ));
        assert!(!update.phase_changed);

        let update = evaluate(&ctx(
            InteractionPhase::Signaling,
            t.signal_duration_secs,
            1.0,
            false,
            &t,
        ));
        assert!(update.phase_changed);
        assert_eq!(update.new_phase, InteractionPhase::Done);
        assert_eq!(
            update.effect,
            Some(SessionEffect::Resolved {
                kind: ResolutionKind::Signaled,
                reward: t.signal_reward,
            })
        );
    }

    #[test]
    fn test_delivery_completes_with_larger_reward() {
        let t = tunables();
        let update = evaluate(&ctx(
            InteractionPhase::DeliveringResource,
            t.delivery_duration_secs,
            1.0,
            true,
            &t,
        ));
        match update.effect {
            Some(SessionEffect::Resolved { kind, reward }) => {
                assert_eq!(kind, ResolutionKind::Delivered);
                assert!(
                    reward > t.signal_reward,
                    "delivery reflects higher effort: {reward} vs {}",
                    t.signal_reward
                );
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_forces_abandon_from_any_phase() {
        let t = tunables();
        for phase in [
            InteractionPhase::Approaching,
            InteractionPhase::Signaling,
            InteractionPhase::DeliveringResource,
        ] {
            let update = evaluate(&SessionContext {
                phase,
                elapsed_in_phase: 0.5,
                elapsed_on_target: t.target_timeout_secs + 0.1,
                distance_to_target: 50.0,
                is_resource_recipient: false,
                tunables: &t,
            });
            assert_eq!(update.new_phase, InteractionPhase::Done);
            assert_eq!(update.effect, Some(SessionEffect::TimedOut));
        }
    }

    #[test]
    fn test_idle_and_done_have_no_transitions() {
        let t = tunables();
        for phase in [InteractionPhase::Idle, InteractionPhase::Done] {
            let update = evaluate(&ctx(phase, 100.0, 0.0, false, &t));
            assert!(!update.phase_changed);
            assert!(update.effect.is_none());
        }
    }

    #[test]
    fn test_session_guards_reassignment() {
        let mut session = InteractionSession::new();
        assert!(session.assign(SurvivorId(1)));
        assert_eq!(session.phase(), InteractionPhase::Approaching);
        // Mid-session reassignment is rejected.
        assert!(!session.assign(SurvivorId(2)));
        assert_eq!(session.target(), Some(SurvivorId(1)));
    }

    #[test]
    fn test_session_done_is_transient() {
        let t = tunables();
        let mut session = InteractionSession::new();
        session.assign(SurvivorId(1));

        // Walk to completion: in range, signal for the full duration.
        let mut elapsed = 0.0;
        let mut resolved = false;
        for _ in 0..400 {
            elapsed += DT;
            if let Some(SessionEffect::Resolved { .. }) =
                session.tick(DT, 1.0, false, elapsed, &t)
            {
                resolved = true;
                break;
            }
        }
        assert!(resolved);
        assert_eq!(session.phase(), InteractionPhase::Done);
        // Done resets to a fresh session on the next assignment.
        assert!(session.assign(SurvivorId(2)));
        assert_eq!(session.phase(), InteractionPhase::Approaching);
        assert_eq!(session.elapsed_in_phase(), 0.0);
    }

    #[test]
    fn test_signal_resolution_timing_exact() {
        // Scenario from the mission contract: in range from t=0, the
        // signal resolves after exactly the signal duration of
        // accumulated state time, and exactly once.
        let t = tunables();
        let mut session = InteractionSession::new();
        session.assign(SurvivorId(1));

        // First tick flips Approaching -> Signaling.
        assert_eq!(
            session.tick(DT, 1.0, false, DT, &t),
            Some(SessionEffect::InteractionStarted { delivering: false })
        );

        // Signal duration 3.0 at 0.02 steps: 150 ticks accumulate the
        // duration; resolution lands on the 150th.
        let mut resolutions = 0;
        let mut ticks = 0;
        for i in 1..=160 {
            let elapsed = DT + i as f64 * DT;
            if let Some(SessionEffect::Resolved { kind, reward }) =
                session.tick(DT, 1.0, false, elapsed, &t)
            {
                assert_eq!(kind, ResolutionKind::Signaled);
                assert_eq!(reward, t.signal_reward);
                resolutions += 1;
                ticks = i;
            }
        }
        assert_eq!(resolutions, 1, "resolution reward is recorded exactly once");
        assert_eq!(ticks, 150, "resolved after exactly signal_duration");
    }
}
