//! The mission loop.
//!
//! Fixed-step driver tying perception, prioritization, navigation, and
//! interaction together, in that order, every step. Emits rewards and
//! presentation events through the step report and decides episode
//! termination. All recovery (stuck, per-target timeout) happens here by
//! abandoning the active target atomically: path and session are
//! discarded together before the next target is assigned.

use log::{debug, info};

use skyrescue_core::enums::{AbandonReason, InteractionPhase, TargetStatus};
use skyrescue_core::events::MissionEvent;
use skyrescue_core::services::{HitKind, PathPlanner, SpatialQuery};
use skyrescue_core::tunables::MissionTunables;
use skyrescue_core::types::{DroneState, Position};

use crate::interaction::{InteractionSession, SessionEffect};
use crate::navigator::{NavStatus, Navigator};
use crate::priority::Prioritizer;
use crate::registry::TargetRegistry;

/// Episode and per-target elapsed time, reset at episode start.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissionClock {
    pub episode_secs: f64,
    pub target_secs: f64,
}

/// Everything one step produced for the harness.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Reward delta accumulated this step.
    pub reward: f64,
    /// Presentation events, fire-and-forget.
    pub events: Vec<MissionEvent>,
    /// True when the episode terminated this step.
    pub episode_over: bool,
    /// True when the navigator drove the drone this step (the manual
    /// control branch applies only when it did not).
    pub navigated: bool,
}

/// The mission controller: owns the registry, the prioritizer, the
/// navigator, the single interaction session, and the clock.
pub struct MissionController {
    registry: TargetRegistry,
    prioritizer: Prioritizer,
    navigator: Navigator,
    session: InteractionSession,
    clock: MissionClock,
    tunables: MissionTunables,
    /// Spawned survivor count, for the completion ratio.
    total_targets: usize,
    rescued: usize,
    safe_zone: Position,
    scan_timer: f64,
    finished: bool,
}

impl MissionController {
    pub fn new(tunables: MissionTunables, total_targets: usize, safe_zone: Position) -> Self {
        Self {
            registry: TargetRegistry::new(),
            prioritizer: Prioritizer::new(),
            navigator: Navigator::new(),
            session: InteractionSession::new(),
            clock: MissionClock::default(),
            tunables,
            total_targets,
            rescued: 0,
            safe_zone,
            scan_timer: 0.0,
            finished: false,
        }
    }

    /// Advance the mission by one fixed step.
    ///
    /// `allow_roam` suppresses the safe-zone fallback goal when the
    /// harness is flying the drone manually this step.
    pub fn step(
        &mut self,
        drone: &mut DroneState,
        spatial: &dyn SpatialQuery,
        planner: &dyn PathPlanner,
        dt: f64,
        allow_roam: bool,
    ) -> StepReport {
        let mut report = StepReport::default();
        if self.finished {
            report.episode_over = true;
            return report;
        }

        self.clock.episode_secs += dt;
        if self.session.is_engaged() {
            self.clock.target_secs += dt;
        }

        // 1. Perception, on its own cadence.
        self.scan_timer += dt;
        if self.scan_timer >= self.tunables.scan_interval_secs {
            self.scan_timer = 0.0;
            self.scan(drone.position, spatial, &mut report);
        }

        // 2. Target assignment: pull the queue head when idle. Done is
        // transient — the next assignment resets it.
        if matches!(
            self.session.phase(),
            InteractionPhase::Idle | InteractionPhase::Done
        ) {
            self.assign_next(drone.position, spatial, allow_roam);
        }

        // 3. Navigation: refresh the goal, steer, detect stuck.
        if let Some(id) = self.session.target() {
            if let Some(live) = spatial.position_of(id) {
                self.navigator.update_goal_position(live);
            }
        }
        let nav_status = self.navigator.tick(drone, dt, planner, &self.tunables);
        report.navigated = nav_status != NavStatus::Idle;
        if nav_status == NavStatus::Stuck {
            if self.session.is_engaged() {
                self.abandon(AbandonReason::Stuck, drone.position, spatial, &mut report);
            } else {
                // A stuck roam just drops the path; it re-resolves next tick.
                self.navigator.clear();
            }
        }

        // 4. Interaction: advance the session, apply resolutions.
        self.advance_session(drone, spatial, dt, &mut report);

        // 5. Efficiency pressure.
        report.reward += self.tunables.step_penalty;

        // 6. Termination.
        self.check_termination(&mut report);
        report
    }

    /// Scan a bounded radius and line-of-sight-validate each new hit.
    fn scan(&mut self, origin: Position, spatial: &dyn SpatialQuery, report: &mut StepReport) {
        let mut newly_detected = false;

        for id in spatial.survivors_within(origin, self.tunables.detection_radius) {
            // Already-detected targets are not re-validated until resolved.
            if self.registry.contains(id) {
                continue;
            }
            if !spatial.is_active(id) {
                continue;
            }
            let Some(pos) = spatial.position_of(id) else {
                continue;
            };

            // Accept only if the first obstruction along the ray is the
            // candidate itself.
            let dir = origin.direction_to(&pos);
            let visible = match spatial.raycast(origin, dir, self.tunables.detection_radius) {
                Some(hit) => hit.kind == HitKind::Survivor(id),
                None => false,
            };
            if !visible {
                continue;
            }

            self.registry.register(id, pos);
            info!("survivor {id} detected at ({:.1}, {:.1})", pos.x, pos.y);
            report.events.push(MissionEvent::TargetDetected { id, position: pos });
            report.reward += self.tunables.detection_reward;
            newly_detected = true;
        }

        if newly_detected {
            self.reprioritize(origin, spatial);
        }
    }

    fn reprioritize(&mut self, agent: Position, spatial: &dyn SpatialQuery) {
        self.prioritizer.reprioritize(
            agent,
            &mut self.registry,
            spatial,
            self.session.target(),
            self.tunables.resource_fraction,
        );
    }

    /// Pop the next queued target (skipping stale entries) and hand it to
    /// the navigator and the session; otherwise fall back toward the
    /// safe zone.
    fn assign_next(&mut self, agent: Position, spatial: &dyn SpatialQuery, allow_roam: bool) {
        if let Some(next) = self.prioritizer.pop_next(&self.registry, spatial) {
            let position = spatial
                .position_of(next)
                .or_else(|| self.registry.get(next).map(|r| r.position))
                .unwrap_or(agent);
            self.registry.set_status(next, TargetStatus::InProgress);
            self.navigator.set_target(next, position);
            self.session.assign(next);
            self.clock.target_secs = 0.0;
            debug!("target {next} assigned");
        } else if allow_roam {
            self.navigator.set_roam(self.safe_zone);
        } else {
            self.navigator.clear();
        }
    }

    /// Advance the interaction session and apply its side effects.
    fn advance_session(
        &mut self,
        drone: &DroneState,
        spatial: &dyn SpatialQuery,
        dt: f64,
        report: &mut StepReport,
    ) {
        let Some(id) = self.session.target() else {
            return;
        };
        let target_pos = spatial
            .position_of(id)
            .or_else(|| self.registry.get(id).map(|r| r.position))
            .unwrap_or(drone.position);

        // Corners and survivors sit at ground level while the drone holds
        // clearance above them, so interaction proximity is horizontal.
        let distance = drone.position.horizontal_range_to(&target_pos);
        let effect = self.session.tick(
            dt,
            distance,
            self.prioritizer.is_resource_recipient(id),
            self.clock.target_secs,
            &self.tunables,
        );

        match effect {
            Some(SessionEffect::InteractionStarted { delivering }) => {
                debug!(
                    "{} started on {id}",
                    if delivering { "delivery" } else { "signal" }
                );
                report.reward += self.tunables.interaction_start_reward;
            }
            Some(SessionEffect::Resolved { kind, reward }) => {
                self.registry.mark_resolved(id);
                self.rescued += 1;
                report.reward += reward;
                report.events.push(MissionEvent::TargetResolved { id, kind });
                info!(
                    "survivor {id} resolved ({kind:?}), {}/{} rescued",
                    self.rescued, self.total_targets
                );
                self.navigator.clear();
                self.clock.target_secs = 0.0;
                self.reprioritize(drone.position, spatial);
            }
            Some(SessionEffect::TimedOut) => {
                self.abandon(AbandonReason::TimedOut, drone.position, spatial, report);
            }
            None => {}
        }
    }

    /// Give up on the active target: discard path and session atomically,
    /// return the target to the detected pool, and recompute priorities
    /// so it may be retried later.
    fn abandon(
        &mut self,
        reason: AbandonReason,
        agent: Position,
        spatial: &dyn SpatialQuery,
        report: &mut StepReport,
    ) {
        let Some(id) = self.session.target() else {
            return;
        };
        info!("abandoning target {id} ({reason:?})");
        self.registry.set_status(id, TargetStatus::Detected);
        self.session.reset();
        self.navigator.clear();
        self.clock.target_secs = 0.0;
        report.events.push(MissionEvent::TargetAbandoned { id, reason });
        self.reprioritize(agent, spatial);
    }

    /// All targets resolved, or the episode clock ran out. The final
    /// reward is proportional to the fraction rescued.
    fn check_termination(&mut self, report: &mut StepReport) {
        let all_rescued = self.total_targets > 0 && self.rescued >= self.total_targets;
        let expired = self.clock.episode_secs > self.tunables.episode_max_secs;
        if !(all_rescued || expired || self.total_targets == 0) {
            return;
        }

        let fraction = if self.total_targets == 0 {
            0.0
        } else {
            self.rescued as f64 / self.total_targets as f64
        };
        report.reward += self.tunables.completion_reward_scale * fraction;
        report.episode_over = true;
        self.finished = true;
        info!(
            "episode over: {}/{} rescued in {:.1}s",
            self.rescued, self.total_targets, self.clock.episode_secs
        );
    }

    /// Force a path recomputation (the harness's replan intent).
    pub fn request_replan(&mut self) {
        self.navigator.request_replan();
    }

    // --- Read-only views for observation and snapshot building ---

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn prioritizer(&self) -> &Prioritizer {
        &self.prioritizer
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn clock(&self) -> MissionClock {
        self.clock
    }

    pub fn tunables(&self) -> &MissionTunables {
        &self.tunables
    }

    pub fn rescued(&self) -> usize {
        self.rescued
    }

    pub fn total_targets(&self) -> usize {
        self.total_targets
    }

    /// True while a target is actively being approached or interacted
    /// with (the transient Done phase does not count).
    pub fn has_target(&self) -> bool {
        !matches!(
            self.session.phase(),
            InteractionPhase::Idle | InteractionPhase::Done
        )
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
