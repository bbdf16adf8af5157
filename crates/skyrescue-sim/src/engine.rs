//! Episode engine — the fixed-step driver around the mission controller.
//!
//! Owns the ECS world, the drone pose, and the controller; implements
//! the environment capabilities over them; applies crash handling and
//! the manual-control branch; and surfaces the reward/episode contract
//! to the harness. Completely headless, enabling deterministic testing.

use glam::DVec3;
use hecs::World;
use log::warn;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skyrescue_core::constants::{DT, MANUAL_YAW_RATE};
use skyrescue_core::enums::MissionPhase;
use skyrescue_core::error::SetupError;
use skyrescue_core::events::MissionEvent;
use skyrescue_core::services::PathPlanner;
use skyrescue_core::tunables::MissionTunables;
use skyrescue_core::types::{DroneState, SimTime};
use skyrescue_mission::MissionController;
use skyrescue_terrain::{GridPlanner, Heightfield};

use crate::components::{Blocker, Survivor};
use crate::index::WorldIndex;
use crate::rl::{build_observation, DroneAction, Observation};
use crate::snapshot::{build_snapshot, MissionSnapshot};
use crate::world_setup::{self, Arena, ZoneContext};

/// Planner inflation margin: the drone's body radius (meters).
pub const DRONE_BODY_RADIUS: f64 = 0.6;

/// Configuration for starting a new episode.
#[derive(Debug, Clone)]
pub struct EpisodeConfig {
    /// RNG seed for determinism. Same seed = same episode.
    pub seed: u64,
    pub survivor_count: usize,
    pub tunables: MissionTunables,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            survivor_count: 10,
            tunables: MissionTunables::default(),
        }
    }
}

/// What one tick produced for the harness.
#[derive(Debug)]
pub struct StepOutcome {
    /// Reward delta for this step.
    pub reward: f64,
    /// Presentation events, fire-and-forget.
    pub events: Vec<MissionEvent>,
    /// True once the episode has terminated.
    pub done: bool,
    pub time: SimTime,
}

/// Assembles an episode engine, refusing to start incomplete.
///
/// A missing arena or planner is the fatal initialization class: the
/// engine will not run with undefined behavior in their place.
#[derive(Default)]
pub struct EpisodeBuilder {
    arena: Option<Arena>,
    planner: Option<Box<dyn PathPlanner>>,
    config: EpisodeConfig,
}

impl EpisodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(mut self, arena: Arena) -> Self {
        self.arena = Some(arena);
        self
    }

    pub fn planner(mut self, planner: Box<dyn PathPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn config(mut self, config: EpisodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<EpisodeEngine, SetupError> {
        self.config.tunables.validate()?;
        let arena = self.arena.ok_or(SetupError::MissingArena)?;
        if arena.terrain.half_extent() <= 0.0 {
            return Err(SetupError::EmptyArena(arena.terrain.half_extent()));
        }
        let planner = self.planner.ok_or(SetupError::MissingPlanner)?;

        let mut world = World::new();
        world_setup::spawn_blockers(&mut world, &arena.blockers);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let ids = world_setup::scatter_survivors(
            &mut world,
            &mut rng,
            &arena.terrain,
            &arena.blockers,
            self.config.survivor_count,
        );

        let controller = MissionController::new(
            self.config.tunables.clone(),
            ids.len(),
            arena.zone.safe_zone,
        );

        Ok(EpisodeEngine {
            world,
            terrain: arena.terrain,
            zone: arena.zone,
            planner,
            drone: DroneState::new(arena.zone.spawn_point, 0.0),
            controller,
            time: SimTime::default(),
            phase: MissionPhase::Active,
            total_reward: 0.0,
        })
    }
}

/// The episode engine. Owns the world and all episode state.
pub struct EpisodeEngine {
    world: World,
    terrain: Heightfield,
    zone: ZoneContext,
    planner: Box<dyn PathPlanner>,
    drone: DroneState,
    controller: MissionController,
    time: SimTime,
    phase: MissionPhase,
    total_reward: f64,
}

impl std::fmt::Debug for EpisodeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodeEngine")
            .field("zone", &self.zone)
            .field("drone", &self.drone)
            .field("time", &self.time)
            .field("phase", &self.phase)
            .field("total_reward", &self.total_reward)
            .finish_non_exhaustive()
    }
}

impl EpisodeEngine {
    /// Standard episode: generated arena plus the grid planner over it.
    pub fn standard(config: EpisodeConfig) -> Result<Self, SetupError> {
        // Separate stream from survivor scatter, so arena layout and
        // survivor placement draw independent values.
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(0x5EED));
        let arena = world_setup::generate_arena(&mut rng, world_setup::DEFAULT_BLOCKER_COUNT);
        let planner = GridPlanner::new(arena.terrain.clone(), &arena.blockers, DRONE_BODY_RADIUS);
        EpisodeBuilder::new()
            .arena(arena)
            .planner(Box::new(planner))
            .config(config)
            .build()
    }

    /// Advance the episode by one fixed step.
    pub fn tick(&mut self, action: &DroneAction) -> StepOutcome {
        if self.phase == MissionPhase::Complete {
            return StepOutcome {
                reward: 0.0,
                events: Vec::new(),
                done: true,
                time: self.time,
            };
        }

        if action.replan {
            self.controller.request_replan();
        }

        // The mission controller is authoritative while it holds a
        // target; the control vector flies the drone otherwise.
        let manual = action.has_motion() && !self.controller.has_target();

        let report = {
            let index = WorldIndex::new(&self.world, &self.terrain);
            self.controller
                .step(&mut self.drone, &index, &*self.planner, DT, !manual)
        };
        let mut reward = report.reward;
        let mut events = report.events;
        let mut done = report.episode_over;

        // The controller may have acquired a target mid-step; only fly
        // manually if it did not drive the drone itself.
        if manual && !report.navigated {
            self.fly_manual(action);
        }

        // Rescued survivors go inactive in the world; the registry keeps
        // their record.
        for event in &events {
            if let MissionEvent::TargetResolved { id, .. } = event {
                for (_, survivor) in self.world.query_mut::<&mut Survivor>() {
                    if survivor.id == *id {
                        survivor.active = false;
                    }
                }
            }
        }

        if self.check_crash() {
            warn!(
                "drone crashed at ({:.1}, {:.1}, {:.1})",
                self.drone.position.x, self.drone.position.y, self.drone.position.z
            );
            reward += self.controller.tunables().crash_penalty;
            events.push(MissionEvent::Collision {
                position: self.drone.position,
            });
            done = true;
        }

        self.total_reward += reward;
        self.time.advance();
        if done {
            self.phase = MissionPhase::Complete;
        }

        StepOutcome {
            reward,
            events,
            done,
            time: self.time,
        }
    }

    /// Manual flight: body-frame controls scaled to the mission speed.
    fn fly_manual(&mut self, action: &DroneAction) {
        let t = self.controller.tunables();
        let forward = self.drone.forward();
        let right = DVec3::new(forward.y, -forward.x, 0.0);

        let mut dir = forward * action.forward.clamp(-1.0, 1.0)
            + right * action.strafe.clamp(-1.0, 1.0);
        if dir.length_squared() > 1.0 {
            dir = dir.normalize();
        }
        let delta = dir * t.move_speed * DT
            + DVec3::Z * action.vertical.clamp(-1.0, 1.0) * t.move_speed * DT;

        self.drone.position = self.drone.position.offset(delta);
        self.drone.yaw += action.yaw.clamp(-1.0, 1.0) * MANUAL_YAW_RATE * DT;
    }

    /// Below crash clearance of the ground, or inside an obstacle.
    fn check_crash(&self) -> bool {
        let ground = self.terrain.elevation_under(&self.drone.position);
        if self.drone.position.z - ground < self.controller.tunables().min_crash_clearance {
            return true;
        }
        self.world
            .query::<&Blocker>()
            .iter()
            .any(|(_, b)| b.aabb.contains(&self.drone.position))
    }

    /// Observation vector for the policy.
    pub fn observation(&self) -> Observation {
        build_observation(&self.controller, &self.drone, self.zone.safe_zone)
    }

    /// Telemetry snapshot of the current state.
    pub fn snapshot(&self) -> MissionSnapshot {
        build_snapshot(
            &self.controller,
            &self.drone,
            self.time,
            self.phase,
            self.total_reward,
        )
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn drone(&self) -> &DroneState {
        &self.drone
    }

    pub fn controller(&self) -> &MissionController {
        &self.controller
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Move the drone directly (for crash and recovery tests).
    #[cfg(test)]
    pub fn teleport_drone(&mut self, position: skyrescue_core::types::Position) {
        self.drone.position = position;
    }
}
