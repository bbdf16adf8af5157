//! Path planning and following.
//!
//! The navigator owns the current path (corner sequence plus cursor) and
//! replaces it wholesale on recomputation — at most once per fixed
//! interval, or immediately when the goal drifts past a threshold. A
//! failed solve degrades to a two-point direct path; that is a warning
//! condition, never an error. Elevation is blended toward the ground
//! sample plus clearance independently of horizontal following, and yaw
//! interpolates smoothly toward the direction of travel.

use glam::DVec3;
use log::warn;

use skyrescue_core::services::PathPlanner;
use skyrescue_core::tunables::MissionTunables;
use skyrescue_core::types::{wrap_angle, DroneState, Position, SurvivorId};

/// Corner sequence plus traversal cursor.
#[derive(Debug, Clone)]
pub struct Path {
    corners: Vec<Position>,
    cursor: usize,
    /// True when this is the degraded two-point direct path.
    fallback: bool,
}

impl Path {
    fn direct(start: Position, goal: Position) -> Self {
        Self {
            corners: vec![start, goal],
            cursor: 0,
            fallback: true,
        }
    }

    /// Corner under the cursor, or None once the cursor has passed the
    /// final corner (the follower then steers at the literal goal).
    pub fn current_corner(&self) -> Option<&Position> {
        self.corners.get(self.cursor)
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Fraction of corners passed, 1.0 for trivial paths.
    pub fn progress(&self) -> f64 {
        if self.corners.len() <= 1 {
            return 1.0;
        }
        (self.cursor as f64 / (self.corners.len() - 1) as f64).min(1.0)
    }
}

/// What the navigator is steering toward.
#[derive(Debug, Clone, Copy)]
struct NavGoal {
    /// None for a roam goal (e.g. returning to the safe zone) that has no
    /// interaction session attached.
    target: Option<SurvivorId>,
    position: Position,
}

/// Outcome of one navigation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStatus {
    /// No goal assigned; the drone holds position.
    Idle,
    /// Moving along the path.
    Following,
    /// Displacement stayed below epsilon past the stuck timeout. The
    /// caller abandons the target; this is recovery, not failure.
    Stuck,
}

/// Owns the path and drives the drone toward the current goal.
#[derive(Debug, Default)]
pub struct Navigator {
    goal: Option<NavGoal>,
    path: Option<Path>,
    /// Goal position captured at the last solve, for drift detection.
    goal_at_solve: Position,
    time_since_solve: f64,
    recompute_requested: bool,
    /// Consecutive sub-epsilon displacement measurements. Compared as
    /// `ticks * dt` against the stuck timeout, so the trigger tick is
    /// deterministic.
    stuck_ticks: u32,
    /// Drone position at the previous tick entry, for displacement
    /// measurement.
    last_drone_pos: Option<Position>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a survivor target and request a full recomputation.
    pub fn set_target(&mut self, id: SurvivorId, position: Position) {
        self.goal = Some(NavGoal {
            target: Some(id),
            position,
        });
        self.recompute_requested = true;
        self.stuck_ticks = 0;
    }

    /// Steer toward a position with no session attached (safe-zone
    /// return). Re-setting the same roam goal keeps the current path.
    pub fn set_roam(&mut self, position: Position) {
        let same = matches!(
            self.goal,
            Some(NavGoal { target: None, position: p }) if p == position
        );
        if !same {
            self.goal = Some(NavGoal {
                target: None,
                position,
            });
            self.recompute_requested = true;
            self.stuck_ticks = 0;
        }
    }

    /// Refresh the goal position (targets can move between solves; drift
    /// past the threshold forces a recompute on the next tick).
    pub fn update_goal_position(&mut self, position: Position) {
        if let Some(goal) = &mut self.goal {
            goal.position = position;
        }
    }

    /// Drop the goal and path atomically. Used when a target resolves or
    /// is abandoned, so no partial state survives into the next target.
    pub fn clear(&mut self) {
        self.goal = None;
        self.path = None;
        self.recompute_requested = false;
        self.stuck_ticks = 0;
    }

    /// Force a recomputation on the next tick.
    pub fn request_replan(&mut self) {
        self.recompute_requested = true;
    }

    pub fn target_id(&self) -> Option<SurvivorId> {
        self.goal.and_then(|g| g.target)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Advance one step: replan if due, steer the drone, detect stuck.
    pub fn tick(
        &mut self,
        drone: &mut DroneState,
        dt: f64,
        planner: &dyn PathPlanner,
        t: &MissionTunables,
    ) -> NavStatus {
        // Displacement between tick entries. Measured on the actual pose
        // before this tick's movement, so externally blocked motion
        // registers as stuck.
        let displacement = self.last_drone_pos.map(|p| p.range_to(&drone.position));
        self.last_drone_pos = Some(drone.position);

        let Some(goal) = self.goal else {
            return NavStatus::Idle;
        };

        if let Some(moved) = displacement {
            if moved < t.stuck_epsilon {
                self.stuck_ticks += 1;
            } else {
                self.stuck_ticks = 0;
            }
        }
        if self.stuck_ticks as f64 * dt > t.stuck_timeout_secs {
            self.stuck_ticks = 0;
            return NavStatus::Stuck;
        }

        self.time_since_solve += dt;
        let drift = goal.position.range_to(&self.goal_at_solve);
        if self.recompute_requested
            || self.path.is_none()
            || self.time_since_solve >= t.path_update_interval_secs
            || drift > t.target_drift_threshold
        {
            self.recompute(drone.position, goal.position, planner);
        }

        self.follow(drone, goal.position, dt, planner, t);
        NavStatus::Following
    }

    /// Replace the path wholesale. Never leaves the goal without a path:
    /// a failed solve produces the two-point direct fallback.
    fn recompute(&mut self, start: Position, goal: Position, planner: &dyn PathPlanner) {
        let path = match planner.solve_path(start, goal) {
            Some(corners) if corners.len() >= 2 => Path {
                corners,
                cursor: 0,
                fallback: false,
            },
            _ => {
                warn!(
                    "path solve failed from ({:.1},{:.1}) to ({:.1},{:.1}); \
                     falling back to direct path",
                    start.x, start.y, goal.x, goal.y
                );
                Path::direct(start, goal)
            }
        };
        self.path = Some(path);
        self.goal_at_solve = goal;
        self.time_since_solve = 0.0;
        self.recompute_requested = false;
    }

    /// Steer toward the current corner (or the literal goal once the
    /// cursor passes the final corner) and blend elevation and yaw.
    fn follow(
        &mut self,
        drone: &mut DroneState,
        goal_pos: Position,
        dt: f64,
        planner: &dyn PathPlanner,
        t: &MissionTunables,
    ) {
        // Recompute above guarantees a path whenever a goal is set.
        let Some(path) = self.path.as_mut() else {
            return;
        };

        // Advance the cursor past every corner already within stopping
        // distance. Corners sit at ground level while the drone flies at
        // clearance, so proximity is horizontal.
        while let Some(&corner) = path.current_corner() {
            if drone.position.horizontal_range_to(&corner) < t.stopping_distance {
                path.cursor += 1;
            } else {
                break;
            }
        }

        let steer_point = *path.current_corner().unwrap_or(&goal_pos);

        // Horizontal advance toward the steer point.
        let to_point = DVec3::new(
            steer_point.x - drone.position.x,
            steer_point.y - drone.position.y,
            0.0,
        );
        let horizontal = to_point.normalize_or_zero() * t.move_speed * dt;

        // Elevation blend, decoupled from horizontal following so a
        // momentarily-invalid path never causes vertical oscillation.
        let ground = planner.sample_ground_height(drone.position.x, drone.position.y);
        let desired_z = ground + t.desired_clearance;
        let blend = 1.0 - (-t.height_smoothing * dt).exp();
        let vertical = (desired_z - drone.position.z) * blend;

        drone.position = drone
            .position
            .offset(DVec3::new(horizontal.x, horizontal.y, vertical));

        // Yaw eases toward the direction of travel; it never snaps.
        if horizontal.length_squared() > 1e-12 {
            let desired_yaw = horizontal.x.atan2(horizontal.y);
            let ease = 1.0 - (-t.yaw_smoothing * dt).exp();
            drone.yaw += wrap_angle(drone.yaw, desired_yaw) * ease;
        }
    }
}
