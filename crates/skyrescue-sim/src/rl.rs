//! The RL harness boundary: observation vector and control action.
//!
//! The observation is a fixed-size, deterministic, serializable snapshot
//! of mission state. Field order in `to_vector` is part of the schema —
//! policies trained against it depend on the layout, so append, never
//! reorder.

use serde::{Deserialize, Serialize};

use skyrescue_core::enums::InteractionPhase;
use skyrescue_core::types::{DroneState, Position};
use skyrescue_mission::MissionController;

/// Length of the flattened observation vector.
pub const OBS_LEN: usize = 27;

/// Continuous controls plus discrete intents from the policy.
///
/// While a target is assigned the mission controller is authoritative
/// and the continuous controls are ignored, as in the source agent; they
/// fly the drone only when nothing is assigned. `signal` and `deliver`
/// are accepted for action-space compatibility but never preempt the
/// interaction state machine. `replan` forces a path recomputation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DroneAction {
    /// Forward/backward along the heading, in [-1, 1].
    pub forward: f64,
    /// Right/left strafe, in [-1, 1].
    pub strafe: f64,
    /// Climb/descend, in [-1, 1].
    pub vertical: f64,
    /// Yaw rate command, in [-1, 1].
    pub yaw: f64,
    pub signal: bool,
    pub deliver: bool,
    pub replan: bool,
}

impl DroneAction {
    /// Whether any continuous channel is asking for motion.
    pub fn has_motion(&self) -> bool {
        self.forward.abs() + self.strafe.abs() + self.vertical.abs() + self.yaw.abs() > 1e-6
    }
}

/// Fixed-size numeric state for the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub position: [f64; 3],
    pub forward: [f64; 3],
    pub next_corner: [f64; 3],
    pub next_corner_distance: f64,
    /// Dot of the forward vector with the direction to the next corner.
    pub heading_alignment: f64,
    pub has_path: f64,
    pub target: [f64; 3],
    pub target_distance: f64,
    pub has_target: f64,
    pub safe_zone: [f64; 3],
    pub safe_zone_distance: f64,
    pub signaling: f64,
    pub delivering: f64,
    pub rescued: f64,
    pub total: f64,
    pub path_cursor: f64,
    pub corner_count: f64,
}

impl Observation {
    /// Flatten into the policy input layout.
    pub fn to_vector(&self) -> [f64; OBS_LEN] {
        [
            self.position[0],
            self.position[1],
            self.position[2],
            self.forward[0],
            self.forward[1],
            self.forward[2],
            self.next_corner[0],
            self.next_corner[1],
            self.next_corner[2],
            self.next_corner_distance,
            self.heading_alignment,
            self.has_path,
            self.target[0],
            self.target[1],
            self.target[2],
            self.target_distance,
            self.has_target,
            self.safe_zone[0],
            self.safe_zone[1],
            self.safe_zone[2],
            self.safe_zone_distance,
            self.signaling,
            self.delivering,
            self.rescued,
            self.total,
            self.path_cursor,
            self.corner_count,
        ]
    }
}

fn vec3(p: Position) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// Build the observation from current mission state. Absent path or
/// target features collapse onto the drone's own position with zeroed
/// distance and presence flags, so the vector size never changes.
pub fn build_observation(
    controller: &MissionController,
    drone: &DroneState,
    safe_zone: Position,
) -> Observation {
    let self_pos = drone.position;
    let forward = drone.forward();

    let (next_corner, corner_distance, alignment, has_path) = match controller
        .navigator()
        .path()
        .and_then(|p| p.current_corner().copied())
    {
        Some(corner) => {
            let dir = self_pos.direction_to(&corner);
            (
                vec3(corner),
                self_pos.range_to(&corner),
                forward.dot(dir),
                1.0,
            )
        }
        None => (vec3(self_pos), 0.0, 0.0, 0.0),
    };

    let target_pos = controller.session().target().and_then(|id| {
        controller.registry().get(id).map(|r| r.position)
    });
    let (target, target_distance, has_target) = match target_pos {
        Some(pos) => (vec3(pos), self_pos.range_to(&pos), 1.0),
        None => (vec3(self_pos), 0.0, 0.0),
    };

    let phase = controller.session().phase();
    let (cursor, corners) = match controller.navigator().path() {
        Some(path) => (path.cursor() as f64, path.corner_count() as f64),
        None => (0.0, 0.0),
    };

    Observation {
        position: vec3(self_pos),
        forward: [forward.x, forward.y, forward.z],
        next_corner,
        next_corner_distance: corner_distance,
        heading_alignment: alignment,
        has_path,
        target,
        target_distance,
        has_target,
        safe_zone: vec3(safe_zone),
        safe_zone_distance: self_pos.range_to(&safe_zone),
        signaling: (phase == InteractionPhase::Signaling) as u8 as f64,
        delivering: (phase == InteractionPhase::DeliveringResource) as u8 as f64,
        rescued: controller.rescued() as f64,
        total: controller.total_targets() as f64,
        path_cursor: cursor,
        corner_count: corners,
    }
}
