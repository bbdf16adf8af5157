//! Read-only per-tick snapshot for telemetry and frontends.

use serde::{Deserialize, Serialize};

use skyrescue_core::enums::{InteractionPhase, MissionPhase, TargetStatus};
use skyrescue_core::types::{DroneState, Position, SimTime, SurvivorId};
use skyrescue_mission::MissionController;

/// Complete mission state visible to observers after a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSnapshot {
    pub time: SimTime,
    pub phase: MissionPhase,
    pub drone: DroneView,
    pub targets: Vec<TargetView>,
    /// Queued ids in priority order.
    pub queue: Vec<SurvivorId>,
    pub session: SessionView,
    pub path: Option<PathView>,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneView {
    pub position: Position,
    pub yaw: f64,
}

/// One discovered target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub id: SurvivorId,
    pub position: Position,
    pub status: TargetStatus,
    pub resource_recipient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub target: Option<SurvivorId>,
    pub phase: InteractionPhase,
    pub elapsed_in_phase: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathView {
    pub corner_count: usize,
    pub cursor: usize,
    pub fallback: bool,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreView {
    pub rescued: usize,
    pub total: usize,
    pub episode_secs: f64,
    pub total_reward: f64,
}

/// Build a snapshot from current state. Never modifies anything.
pub fn build_snapshot(
    controller: &MissionController,
    drone: &DroneState,
    time: SimTime,
    phase: MissionPhase,
    total_reward: f64,
) -> MissionSnapshot {
    let targets = controller
        .registry()
        .iter()
        .map(|r| TargetView {
            id: r.id,
            position: r.position,
            status: r.status,
            resource_recipient: controller.prioritizer().is_resource_recipient(r.id),
        })
        .collect();

    let path = controller.navigator().path().map(|p| PathView {
        corner_count: p.corner_count(),
        cursor: p.cursor(),
        fallback: p.is_fallback(),
        progress: p.progress(),
    });

    MissionSnapshot {
        time,
        phase,
        drone: DroneView {
            position: drone.position,
            yaw: drone.yaw,
        },
        targets,
        queue: controller.prioritizer().queue().collect(),
        session: SessionView {
            target: controller.session().target(),
            phase: controller.session().phase(),
            elapsed_in_phase: controller.session().elapsed_in_phase(),
        },
        path,
        score: ScoreView {
            rescued: controller.rescued(),
            total: controller.total_targets(),
            episode_secs: controller.clock().episode_secs,
            total_reward,
        },
    }
}
