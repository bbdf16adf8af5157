//! Mission tunables.
//!
//! One parametrized mission controller configured by this struct, instead
//! of divergent per-agent copies. Defaults come from `constants`; a JSON
//! file with the same field names can override any subset.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::SetupError;

/// Tuning parameters for the mission controller and episode engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionTunables {
    pub detection_radius: f64,
    pub scan_interval_secs: f64,
    pub move_speed: f64,
    pub yaw_smoothing: f64,
    pub height_smoothing: f64,
    pub desired_clearance: f64,
    pub min_crash_clearance: f64,
    pub path_update_interval_secs: f64,
    pub target_drift_threshold: f64,
    pub stopping_distance: f64,
    pub stuck_epsilon: f64,
    pub stuck_timeout_secs: f64,
    pub interaction_distance: f64,
    pub signal_duration_secs: f64,
    pub delivery_duration_secs: f64,
    pub target_timeout_secs: f64,
    pub resource_fraction: f64,
    pub detection_reward: f64,
    pub interaction_start_reward: f64,
    pub signal_reward: f64,
    pub delivery_reward: f64,
    pub step_penalty: f64,
    pub crash_penalty: f64,
    pub completion_reward_scale: f64,
    pub episode_max_secs: f64,
}

impl Default for MissionTunables {
    fn default() -> Self {
        Self {
            detection_radius: DETECTION_RADIUS,
            scan_interval_secs: SCAN_INTERVAL_SECS,
            move_speed: MOVE_SPEED,
            yaw_smoothing: YAW_SMOOTHING,
            height_smoothing: HEIGHT_SMOOTHING,
            desired_clearance: DESIRED_CLEARANCE,
            min_crash_clearance: MIN_CRASH_CLEARANCE,
            path_update_interval_secs: PATH_UPDATE_INTERVAL_SECS,
            target_drift_threshold: TARGET_DRIFT_THRESHOLD,
            stopping_distance: STOPPING_DISTANCE,
            stuck_epsilon: STUCK_EPSILON,
            stuck_timeout_secs: STUCK_TIMEOUT_SECS,
            interaction_distance: INTERACTION_DISTANCE,
            signal_duration_secs: SIGNAL_DURATION_SECS,
            delivery_duration_secs: DELIVERY_DURATION_SECS,
            target_timeout_secs: TARGET_TIMEOUT_SECS,
            resource_fraction: RESOURCE_FRACTION,
            detection_reward: DETECTION_REWARD,
            interaction_start_reward: INTERACTION_START_REWARD,
            signal_reward: SIGNAL_REWARD,
            delivery_reward: DELIVERY_REWARD,
            step_penalty: STEP_PENALTY,
            crash_penalty: CRASH_PENALTY,
            completion_reward_scale: COMPLETION_REWARD_SCALE,
            episode_max_secs: EPISODE_MAX_SECS,
        }
    }
}

impl MissionTunables {
    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), SetupError> {
        let positive = [
            ("detection_radius", self.detection_radius),
            ("scan_interval_secs", self.scan_interval_secs),
            ("move_speed", self.move_speed),
            ("yaw_smoothing", self.yaw_smoothing),
            ("height_smoothing", self.height_smoothing),
            ("path_update_interval_secs", self.path_update_interval_secs),
            ("stopping_distance", self.stopping_distance),
            ("stuck_epsilon", self.stuck_epsilon),
            ("stuck_timeout_secs", self.stuck_timeout_secs),
            ("interaction_distance", self.interaction_distance),
            ("signal_duration_secs", self.signal_duration_secs),
            ("delivery_duration_secs", self.delivery_duration_secs),
            ("target_timeout_secs", self.target_timeout_secs),
            ("episode_max_secs", self.episode_max_secs),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(SetupError::NonPositiveTunable { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.resource_fraction) {
            return Err(SetupError::NonPositiveTunable {
                name: "resource_fraction",
                value: self.resource_fraction,
            });
        }
        Ok(())
    }
}
