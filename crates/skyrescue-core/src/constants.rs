//! Simulation constants and default tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Perception ---

/// Radius of the survivor scan around the drone (meters).
pub const DETECTION_RADIUS: f64 = 50.0;

/// Interval between survivor scans (seconds). Scans are throttled,
/// not per-tick.
pub const SCAN_INTERVAL_SECS: f64 = 0.5;

// --- Movement ---

/// Horizontal flight speed (m/s).
pub const MOVE_SPEED: f64 = 5.0;

/// Exponential smoothing rate for yaw interpolation (1/s).
pub const YAW_SMOOTHING: f64 = 5.0;

/// Exponential smoothing rate for the elevation blend (1/s).
pub const HEIGHT_SMOOTHING: f64 = 5.0;

/// Desired hover clearance above the sampled ground (meters).
pub const DESIRED_CLEARANCE: f64 = 5.0;

/// Clearance below which the drone counts as crashed (meters).
pub const MIN_CRASH_CLEARANCE: f64 = 1.0;

/// Yaw rate under manual control (rad/s).
pub const MANUAL_YAW_RATE: f64 = 1.5;

// --- Navigation ---

/// Minimum interval between path recomputations (seconds).
pub const PATH_UPDATE_INTERVAL_SECS: f64 = 3.0;

/// Target displacement since the last solve that forces an immediate
/// recompute (meters).
pub const TARGET_DRIFT_THRESHOLD: f64 = 0.5;

/// Distance at which a path corner counts as reached (meters).
pub const STOPPING_DISTANCE: f64 = 1.0;

/// Per-tick displacement below which the drone counts as not moving
/// (meters per tick).
pub const STUCK_EPSILON: f64 = 0.01;

/// Tolerated duration of near-zero displacement before forced retarget
/// (seconds).
pub const STUCK_TIMEOUT_SECS: f64 = 3.0;

// --- Interaction ---

/// Horizontal distance at which the interaction may begin (meters).
pub const INTERACTION_DISTANCE: f64 = 3.0;

/// Duration of the signal interaction (seconds).
pub const SIGNAL_DURATION_SECS: f64 = 3.0;

/// Duration of the resource-delivery interaction (seconds).
pub const DELIVERY_DURATION_SECS: f64 = 2.0;

/// Maximum time a target may stay active without resolving (seconds).
pub const TARGET_TIMEOUT_SECS: f64 = 30.0;

/// Fraction of the priority ordering (farthest-ranked) that receives
/// resource delivery instead of a plain signal.
pub const RESOURCE_FRACTION: f64 = 0.2;

// --- Rewards ---

/// Reward for locating a new survivor.
pub const DETECTION_REWARD: f64 = 0.3;

/// Reward for starting a signal or delivery.
pub const INTERACTION_START_REWARD: f64 = 0.1;

/// Reward for a completed signal.
pub const SIGNAL_REWARD: f64 = 0.5;

/// Reward for a completed resource delivery.
pub const DELIVERY_REWARD: f64 = 0.7;

/// Per-step penalty applying efficiency pressure.
pub const STEP_PENALTY: f64 = -0.001;

/// Penalty for crashing into terrain or an obstacle.
pub const CRASH_PENALTY: f64 = -1.0;

/// Scale of the terminal reward (multiplied by the rescued fraction).
pub const COMPLETION_REWARD_SCALE: f64 = 1.0;

// --- Episode ---

/// Maximum episode duration (seconds).
pub const EPISODE_MAX_SECS: f64 = 300.0;
