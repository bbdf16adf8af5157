//! Capability traits at the environment boundary.
//!
//! The mission controller consumes these instead of reaching into the
//! physics or navigation substrate directly. The simulation crate
//! implements them over its ECS world and terrain; tests substitute
//! hand-built stubs.

use glam::DVec3;

use crate::types::{Position, SurvivorId};

/// What a ray hit first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitKind {
    /// A survivor body.
    Survivor(SurvivorId),
    /// A solid obstacle.
    Obstacle,
    /// The ground.
    Terrain,
}

/// First obstruction along a ray.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub kind: HitKind,
    /// Distance from the ray origin (meters).
    pub distance: f64,
    pub point: Position,
}

/// Spatial queries against the environment: the perception boundary.
pub trait SpatialQuery {
    /// Handles of all survivor-classified objects within `radius` of
    /// `center`, active or not. Line-of-sight filtering is the caller's
    /// concern.
    fn survivors_within(&self, center: Position, radius: f64) -> Vec<SurvivorId>;

    /// First obstruction along the ray, or None within `max_distance`.
    fn raycast(&self, origin: Position, direction: DVec3, max_distance: f64) -> Option<RayHit>;

    /// Current position of a survivor, or None for an unknown handle.
    fn position_of(&self, id: SurvivorId) -> Option<Position>;

    /// Whether the handle still refers to a live, interactable survivor.
    /// Registry queries use this for lazy staleness filtering.
    fn is_active(&self, id: SurvivorId) -> bool;
}

/// Path solving and ground sampling: the navigation boundary.
pub trait PathPlanner {
    /// Corner sequence from `start` to `goal`, or None when no complete
    /// path exists. Callers degrade to a direct two-point path on None.
    fn solve_path(&self, start: Position, goal: Position) -> Option<Vec<Position>>;

    /// Ground elevation at a horizontal coordinate (meters).
    fn sample_ground_height(&self, x: f64, y: f64) -> f64;
}
