//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods. Behavior lives in
//! the engine and the mission controller, not here.

use serde::{Deserialize, Serialize};

use skyrescue_core::types::SurvivorId;
use skyrescue_terrain::Aabb;

/// A survivor awaiting rescue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Survivor {
    /// Stable handle exposed through the spatial query boundary.
    pub id: SurvivorId,
    /// Cleared when the survivor is rescued; inactive survivors are
    /// invisible to queries but their entity is kept for the episode.
    pub active: bool,
}

/// A solid obstruction: blocks line-of-sight, paths, and flight.
#[derive(Debug, Clone, Copy)]
pub struct Blocker {
    pub aabb: Aabb,
}
