//! Events emitted by the mission core for presentation collaborators.
//!
//! Fire-and-forget: the core buffers these during a step and hands them
//! out with the step outcome. Indicator/audio/VFX layers consume them;
//! the core never waits on their completion.

use serde::{Deserialize, Serialize};

use crate::enums::{AbandonReason, ResolutionKind};
use crate::types::{Position, SurvivorId};

/// Presentation events for indicator, audio, and effects layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MissionEvent {
    /// A survivor gained line-of-sight detection for the first time.
    TargetDetected { id: SurvivorId, position: Position },
    /// A survivor was rescued (signal or delivery completed).
    TargetResolved { id: SurvivorId, kind: ResolutionKind },
    /// The active target was given up without resolution.
    TargetAbandoned { id: SurvivorId, reason: AbandonReason },
    /// The drone collided with terrain or an obstacle.
    Collision { position: Position },
}
