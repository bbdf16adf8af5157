//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a survivor target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetStatus {
    /// Present in the world but not yet seen by the drone.
    #[default]
    Undetected,
    /// Seen with clear line-of-sight at least once.
    Detected,
    /// Ordered into the priority queue, awaiting assignment.
    Queued,
    /// Currently the active target of the interaction session.
    InProgress,
    /// Interaction completed. Never removed, only marked.
    Resolved,
}

/// Phase of the single interaction session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionPhase {
    /// No target assigned.
    #[default]
    Idle,
    /// Flying toward the assigned target.
    Approaching,
    /// Within interaction range, running the signal timer.
    Signaling,
    /// Within interaction range, running the delivery timer.
    DeliveringResource,
    /// Interaction finished. Transient: resets to Idle on the next assignment.
    Done,
}

/// How a target left the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionKind {
    /// Rescued via the signal interaction.
    Signaled,
    /// Rescued via the longer resource-delivery interaction.
    Delivered,
}

/// Why an unresolved target was given up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbandonReason {
    /// Displacement stayed below epsilon past the stuck timeout.
    Stuck,
    /// The target stayed active past the per-target timeout.
    TimedOut,
}

/// Episode phase (top-level state of the engine).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    #[default]
    Active,
    /// Terminated: all targets resolved, clock expired, or crash.
    Complete,
}
