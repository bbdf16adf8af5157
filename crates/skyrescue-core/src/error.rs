//! Fatal setup errors.
//!
//! Everything recoverable (empty scans, failed path solves, stuck targets)
//! is handled locally by the component that detected it. Only missing or
//! invalid dependencies at construction time surface here — the engine
//! refuses to start rather than run with undefined behavior.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no arena (terrain + zone context) provided to the episode builder")]
    MissingArena,
    #[error("no path planner provided to the episode builder")]
    MissingPlanner,
    #[error("tunable `{name}` is out of range: {value}")]
    NonPositiveTunable { name: &'static str, value: f64 },
    #[error("arena extent must be positive, got {0}")]
    EmptyArena(f64),
    #[error("failed to read tunables config: {0}")]
    BadConfig(String),
}
