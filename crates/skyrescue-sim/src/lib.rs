//! Episode engine for SKYRESCUE.
//!
//! Owns the hecs ECS world of survivors and obstacles, drives the
//! mission controller at a fixed tick rate, implements the environment
//! capability traits over the world, and exposes the RL harness
//! boundary: observation vectors in, control actions and reward/episode
//! signals out.

pub mod components;
pub mod engine;
pub mod index;
pub mod rl;
pub mod snapshot;
pub mod world_setup;

pub use engine::{EpisodeBuilder, EpisodeConfig, EpisodeEngine, StepOutcome};
pub use skyrescue_core as core;
