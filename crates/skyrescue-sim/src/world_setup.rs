//! Arena generation and entity spawn factories.
//!
//! Builds the terrain, scatters obstacle columns and survivors with a
//! seeded RNG, and spawns the corresponding entities. Same seed, same
//! arena.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skyrescue_core::types::{Position, SurvivorId};
use skyrescue_terrain::{Aabb, Heightfield};

use crate::components::{Blocker, Survivor};

/// Arena grid cells per side.
pub const ARENA_CELLS: usize = 100;

/// Arena cell size (meters) — a 400 m square overall.
pub const ARENA_CELL_SIZE: f64 = 4.0;

/// Obstacle columns scattered per arena.
pub const DEFAULT_BLOCKER_COUNT: usize = 12;

/// Keep-out radius around the origin for obstacles (the spawn point and
/// safe zone live there).
const ORIGIN_CLEARANCE: f64 = 20.0;

/// Explicitly passed environment context: zone geometry the mission
/// loop is constructed with, instead of a global singleton.
#[derive(Debug, Clone, Copy)]
pub struct ZoneContext {
    pub safe_zone: Position,
    pub safe_zone_radius: f64,
    pub spawn_point: Position,
}

impl Default for ZoneContext {
    fn default() -> Self {
        Self {
            safe_zone: Position::new(0.0, 0.0, 0.0),
            safe_zone_radius: 10.0,
            spawn_point: Position::new(0.0, 0.0, 10.0),
        }
    }
}

/// Generated world geometry handed to the episode builder.
pub struct Arena {
    pub terrain: Heightfield,
    pub blockers: Vec<Aabb>,
    pub zone: ZoneContext,
}

/// Generate the standard arena: gently rolling terrain with scattered
/// obstacle columns, keeping the origin clear.
pub fn generate_arena(rng: &mut ChaCha8Rng, blocker_count: usize) -> Arena {
    let terrain = Heightfield::from_fn(ARENA_CELLS, ARENA_CELLS, ARENA_CELL_SIZE, |col, row| {
        // Low rolling dunes, a few meters of relief.
        let x = col as f64 * 0.13;
        let y = row as f64 * 0.17;
        (x.sin() + y.cos()) * 1.5 + 3.0
    });

    let extent = terrain.half_extent() * 0.7;
    let mut blockers = Vec::with_capacity(blocker_count);
    for _ in 0..blocker_count {
        let (x, y) = loop {
            let x = rng.gen_range(-extent..extent);
            let y = rng.gen_range(-extent..extent);
            if (x * x + y * y).sqrt() > ORIGIN_CLEARANCE {
                break (x, y);
            }
        };
        let half = rng.gen_range(2.0..6.0);
        let height = rng.gen_range(8.0..20.0);
        let base = terrain.elevation_at(x, y);
        blockers.push(Aabb::column(x, y, half, base, height));
    }

    Arena {
        terrain,
        blockers,
        zone: ZoneContext::default(),
    }
}

/// Spawn one Blocker entity per obstacle column.
pub fn spawn_blockers(world: &mut World, blockers: &[Aabb]) {
    for &aabb in blockers {
        world.spawn((Blocker { aabb },));
    }
}

/// Scatter survivors on the terrain, avoiding obstacle footprints so
/// every spawn is reachable. Ids are sequential in spawn order.
pub fn scatter_survivors(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    terrain: &Heightfield,
    blockers: &[Aabb],
    count: usize,
) -> Vec<SurvivorId> {
    let extent = terrain.half_extent() * 0.8;
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let mut position = Position::default();
        for _ in 0..32 {
            let x = rng.gen_range(-extent..extent);
            let y = rng.gen_range(-extent..extent);
            let z = terrain.elevation_at(x, y);
            position = Position::new(x, y, z);
            let clear = blockers.iter().all(|b| {
                position.x < b.min.x - 2.0
                    || position.x > b.max.x + 2.0
                    || position.y < b.min.y - 2.0
                    || position.y > b.max.y + 2.0
            });
            if clear {
                break;
            }
        }
        let id = SurvivorId(i as u32);
        world.spawn((Survivor { id, active: true }, position));
        ids.push(id);
    }

    ids
}
