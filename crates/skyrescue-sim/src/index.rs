//! Spatial query implementation over the ECS world and terrain.
//!
//! Borrows the world read-only for the duration of one mission step;
//! the engine applies world mutations (rescued survivors going
//! inactive) after the borrow ends.

use glam::DVec3;
use hecs::World;

use skyrescue_core::services::{HitKind, RayHit, SpatialQuery};
use skyrescue_core::types::{Position, SurvivorId};
use skyrescue_terrain::occlusion::{ray_sphere_hit, terrain_ray_hit};
use skyrescue_terrain::Heightfield;

use crate::components::{Blocker, Survivor};

/// Radius of a survivor body for ray tests (meters).
pub const SURVIVOR_BODY_RADIUS: f64 = 0.6;

/// Read-only view of the environment for one mission step.
pub struct WorldIndex<'a> {
    world: &'a World,
    terrain: &'a Heightfield,
}

impl<'a> WorldIndex<'a> {
    pub fn new(world: &'a World, terrain: &'a Heightfield) -> Self {
        Self { world, terrain }
    }
}

impl SpatialQuery for WorldIndex<'_> {
    fn survivors_within(&self, center: Position, radius: f64) -> Vec<SurvivorId> {
        self.world
            .query::<(&Survivor, &Position)>()
            .iter()
            .filter(|(_, (s, pos))| s.active && center.range_to(pos) <= radius)
            .map(|(_, (s, _))| s.id)
            .collect()
    }

    fn raycast(&self, origin: Position, direction: DVec3, max_distance: f64) -> Option<RayHit> {
        let origin_v = origin.as_dvec3();
        let mut best: Option<RayHit> = None;
        let mut consider = |kind: HitKind, distance: f64| {
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(RayHit {
                    kind,
                    distance,
                    point: origin.offset(direction * distance),
                });
            }
        };

        if let Some(d) = terrain_ray_hit(self.terrain, &origin, direction, max_distance) {
            consider(HitKind::Terrain, d);
        }
        for (_, blocker) in self.world.query::<&Blocker>().iter() {
            if let Some(d) = blocker.aabb.ray_entry(origin_v, direction, max_distance) {
                consider(HitKind::Obstacle, d);
            }
        }
        for (_, (s, pos)) in self.world.query::<(&Survivor, &Position)>().iter() {
            if !s.active {
                continue;
            }
            // Bodies stand a little above their ground anchor.
            let center = pos.as_dvec3() + DVec3::Z * SURVIVOR_BODY_RADIUS;
            if let Some(d) =
                ray_sphere_hit(origin_v, direction, center, SURVIVOR_BODY_RADIUS, max_distance)
            {
                consider(HitKind::Survivor(s.id), d);
            }
        }

        best
    }

    fn position_of(&self, id: SurvivorId) -> Option<Position> {
        self.world
            .query::<(&Survivor, &Position)>()
            .iter()
            .find(|(_, (s, _))| s.id == id)
            .map(|(_, (_, pos))| *pos)
    }

    fn is_active(&self, id: SurvivorId) -> bool {
        self.world
            .query::<&Survivor>()
            .iter()
            .any(|(_, s)| s.id == id && s.active)
    }
}
