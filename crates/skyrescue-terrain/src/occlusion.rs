//! Terrain ray queries.
//!
//! Stepped traversal along a ray, comparing ray height against the
//! heightfield at each sample. Used for line-of-sight obstruction checks
//! at mission scale (hundreds of meters), so no curvature correction.

use glam::DVec3;

use skyrescue_core::types::Position;

use crate::heightfield::Heightfield;

/// Sample interval for terrain ray stepping (meters).
const RAY_SAMPLE_INTERVAL: f64 = 1.0;

/// Distance along a unit-direction ray at which it first dips below the
/// terrain surface, or None within `max_distance`.
pub fn terrain_ray_hit(
    hf: &Heightfield,
    origin: &Position,
    direction: DVec3,
    max_distance: f64,
) -> Option<f64> {
    if max_distance <= 0.0 {
        return None;
    }

    let steps = (max_distance / RAY_SAMPLE_INTERVAL).ceil() as usize;
    let steps = steps.max(1);
    let origin = origin.as_dvec3();

    for i in 1..=steps {
        let t = (i as f64 * RAY_SAMPLE_INTERVAL).min(max_distance);
        let sample = origin + direction * t;
        if sample.z <= hf.elevation_at(sample.x, sample.y) {
            return Some(t);
        }
    }

    None
}

/// Distance along a unit-direction ray to a sphere surface, if hit
/// within `max_distance`. Used for survivor-body visibility tests.
pub fn ray_sphere_hit(
    origin: DVec3,
    direction: DVec3,
    center: DVec3,
    radius: f64,
    max_distance: f64,
) -> Option<f64> {
    let to_center = center - origin;
    let along = to_center.dot(direction);
    if along < 0.0 || along - radius > max_distance {
        return None;
    }
    let closest_sq = to_center.length_squared() - along * along;
    if closest_sq > radius * radius {
        return None;
    }
    Some((along - (radius * radius - closest_sq).sqrt()).max(0.0))
}
