//! Axis-aligned box obstacles.

use glam::DVec3;

use skyrescue_core::types::Position;

/// Axis-aligned bounding box in simulation space.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box from a ground-level footprint center, half-extents, and height.
    pub fn column(center_x: f64, center_y: f64, half: f64, base_z: f64, height: f64) -> Self {
        Self::new(
            DVec3::new(center_x - half, center_y - half, base_z),
            DVec3::new(center_x + half, center_y + half, base_z + height),
        )
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Distance along a unit-direction ray to the box entry point, if the
    /// ray hits within `max_distance`. Slab method.
    pub fn ray_entry(&self, origin: DVec3, direction: DVec3, max_distance: f64) -> Option<f64> {
        let mut t_near = 0.0_f64;
        let mut t_far = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            let (t1, t2) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let b = Aabb::column(0.0, 0.0, 2.0, 0.0, 10.0);
        assert!(b.contains(&Position::new(1.0, -1.0, 5.0)));
        assert!(!b.contains(&Position::new(3.0, 0.0, 5.0)));
        assert!(!b.contains(&Position::new(0.0, 0.0, 11.0)));
    }

    #[test]
    fn test_ray_entry_straight_on() {
        let b = Aabb::column(10.0, 0.0, 1.0, 0.0, 10.0);
        let hit = b.ray_entry(DVec3::new(0.0, 0.0, 5.0), DVec3::X, 100.0);
        assert!(hit.is_some());
        assert!((hit.unwrap() - 9.0).abs() < 1e-9, "entry at the near face");
    }

    #[test]
    fn test_ray_entry_miss() {
        let b = Aabb::column(10.0, 0.0, 1.0, 0.0, 10.0);
        // Ray passes above the box.
        assert!(b
            .ray_entry(DVec3::new(0.0, 0.0, 50.0), DVec3::X, 100.0)
            .is_none());
        // Box beyond max distance.
        assert!(b
            .ray_entry(DVec3::new(0.0, 0.0, 5.0), DVec3::X, 5.0)
            .is_none());
    }

    #[test]
    fn test_ray_from_inside_enters_at_zero() {
        let b = Aabb::column(0.0, 0.0, 5.0, 0.0, 10.0);
        let hit = b.ray_entry(DVec3::new(0.0, 0.0, 5.0), DVec3::X, 100.0);
        assert_eq!(hit, Some(0.0));
    }
}
