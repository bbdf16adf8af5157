//! Grid-based corner-sequence path planner.
//!
//! Rasterizes obstacle footprints onto the terrain grid and runs A*
//! (8-connected, octile heuristic) between cells. The resulting cell
//! path is collapsed to direction-change corners, which is the shape the
//! navigator expects from a navigation-mesh solver. Terrain itself never
//! blocks (the drone flies over it); only obstacle columns do.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use skyrescue_core::services::PathPlanner;
use skyrescue_core::types::Position;

use crate::heightfield::Heightfield;
use crate::obstacle::Aabb;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// The eight neighbor offsets, orthogonals first.
const NEIGHBORS: [(i64, i64, f64); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (-1, 1, SQRT_2),
    (-1, -1, SQRT_2),
];

/// Path planner over an occupancy grid derived from the arena.
pub struct GridPlanner {
    terrain: Heightfield,
    blocked: Vec<bool>,
    width: usize,
    depth: usize,
}

impl GridPlanner {
    /// Build the occupancy grid. Footprints are inflated by `margin`
    /// (the drone's body radius) so planned corners keep clearance.
    pub fn new(terrain: Heightfield, blockers: &[Aabb], margin: f64) -> Self {
        let (width, depth) = terrain.dimensions();
        let mut blocked = vec![false; width * depth];

        for (idx, cell) in blocked.iter_mut().enumerate() {
            let (col, row) = (idx % width, idx / width);
            let (cx, cy) = terrain.cell_center(col, row);
            for b in blockers {
                if cx >= b.min.x - margin
                    && cx <= b.max.x + margin
                    && cy >= b.min.y - margin
                    && cy <= b.max.y + margin
                {
                    *cell = true;
                    break;
                }
            }
        }

        Self {
            terrain,
            blocked,
            width,
            depth,
        }
    }

    fn is_blocked(&self, col: usize, row: usize) -> bool {
        self.blocked[row * self.width + col]
    }

    /// Octile distance between two cells.
    fn heuristic(&self, a: (usize, usize), b: (usize, usize)) -> f64 {
        let dx = (a.0 as f64 - b.0 as f64).abs();
        let dy = (a.1 as f64 - b.1 as f64).abs();
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        (hi - lo) + lo * SQRT_2
    }

    /// A* over the occupancy grid. Returns the cell sequence from start
    /// to goal inclusive, or None when unreachable.
    fn search(&self, start: (usize, usize), goal: (usize, usize)) -> Option<Vec<(usize, usize)>> {
        let idx = |c: (usize, usize)| c.1 * self.width + c.0;

        let mut g = vec![f64::INFINITY; self.width * self.depth];
        let mut came_from = vec![usize::MAX; self.width * self.depth];
        let mut open = BinaryHeap::new();

        g[idx(start)] = 0.0;
        open.push(Node {
            f: self.heuristic(start, goal),
            idx: idx(start),
        });

        while let Some(Node { idx: current, .. }) = open.pop() {
            if current == idx(goal) {
                return Some(self.reconstruct(&came_from, current));
            }
            let (col, row) = (current % self.width, current / self.width);

            for (dc, dr, step_cost) in NEIGHBORS {
                let nc = col as i64 + dc;
                let nr = row as i64 + dr;
                if nc < 0 || nr < 0 || nc as usize >= self.width || nr as usize >= self.depth {
                    continue;
                }
                let (nc, nr) = (nc as usize, nr as usize);
                if self.is_blocked(nc, nr) {
                    continue;
                }
                // No corner cutting: a diagonal move needs both adjacent
                // orthogonal cells free.
                if dc != 0 && dr != 0 && (self.is_blocked(nc, row) || self.is_blocked(col, nr)) {
                    continue;
                }

                let tentative = g[current] + step_cost;
                let n_idx = nr * self.width + nc;
                if tentative < g[n_idx] {
                    g[n_idx] = tentative;
                    came_from[n_idx] = current;
                    open.push(Node {
                        f: tentative + self.heuristic((nc, nr), goal),
                        idx: n_idx,
                    });
                }
            }
        }

        None
    }

    fn reconstruct(&self, came_from: &[usize], mut current: usize) -> Vec<(usize, usize)> {
        let mut cells = vec![(current % self.width, current / self.width)];
        while came_from[current] != usize::MAX {
            current = came_from[current];
            cells.push((current % self.width, current / self.width));
        }
        cells.reverse();
        cells
    }

    /// Drop cells that continue the previous step direction, keeping only
    /// direction-change corners (plus both endpoints).
    fn collapse_collinear(cells: &[(usize, usize)]) -> Vec<(usize, usize)> {
        if cells.len() <= 2 {
            return cells.to_vec();
        }
        let mut corners = vec![cells[0]];
        let mut prev_dir = (
            cells[1].0 as i64 - cells[0].0 as i64,
            cells[1].1 as i64 - cells[0].1 as i64,
        );
        for window in cells.windows(2).skip(1) {
            let dir = (
                window[1].0 as i64 - window[0].0 as i64,
                window[1].1 as i64 - window[0].1 as i64,
            );
            if dir != prev_dir {
                corners.push(window[0]);
                prev_dir = dir;
            }
        }
        corners.push(*cells.last().unwrap());
        corners
    }

    fn cell_to_corner(&self, cell: (usize, usize)) -> Position {
        let (x, y) = self.terrain.cell_center(cell.0, cell.1);
        Position::new(x, y, self.terrain.elevation_at(x, y))
    }
}

impl PathPlanner for GridPlanner {
    fn solve_path(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        let start_cell = self.terrain.cell_at(start.x, start.y);
        let goal_cell = self.terrain.cell_at(goal.x, goal.y);

        if self.is_blocked(start_cell.0, start_cell.1) || self.is_blocked(goal_cell.0, goal_cell.1)
        {
            return None;
        }
        if start_cell == goal_cell {
            return Some(vec![start, goal]);
        }

        let cells = self.search(start_cell, goal_cell)?;
        let corners = Self::collapse_collinear(&cells);

        // Interior corners at cell centers; endpoints stay exact.
        let mut path = Vec::with_capacity(corners.len() + 1);
        path.push(start);
        for cell in &corners[1..corners.len() - 1] {
            path.push(self.cell_to_corner(*cell));
        }
        path.push(goal);
        Some(path)
    }

    fn sample_ground_height(&self, x: f64, y: f64) -> f64 {
        self.terrain.elevation_at(x, y)
    }
}

/// Open-set entry ordered as a min-heap on f, ties broken by index for
/// deterministic expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Node {
    f: f64,
    idx: usize,
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_planner() -> GridPlanner {
        GridPlanner::new(Heightfield::flat(50, 50, 4.0, 0.0), &[], 0.5)
    }

    #[test]
    fn test_open_ground_path_connects_endpoints() {
        let planner = open_planner();
        let start = Position::new(-80.0, -80.0, 0.0);
        let goal = Position::new(70.0, 55.0, 0.0);
        let path = planner.solve_path(start, goal).expect("open ground");
        assert!(path.len() >= 2);
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
    }

    #[test]
    fn test_same_cell_gives_two_point_path() {
        let planner = open_planner();
        let start = Position::new(0.0, 0.0, 0.0);
        let goal = Position::new(0.5, 0.5, 0.0);
        let path = planner.solve_path(start, goal).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_path_routes_around_wall() {
        // Thin wall across most of the arena, gap on the east side.
        let wall = Aabb::new(
            glam::DVec3::new(-100.0, -2.0, 0.0),
            glam::DVec3::new(40.0, 2.0, 30.0),
        );
        let planner = GridPlanner::new(Heightfield::flat(50, 50, 4.0, 0.0), &[wall], 0.5);

        let start = Position::new(0.0, -60.0, 0.0);
        let goal = Position::new(0.0, 60.0, 0.0);
        let path = planner.solve_path(start, goal).expect("gap exists");

        // The detour must swing east past the wall's edge.
        let max_x = path
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(
            max_x > 40.0,
            "path should detour around the wall edge, max_x = {max_x:.1}"
        );
        assert!(path.len() > 2, "detour needs interior corners");
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        // Goal cell is inside the obstacle footprint.
        let block = Aabb::column(40.0, 40.0, 6.0, 0.0, 20.0);
        let planner = GridPlanner::new(Heightfield::flat(50, 50, 4.0, 0.0), &[block], 0.5);
        let path = planner.solve_path(Position::new(0.0, 0.0, 0.0), Position::new(40.0, 40.0, 0.0));
        assert!(path.is_none(), "goal inside a blocker has no path");
    }

    #[test]
    fn test_ground_sampling_follows_terrain() {
        let hf = Heightfield::from_fn(50, 50, 4.0, |col, _| col as f64);
        let planner = GridPlanner::new(hf.clone(), &[], 0.5);
        let (x, y) = hf.cell_center(30, 10);
        assert_eq!(planner.sample_ground_height(x, y), 30.0);
    }
}
