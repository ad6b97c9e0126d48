//! Deterministic and random pattern seeders.
//!
//! Shapes are axis-clamped rather than wrapped: a pattern centered near an
//! edge is truncated, matching how the presets were authored. Every seeder
//! except the pure random fills clears the grid first.

use crate::grid::Grid;
use rand::{Rng, RngCore};

impl Grid {
    /// Filled disk: cells within `radius` of `(cx, cy)` set to 1.0, rest 0.
    pub fn seed_circle(&mut self, cx: i32, cy: i32, radius: u32) {
        self.fill(0.0);
        let width = self.width() as i32;
        let height = self.height() as i32;
        let r = radius as i32;
        let r_sq = i64::from(r) * i64::from(r);
        let cells = self.cells_mut();
        for y in (cy - r).max(0)..=(cy + r).min(height - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(width - 1) {
                let dx = i64::from(x - cx);
                let dy = i64::from(y - cy);
                if dx * dx + dy * dy <= r_sq {
                    cells[y as usize * width as usize + x as usize] = 1.0;
                }
            }
        }
    }

    /// Annulus: cells between `inner` and `outer` radii set to 1.0, rest 0.
    pub fn seed_ring(&mut self, cx: i32, cy: i32, inner: u32, outer: u32) {
        self.fill(0.0);
        let width = self.width() as i32;
        let height = self.height() as i32;
        let r = outer as i32;
        let inner_sq = i64::from(inner) * i64::from(inner);
        let outer_sq = i64::from(outer) * i64::from(outer);
        let cells = self.cells_mut();
        for y in (cy - r).max(0)..=(cy + r).min(height - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(width - 1) {
                let dx = i64::from(x - cx);
                let dy = i64::from(y - cy);
                let dist_sq = dx * dx + dy * dy;
                if dist_sq >= inner_sq && dist_sq <= outer_sq {
                    cells[y as usize * width as usize + x as usize] = 1.0;
                }
            }
        }
    }

    /// Two perpendicular bars through `(cx, cy)` with quadratic falloff from
    /// the center line, combined via max.
    pub fn seed_cross(&mut self, cx: i32, cy: i32, arm_length: u32, thickness: u32) {
        self.fill(0.0);
        let width = self.width() as i32;
        let height = self.height() as i32;
        let half_arm = (arm_length / 2) as i32;
        // Half-width clamped to one cell so the falloff divisor stays finite.
        let half_thick = ((thickness / 2).max(1)) as i32;
        let cells = self.cells_mut();

        for x in (cx - half_arm).max(0)..=(cx + half_arm).min(width - 1) {
            for y in (cy - half_thick).max(0)..=(cy + half_thick).min(height - 1) {
                let t = f64::from((y - cy).abs()) / f64::from(half_thick);
                cells[y as usize * width as usize + x as usize] = 1.0 - t * t;
            }
        }
        for y in (cy - half_arm).max(0)..=(cy + half_arm).min(height - 1) {
            for x in (cx - half_thick).max(0)..=(cx + half_thick).min(width - 1) {
                let t = f64::from((x - cx).abs()) / f64::from(half_thick);
                let idx = y as usize * width as usize + x as usize;
                cells[idx] = cells[idx].max(1.0 - t * t);
            }
        }
    }

    /// Every cell drawn uniformly from `[0, 1)`.
    pub fn seed_random_uniform(&mut self, rng: &mut dyn RngCore) {
        for cell in self.cells_mut() {
            *cell = rng.gen_range(0.0..1.0);
        }
    }

    /// Bernoulli mask at `density`, then a uniform value where the mask hit.
    pub fn seed_random_density(&mut self, density: f64, rng: &mut dyn RngCore) {
        for cell in self.cells_mut() {
            *cell = if rng.gen::<f64>() < density {
                rng.gen_range(0.0..1.0)
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn circle_fills_disk_and_clears_rest() {
        let mut grid = Grid::new(16, 16, 0.5).expect("grid");
        grid.seed_circle(8, 8, 3);
        assert_eq!(grid.get(8, 8), Some(1.0));
        assert_eq!(grid.get(8, 5), Some(1.0));
        assert_eq!(grid.get(8, 4), Some(0.0));
        assert_eq!(grid.get(0, 0), Some(0.0), "prior contents must be cleared");
    }

    #[test]
    fn circle_truncates_at_edges() {
        let mut grid = Grid::new(8, 8, 0.0).expect("grid");
        grid.seed_circle(0, 0, 3);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(3, 0), Some(1.0));
        // No wrap: the opposite edge stays empty.
        assert_eq!(grid.get(7, 0), Some(0.0));
        assert_eq!(grid.get(0, 7), Some(0.0));
    }

    #[test]
    fn ring_leaves_hole_inside_inner_radius() {
        let mut grid = Grid::new(24, 24, 0.0).expect("grid");
        grid.seed_ring(12, 12, 4, 7);
        assert_eq!(grid.get(12, 12), Some(0.0));
        assert_eq!(grid.get(12, 9), Some(0.0));
        assert_eq!(grid.get(12, 7), Some(1.0));
        assert_eq!(grid.get(12, 5), Some(1.0));
        assert_eq!(grid.get(12, 4), Some(0.0));
    }

    #[test]
    fn cross_peaks_on_center_lines_and_falls_off() {
        let mut grid = Grid::new(32, 32, 0.0).expect("grid");
        grid.seed_cross(16, 16, 20, 6);
        assert_eq!(grid.get(10, 16), Some(1.0));
        assert_eq!(grid.get(16, 10), Some(1.0));
        let off_axis = grid.get(10, 18).expect("cell");
        assert!(off_axis > 0.0 && off_axis < 1.0);
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert!(grid.cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn random_density_respects_mask() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut grid = Grid::new(64, 64, 0.0).expect("grid");
        grid.seed_random_density(0.25, &mut rng);
        let occupied = grid.cells().iter().filter(|&&v| v > 0.0).count();
        let fraction = occupied as f64 / grid.len() as f64;
        assert!(
            (0.15..=0.35).contains(&fraction),
            "density 0.25 produced occupancy {fraction}"
        );
        assert!(grid.cells().iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn random_uniform_overwrites_every_cell() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut grid = Grid::new(16, 16, 0.0).expect("grid");
        grid.seed_random_uniform(&mut rng);
        assert!(grid.cells().iter().any(|&v| v > 0.0));
        assert!(grid.cells().iter().all(|&v| (0.0..1.0).contains(&v)));
    }
}
