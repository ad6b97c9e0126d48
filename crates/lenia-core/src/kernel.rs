//! Precomputed convolution kernel over the toroidal neighborhood.

use crate::EngineError;
use tracing::debug;

/// Bump-shaped kernel profile over the normalized radius `x ∈ (0, 1)`.
///
/// Zero outside the open interval; the automaton has no self-interaction
/// term, so `x = 0` (the center cell) never contributes.
#[inline]
#[must_use]
pub fn bump_profile(x: f64, alpha: f64) -> f64 {
    if x <= 0.0 || x >= 1.0 {
        return 0.0;
    }
    (alpha - alpha / (4.0 * x * (1.0 - x))).exp()
}

/// Immutable set of `(dx, dy, weight)` neighborhood entries, weights
/// normalized to sum to 1.0.
///
/// Stored as parallel arrays for the hot potential loop. Rebuilt whenever
/// the radius, sharpness, or weight floor changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    offsets_x: Vec<i32>,
    offsets_y: Vec<i32>,
    weights: Vec<f64>,
    reach: i32,
}

impl Kernel {
    /// Build the normalized kernel for radius `r` and sharpness `alpha`,
    /// pruning raw weights below `weight_floor`.
    pub fn build(r: f64, alpha: f64, weight_floor: f64) -> Result<Self, EngineError> {
        if !(r > 0.0) || !r.is_finite() {
            return Err(EngineError::InvalidConfig(
                "interaction radius must be positive",
            ));
        }
        let reach = r.ceil() as i32;
        let mut offsets_x = Vec::new();
        let mut offsets_y = Vec::new();
        let mut weights = Vec::new();
        let mut considered = 0usize;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let distance = f64::from(dx * dx + dy * dy).sqrt();
                if distance > r || distance <= 0.0 {
                    continue;
                }
                considered += 1;
                let weight = bump_profile(distance / r, alpha);
                if weight < weight_floor {
                    continue;
                }
                offsets_x.push(dx);
                offsets_y.push(dy);
                weights.push(weight);
            }
        }

        if weights.is_empty() {
            return Err(EngineError::DegenerateKernel { considered });
        }

        let sum: f64 = weights.iter().sum();
        for weight in &mut weights {
            *weight /= sum;
        }

        debug!(
            entries = weights.len(),
            considered, r, alpha, "kernel rebuilt"
        );
        Ok(Self {
            offsets_x,
            offsets_y,
            weights,
            reach,
        })
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Largest offset magnitude along either axis, `ceil(r)`.
    #[must_use]
    pub const fn reach(&self) -> i32 {
        self.reach
    }

    /// Normalized weights in entry order.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Iterate over `(dx, dy, weight)` entries.
    pub fn entries(&self) -> impl Iterator<Item = (i32, i32, f64)> + '_ {
        self.offsets_x
            .iter()
            .zip(&self.offsets_y)
            .zip(&self.weights)
            .map(|((&dx, &dy), &w)| (dx, dy, w))
    }

    /// Weighted neighborhood sum around `(x, y)` with branch-based toroidal
    /// wrap.
    ///
    /// Only valid when [`Self::reach`] does not exceed either grid extent;
    /// the engine falls back to [`Self::potential_modulo`] otherwise. Reads
    /// only `cells`, so disjoint cells may be evaluated concurrently.
    #[inline]
    #[must_use]
    pub fn potential(&self, cells: &[f64], width: i32, height: i32, x: i32, y: i32) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.weights.len() {
            let mut tx = x + self.offsets_x[i];
            let mut ty = y + self.offsets_y[i];
            if tx < 0 {
                tx += width;
            } else if tx >= width {
                tx -= width;
            }
            if ty < 0 {
                ty += height;
            } else if ty >= height {
                ty -= height;
            }
            sum += cells[(ty * width + tx) as usize] * self.weights[i];
        }
        sum
    }

    /// Weighted neighborhood sum with modulo-based wrap; identical results
    /// to [`Self::potential`] for any grid extent.
    #[must_use]
    pub fn potential_modulo(&self, cells: &[f64], width: i32, height: i32, x: i32, y: i32) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.weights.len() {
            let tx = (x + self.offsets_x[i]).rem_euclid(width);
            let ty = (y + self.offsets_y[i]).rem_euclid(height);
            sum += cells[(ty * width + tx) as usize] * self.weights[i];
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    #[test]
    fn weights_normalize_to_one() {
        for r in [1.5, 4.0, 6.0, 13.0] {
            let kernel = Kernel::build(r, 4.0, 1e-8).expect("kernel");
            let sum: f64 = kernel.weights().iter().sum();
            assert!(
                (sum - 1.0).abs() <= 1e-6,
                "r={r} weight sum {sum} not normalized"
            );
        }
    }

    #[test]
    fn center_and_out_of_radius_excluded() {
        let r = 4.0;
        let kernel = Kernel::build(r, 4.0, 0.0).expect("kernel");
        for (dx, dy, weight) in kernel.entries() {
            let distance = f64::from(dx * dx + dy * dy).sqrt();
            assert!(distance > 0.0, "center cell must not contribute");
            assert!(distance <= r, "offset ({dx},{dy}) outside radius");
            assert!(weight > 0.0);
        }
    }

    #[test]
    fn weight_floor_prunes_entries() {
        let dense = Kernel::build(6.0, 4.0, 1e-8).expect("dense");
        let sparse = Kernel::build(6.0, 4.0, 0.01).expect("sparse");
        assert!(sparse.len() < dense.len());
        let sum: f64 = sparse.weights().iter().sum();
        assert!((sum - 1.0).abs() <= 1e-6);
    }

    #[test]
    fn degenerate_build_is_refused() {
        assert!(matches!(
            Kernel::build(4.0, 4.0, 10.0),
            Err(EngineError::DegenerateKernel { .. })
        ));
        assert!(matches!(
            Kernel::build(-1.0, 4.0, 0.0),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn branch_and_modulo_wrap_agree() {
        let kernel = Kernel::build(3.0, 4.0, 1e-8).expect("kernel");
        let width = 8i32;
        let height = 6i32;
        let cells: Vec<f64> = (0..width * height).map(|i| f64::from(i) * 0.01).collect();
        for y in 0..height {
            for x in 0..width {
                let fast = kernel.potential(&cells, width, height, x, y);
                let checked = kernel.potential_modulo(&cells, width, height, x, y);
                assert_eq!(fast, checked, "wrap mismatch at ({x},{y})");
            }
        }
    }

    #[test]
    fn potential_sees_across_edges() {
        let kernel = Kernel::build(2.0, 4.0, 1e-8).expect("kernel");
        let width = 8i32;
        let height = 8i32;
        let mut cells = vec![0.0; (width * height) as usize];
        // Mass only on the far column and far row; (0, 0) must still see it.
        cells[(width - 1) as usize] = 1.0;
        cells[((height - 1) * width) as usize] = 1.0;
        let u = kernel.potential(&cells, width, height, 0, 0);
        assert!(u > 0.0, "wrap neighbors unreachable, potential={u}");
    }
}
