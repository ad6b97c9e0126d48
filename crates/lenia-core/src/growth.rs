//! Bell-shaped growth curve mapping potential to a signed rate of change.

/// Number of discretization buckets in the lookup table.
pub const LOOKUP_BUCKETS: usize = 1024;

/// Direct evaluation of the growth curve.
///
/// `g(u) = 2·exp(-0.5·z²) - 1` with `z = (u - mu) / sigma`; range `[-1, 1)`,
/// peaking at `u = mu`.
#[inline]
#[must_use]
pub fn growth_rate(u: f64, mu: f64, sigma: f64) -> f64 {
    let z = (u - mu) / sigma;
    2.0 * (-0.5 * z * z).exp() - 1.0
}

/// Fixed-resolution discretization of the growth curve over the potential
/// domain `[0, 1]`.
///
/// A pure performance artifact: removes one transcendental call per cell per
/// step. The approximation error is bounded by the curve's maximum slope
/// `2 / (sigma·sqrt(e))` times the bucket width `1 / (LOOKUP_BUCKETS - 1)`.
/// Rebuilt whenever `mu` or `sigma` changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthLookup {
    table: Vec<f64>,
}

impl GrowthLookup {
    /// Tabulate the curve for the given center and width.
    #[must_use]
    pub fn build(mu: f64, sigma: f64) -> Self {
        let mut table = Vec::with_capacity(LOOKUP_BUCKETS);
        for i in 0..LOOKUP_BUCKETS {
            let u = i as f64 / (LOOKUP_BUCKETS - 1) as f64;
            table.push(growth_rate(u, mu, sigma));
        }
        Self { table }
    }

    /// Documented worst-case deviation from direct evaluation for inputs in
    /// `[0, 1]`.
    #[must_use]
    pub fn error_bound(sigma: f64) -> f64 {
        let max_slope = 2.0 / (sigma * std::f64::consts::E.sqrt());
        max_slope / (LOOKUP_BUCKETS - 1) as f64
    }

    /// Clamped-index table read; inputs outside `[0, 1]` use the nearest
    /// bucket.
    #[inline]
    #[must_use]
    pub fn sample(&self, u: f64) -> f64 {
        let raw = (u * (LOOKUP_BUCKETS - 1) as f64) as isize;
        let index = raw.clamp(0, LOOKUP_BUCKETS as isize - 1) as usize;
        self.table[index]
    }
}
