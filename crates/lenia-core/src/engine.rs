//! Double-buffered simulation engine tying the components together.

use crate::config::{EngineConfig, GrowthEval, Preset, SimulationParams};
use crate::grid::Grid;
use crate::growth::{growth_rate, GrowthLookup};
use crate::kernel::Kernel;
use crate::perf::PerfController;
use crate::{EngineError, Generation};
use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Metrics recorded after each completed generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepSummary {
    pub generation: Generation,
    pub duration: Duration,
    pub quality_percent: u32,
    pub cell_skip: usize,
    pub chunk_count: usize,
    pub mean_cell_value: f64,
}

/// Continuous cellular automaton engine over a toroidal grid.
///
/// Owns two grid buffers; each [`step`](Self::step) writes the next
/// generation into the back buffer, swaps ownership, and advances the
/// generation counter, so readers of [`cells`](Self::cells) only ever
/// observe a complete generation. `&mut self` on every mutating operation
/// is the single-writer discipline: a resize cannot race an in-flight step.
pub struct LeniaEngine {
    config: EngineConfig,
    grid: Grid,
    next: Grid,
    kernel: Kernel,
    lookup: Option<GrowthLookup>,
    perf: PerfController,
    generation: Generation,
    rng: SmallRng,
    history: VecDeque<StepSummary>,
}

impl fmt::Debug for LeniaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeniaEngine")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("generation", &self.generation)
            .field("kernel_entries", &self.kernel.len())
            .finish()
    }
}

impl LeniaEngine {
    /// Instantiate an engine with a uniformly random initial grid.
    pub fn new(width: u32, height: u32, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut grid = Grid::new(width, height, 0.0)?;
        let next = Grid::new(width, height, 0.0)?;
        let kernel = Kernel::build(
            config.params.r,
            config.params.kernel_alpha,
            config.weight_floor,
        )?;
        let lookup = match config.growth_eval {
            GrowthEval::Lookup => Some(GrowthLookup::build(config.params.mu, config.params.sigma)),
            GrowthEval::Direct => None,
        };
        let perf = PerfController::for_grid(grid.len(), config.target_steps_per_second);
        let mut rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        };
        grid.seed_random_uniform(&mut rng);
        let history = VecDeque::with_capacity(config.history_capacity);
        Ok(Self {
            config,
            grid,
            next,
            kernel,
            lookup,
            perf,
            generation: Generation::zero(),
            rng,
            history,
        })
    }

    /// Advance the simulation by exactly one generation.
    ///
    /// With `chunk_count > 1` only one row window is recomputed per call;
    /// the remaining rows are carried forward unchanged so the published
    /// grid is always whole.
    pub fn step(&mut self) {
        let started = Instant::now();
        let height = self.grid.height() as usize;

        let (row_start, row_end) = if self.perf.chunk_count() > 1 {
            let chunk = self.perf.advance_chunk();
            let rows_per_chunk = height.div_ceil(self.perf.chunk_count());
            let start = (chunk * rows_per_chunk).min(height);
            let end = ((chunk + 1) * rows_per_chunk).min(height);
            (start, end)
        } else {
            (0, height)
        };

        self.compute_rows(row_start, row_end);
        self.carry_untouched_rows(row_start, row_end);
        std::mem::swap(&mut self.grid, &mut self.next);
        self.generation = self.generation.next();

        let elapsed = started.elapsed();
        if self.config.adaptive_fidelity {
            self.perf.observe(elapsed);
        } else {
            self.perf.record(elapsed);
        }
        self.push_summary(elapsed);
    }

    /// Compute next-generation values for rows `[row_start, row_end)`.
    ///
    /// Rows fan out across the rayon pool; every worker writes a disjoint
    /// slice of the back buffer while the front buffer stays read-only, so
    /// no locks are needed and the parallel scope itself is the barrier
    /// before the swap. With `cell_skip > 1` only anchor cells are
    /// evaluated and their value is replicated across the skipped columns
    /// and rows (a deliberate approximation, not interpolation).
    fn compute_rows(&mut self, row_start: usize, row_end: usize) {
        if row_start >= row_end {
            return;
        }
        let width = self.grid.width() as usize;
        let width_i = self.grid.width() as i32;
        let height_i = self.grid.height() as i32;
        let skip = self.perf.cell_skip();
        let SimulationParams {
            delta_t, mu, sigma, ..
        } = self.config.params;
        let kernel = &self.kernel;
        let lookup = self.lookup.as_ref();
        // Branch wrap mis-indexes once an offset can lap the grid.
        let use_modulo = kernel.reach() > width_i.min(height_i);
        let cells = self.grid.cells();

        let next_rows = &mut self.next.cells_mut()[row_start * width..row_end * width];
        next_rows
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(i, row)| {
                if skip > 1 && i % skip != 0 {
                    return;
                }
                let y = row_start + i;
                let mut x = 0usize;
                while x < width {
                    let u = if use_modulo {
                        kernel.potential_modulo(cells, width_i, height_i, x as i32, y as i32)
                    } else {
                        kernel.potential(cells, width_i, height_i, x as i32, y as i32)
                    };
                    let g = match lookup {
                        Some(table) => table.sample(u),
                        None => growth_rate(u, mu, sigma),
                    };
                    let value = (cells[y * width + x] + delta_t * g).clamp(0.0, 1.0);
                    row[x] = value;
                    for fill in 1..skip {
                        if x + fill < width {
                            row[x + fill] = value;
                        }
                    }
                    x += skip;
                }
            });

        if skip > 1 {
            let next = self.next.cells_mut();
            for y in row_start..row_end {
                let rel = y - row_start;
                if rel % skip == 0 {
                    continue;
                }
                let anchor = y - rel % skip;
                next.copy_within(anchor * width..(anchor + 1) * width, y * width);
            }
        }
    }

    /// Carry rows outside the active chunk forward from the front buffer so
    /// the swap publishes one coherent generation.
    fn carry_untouched_rows(&mut self, row_start: usize, row_end: usize) {
        let width = self.grid.width() as usize;
        let height = self.grid.height() as usize;
        if row_start == 0 && row_end == height {
            return;
        }
        let current = self.grid.cells();
        let next = self.next.cells_mut();
        next[..row_start * width].copy_from_slice(&current[..row_start * width]);
        next[row_end * width..].copy_from_slice(&current[row_end * width..]);
    }

    fn push_summary(&mut self, duration: Duration) {
        let mean_cell_value = self.grid.cells().iter().sum::<f64>() / self.grid.len() as f64;
        let summary = StepSummary {
            generation: self.generation,
            duration,
            quality_percent: self.perf.quality_percent(),
            cell_skip: self.perf.cell_skip(),
            chunk_count: self.perf.chunk_count(),
            mean_cell_value,
        };
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Reallocate both buffers for the new extent, best-effort copying the
    /// overlapping top-left block, then rebuild the kernel and re-seed the
    /// fidelity knobs from the size table. Stop-the-world by construction.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), EngineError> {
        let mut grid = Grid::new(new_width, new_height, 0.0)?;
        let next = Grid::new(new_width, new_height, 0.0)?;
        let kernel = Kernel::build(
            self.config.params.r,
            self.config.params.kernel_alpha,
            self.config.weight_floor,
        )?;

        let copy_w = self.grid.width().min(new_width) as usize;
        let copy_h = self.grid.height().min(new_height) as usize;
        let old_w = self.grid.width() as usize;
        let new_w = new_width as usize;
        {
            let old_cells = self.grid.cells();
            let cells = grid.cells_mut();
            for y in 0..copy_h {
                cells[y * new_w..y * new_w + copy_w]
                    .copy_from_slice(&old_cells[y * old_w..y * old_w + copy_w]);
            }
        }

        self.grid = grid;
        self.next = next;
        self.kernel = kernel;
        self.perf = PerfController::for_grid(self.grid.len(), self.config.target_steps_per_second);
        debug!(width = new_width, height = new_height, "grid resized");
        Ok(())
    }

    /// Apply a new parameter bundle atomically: validate, rebuild the kernel
    /// and growth lookup, then commit. On error the engine is unchanged.
    pub fn reconfigure(&mut self, params: SimulationParams) -> Result<(), EngineError> {
        params.validate()?;
        let kernel = Kernel::build(params.r, params.kernel_alpha, self.config.weight_floor)?;
        let lookup = match self.config.growth_eval {
            GrowthEval::Lookup => Some(GrowthLookup::build(params.mu, params.sigma)),
            GrowthEval::Direct => None,
        };
        self.config.params = params;
        self.kernel = kernel;
        self.lookup = lookup;
        Ok(())
    }

    /// Update the frame-budget target consumed by the controller.
    pub fn set_target_rate(&mut self, steps_per_second: u32) -> Result<(), EngineError> {
        if steps_per_second == 0 {
            return Err(EngineError::InvalidConfig(
                "target step rate must be positive",
            ));
        }
        self.config.target_steps_per_second = steps_per_second;
        self.perf.set_target_rate(steps_per_second);
        Ok(())
    }

    /// Reconfigure to a species' canonical parameters and seed its pattern,
    /// scaled to the grid.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), EngineError> {
        self.reconfigure(preset.params())?;
        let width = self.grid.width();
        let height = self.grid.height();
        let extent = width.min(height);
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        match preset {
            Preset::Orbium => {
                let radius = (extent / 4).max(4);
                self.grid.seed_circle(cx, cy, radius);
            }
            Preset::Geminium => {
                let outer = (extent / 3).max(6);
                let inner = outer * 2 / 3;
                self.grid.seed_ring(cx, cy, inner, outer);
            }
        }
        Ok(())
    }

    /// Seed a filled disk.
    pub fn seed_circle(&mut self, cx: i32, cy: i32, radius: u32) {
        self.grid.seed_circle(cx, cy, radius);
    }

    /// Seed an annulus.
    pub fn seed_ring(&mut self, cx: i32, cy: i32, inner: u32, outer: u32) {
        self.grid.seed_ring(cx, cy, inner, outer);
    }

    /// Seed a cross of two perpendicular bars.
    pub fn seed_cross(&mut self, cx: i32, cy: i32, arm_length: u32, thickness: u32) {
        self.grid.seed_cross(cx, cy, arm_length, thickness);
    }

    /// Seed every cell uniformly at random from the engine RNG.
    pub fn seed_random_uniform(&mut self) {
        self.grid.seed_random_uniform(&mut self.rng);
    }

    /// Seed a Bernoulli-masked random fill.
    pub fn seed_random_density(&mut self, density: f64) {
        self.grid.seed_random_density(density, &mut self.rng);
    }

    /// Set every cell to zero.
    pub fn clear(&mut self) {
        self.grid.fill(0.0);
    }

    /// Row-major snapshot of the last completed generation.
    #[must_use]
    pub fn cells(&self) -> &[f64] {
        self.grid.cells()
    }

    /// The current grid buffer.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the current grid buffer, e.g. for injecting
    /// patterns the seeders do not cover.
    #[must_use]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Completed generation count.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Current update-rule parameters.
    #[must_use]
    pub const fn params(&self) -> &SimulationParams {
        &self.config.params
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The active convolution kernel.
    #[must_use]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Read access to the performance controller and its knobs.
    #[must_use]
    pub fn perf(&self) -> &PerfController {
        &self.perf
    }

    /// Mutable controller access, e.g. to pin fidelity for reproducibility.
    #[must_use]
    pub fn perf_mut(&mut self) -> &mut PerfController {
        &mut self.perf
    }

    /// Wall-clock duration of the most recent step.
    #[must_use]
    pub fn last_step_duration(&self) -> Duration {
        self.perf.last_step_duration()
    }

    /// Iterate over retained step summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StepSummary> {
        self.history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_config() -> EngineConfig {
        EngineConfig {
            adaptive_fidelity: false,
            rng_seed: Some(42),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn construction_randomizes_grid() {
        let engine = LeniaEngine::new(32, 32, fixed_config()).expect("engine");
        assert_eq!(engine.generation(), Generation::zero());
        assert!(engine.cells().iter().any(|&v| v > 0.0));
        assert!(engine.cells().iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn step_advances_generation_and_records_history() {
        let mut engine = LeniaEngine::new(32, 32, fixed_config()).expect("engine");
        engine.step();
        engine.step();
        assert_eq!(engine.generation(), Generation(2));
        let summaries: Vec<_> = engine.history().collect();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].generation, Generation(2));
    }

    #[test]
    fn history_is_bounded_by_capacity() {
        let config = EngineConfig {
            history_capacity: 4,
            ..fixed_config()
        };
        let mut engine = LeniaEngine::new(16, 16, config).expect("engine");
        for _ in 0..10 {
            engine.step();
        }
        assert_eq!(engine.history().count(), 4);
        assert_eq!(
            engine.history().next().expect("oldest").generation,
            Generation(7)
        );
    }

    #[test]
    fn clear_zeroes_the_snapshot() {
        let mut engine = LeniaEngine::new(24, 24, fixed_config()).expect("engine");
        engine.step();
        engine.clear();
        assert!(engine.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn reconfigure_rejects_bad_params_and_keeps_state() {
        let mut engine = LeniaEngine::new(24, 24, fixed_config()).expect("engine");
        let before_r = engine.params().r;
        let bad = SimulationParams {
            sigma: 0.0,
            ..SimulationParams::default()
        };
        assert!(engine.reconfigure(bad).is_err());
        assert_eq!(engine.params().r, before_r);
    }

    #[test]
    fn reconfigure_swaps_kernel() {
        let mut engine = LeniaEngine::new(24, 24, fixed_config()).expect("engine");
        let before = engine.kernel().len();
        engine
            .reconfigure(SimulationParams {
                r: 4.0,
                ..SimulationParams::default()
            })
            .expect("reconfigure");
        assert!(engine.kernel().len() < before);
    }

    #[test]
    fn preset_reseeds_pattern_and_params() {
        let mut engine = LeniaEngine::new(64, 64, fixed_config()).expect("engine");
        engine.apply_preset(Preset::Geminium).expect("preset");
        assert_eq!(engine.params().r, 10.0);
        // Ring leaves the center empty.
        assert_eq!(engine.grid().get(32, 32), Some(0.0));
        assert!(engine.cells().iter().any(|&v| v == 1.0));
    }
}
