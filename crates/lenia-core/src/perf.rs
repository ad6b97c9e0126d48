//! Hysteretic controller trading simulation fidelity for step latency.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Lowest quality the controller will degrade to.
pub const QUALITY_FLOOR: u32 = 25;
/// Full fidelity.
pub const QUALITY_CEILING: u32 = 100;
/// Largest cell-skip stride.
pub const MAX_CELL_SKIP: usize = 4;
/// Largest grid partition count.
pub const MAX_CHUNKS: usize = 16;

/// Fraction of the frame budget reserved for the grid update itself; the
/// remainder is left to the rendering collaborator.
const UPDATE_BUDGET_FRACTION: f64 = 0.7;
/// Upgrades require the step to finish well under the update budget; the
/// gap between this and the degrade threshold is the hysteresis band.
const UPGRADE_FRACTION: f64 = 0.5;

/// Per-step fidelity state owned by the engine.
///
/// Observes the wall-clock cost of each completed step and nudges three
/// knobs — quality percentage, cell-skip stride, and chunk count — toward
/// the configured frame budget. Not an optimal controller: transitions are
/// monotone and bounded, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerfController {
    target_frame_time: Duration,
    last_step: Duration,
    quality_percent: u32,
    cell_skip: usize,
    chunk_count: usize,
    chunk_cursor: usize,
}

impl PerfController {
    /// Seed fidelity knobs from the grid size before any feedback exists.
    #[must_use]
    pub fn for_grid(total_cells: usize, target_steps_per_second: u32) -> Self {
        let (quality_percent, cell_skip, chunk_count) = match total_cells {
            0..=576 => (100, 1, 1),
            577..=1_600 => (80, 1, 2),
            1_601..=4_096 => (60, 2, 4),
            4_097..=10_000 => (40, 3, 8),
            _ => (QUALITY_FLOOR, MAX_CELL_SKIP, MAX_CHUNKS),
        };
        Self {
            target_frame_time: frame_time(target_steps_per_second),
            last_step: Duration::ZERO,
            quality_percent,
            cell_skip,
            chunk_count,
            chunk_cursor: 0,
        }
    }

    /// Update the frame budget for a new target rate.
    pub fn set_target_rate(&mut self, steps_per_second: u32) {
        self.target_frame_time = frame_time(steps_per_second);
    }

    /// Pin the fidelity knobs, clamped to their bounds. Used by callers that
    /// want deterministic coverage regardless of grid size.
    pub fn set_fidelity(&mut self, quality_percent: u32, cell_skip: usize, chunk_count: usize) {
        self.quality_percent = quality_percent.clamp(QUALITY_FLOOR, QUALITY_CEILING);
        self.cell_skip = cell_skip.clamp(1, MAX_CELL_SKIP);
        self.chunk_count = chunk_count.clamp(1, MAX_CHUNKS);
        self.chunk_cursor %= self.chunk_count;
    }

    #[must_use]
    pub const fn quality_percent(&self) -> u32 {
        self.quality_percent
    }

    #[must_use]
    pub const fn cell_skip(&self) -> usize {
        self.cell_skip
    }

    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Wall-clock duration of the most recent step.
    #[must_use]
    pub const fn last_step_duration(&self) -> Duration {
        self.last_step
    }

    #[must_use]
    pub const fn target_frame_time(&self) -> Duration {
        self.target_frame_time
    }

    /// Consume and rotate the chunk cursor for the next partial update.
    pub(crate) fn advance_chunk(&mut self) -> usize {
        let current = self.chunk_cursor;
        self.chunk_cursor = (current + 1) % self.chunk_count;
        current
    }

    /// Record a step duration without adjusting any knob.
    pub(crate) fn record(&mut self, elapsed: Duration) {
        self.last_step = elapsed;
    }

    /// Feed one completed step's wall-clock duration into the control loop.
    pub fn observe(&mut self, elapsed: Duration) {
        self.last_step = elapsed;
        let budget = self.target_frame_time.as_secs_f64() * UPDATE_BUDGET_FRACTION;
        let took = elapsed.as_secs_f64();

        if took > budget {
            if self.quality_percent > QUALITY_FLOOR {
                self.quality_percent = self.quality_percent.saturating_sub(10).max(QUALITY_FLOOR);
                self.cell_skip = (self.cell_skip + 1).min(MAX_CELL_SKIP);
                self.chunk_count = (self.chunk_count * 2).min(MAX_CHUNKS);
                self.chunk_cursor %= self.chunk_count;
                debug!(
                    quality = self.quality_percent,
                    cell_skip = self.cell_skip,
                    chunks = self.chunk_count,
                    took_ms = took * 1e3,
                    "fidelity degraded"
                );
            }
        } else if took < budget * UPGRADE_FRACTION && self.quality_percent < QUALITY_CEILING {
            self.quality_percent = (self.quality_percent + 5).min(QUALITY_CEILING);
            if self.quality_percent > 75 {
                self.cell_skip = self.cell_skip.saturating_sub(1).max(1);
                self.chunk_count = (self.chunk_count / 2).max(1);
                self.chunk_cursor %= self.chunk_count;
            }
            debug!(
                quality = self.quality_percent,
                cell_skip = self.cell_skip,
                chunks = self.chunk_count,
                "fidelity upgraded"
            );
        }
    }
}

fn frame_time(steps_per_second: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(steps_per_second))
}
