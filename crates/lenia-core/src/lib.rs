//! Core simulation engine for a continuous cellular automaton (Lenia).
//!
//! Each generation, every cell's next value is a weighted neighborhood sum
//! (the "potential") over a toroidal grid, mapped through a bell-shaped
//! growth curve and blended back with a small time increment. The engine
//! owns two grid buffers swapped after each completed step, a precomputed
//! convolution kernel, and a hysteretic controller that trades fidelity for
//! step latency. Rendering, UI, and persistence live outside this crate and
//! only consume [`LeniaEngine::cells`] plus the parameter accessors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod grid;
pub mod growth;
pub mod kernel;
pub mod perf;
pub mod seed;

pub use config::{EngineConfig, GrowthEval, Preset, SimulationParams, MAX_DELTA_T};
pub use engine::{LeniaEngine, StepSummary};
pub use grid::Grid;
pub use growth::{growth_rate, GrowthLookup, LOOKUP_BUCKETS};
pub use kernel::{bump_profile, Kernel};
pub use perf::PerfController;

/// Errors raised while validating configuration or building derived artifacts.
///
/// All failures here are deterministic functions of the supplied
/// configuration and are surfaced synchronously; there is nothing to retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A kernel build retained no weights, which would divide by zero on
    /// normalization. Caused by an unreasonably high weight floor or a
    /// radius too small to reach any neighbor.
    #[error("kernel build retained no weights ({considered} offsets examined)")]
    DegenerateKernel { considered: usize },
}

/// Monotonic counter of completed simulation steps.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Generation(pub u64);

impl Generation {
    /// Returns the next sequential generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The state before any step has run.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}
