//! Static configuration for the engine and the update rule it runs.

use crate::EngineError;
use serde::{Deserialize, Serialize};

/// Stability ceiling for the integration step; larger values overshoot the
/// growth curve and oscillate.
pub const MAX_DELTA_T: f64 = 0.2;

/// Update-rule parameters shared by every fidelity variant.
///
/// Mutating any of these invalidates the cached kernel and growth lookup, so
/// they are applied as one bundle through [`crate::LeniaEngine::reconfigure`]
/// rather than through individual setters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationParams {
    /// Interaction radius in cells.
    pub r: f64,
    /// Integration step blended into each cell per generation.
    pub delta_t: f64,
    /// Growth-curve center: the potential yielding peak growth.
    pub mu: f64,
    /// Growth-curve width.
    pub sigma: f64,
    /// Sharpness of the bump-shaped kernel profile.
    pub kernel_alpha: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            r: 13.0,
            delta_t: 0.1,
            mu: 0.15,
            sigma: 0.016,
            kernel_alpha: 4.0,
        }
    }
}

impl SimulationParams {
    /// Validates the parameter bundle.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.r > 0.0) || !self.r.is_finite() {
            return Err(EngineError::InvalidConfig(
                "interaction radius must be positive",
            ));
        }
        if !(self.delta_t > 0.0) {
            return Err(EngineError::InvalidConfig(
                "integration step must be positive",
            ));
        }
        if self.delta_t > MAX_DELTA_T {
            return Err(EngineError::InvalidConfig(
                "integration step exceeds the stability ceiling",
            ));
        }
        if !(self.sigma > 0.0) {
            return Err(EngineError::InvalidConfig(
                "growth-curve width must be positive",
            ));
        }
        if !self.mu.is_finite() {
            return Err(EngineError::InvalidConfig(
                "growth-curve center must be finite",
            ));
        }
        if !(self.kernel_alpha > 0.0) {
            return Err(EngineError::InvalidConfig(
                "kernel sharpness must be positive",
            ));
        }
        Ok(())
    }
}

/// How the growth curve is evaluated per cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GrowthEval {
    /// One transcendental call per cell.
    #[default]
    Direct,
    /// Precomputed table with a clamped-index read; trades a bounded
    /// quantization error for the transcendental call.
    Lookup,
}

/// Static configuration for a [`crate::LeniaEngine`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Update-rule parameters.
    pub params: SimulationParams,
    /// Steps per second the performance controller budgets for.
    pub target_steps_per_second: u32,
    /// Kernel weights below this threshold are pruned before normalization.
    /// Larger values shrink the kernel at the cost of accuracy.
    pub weight_floor: f64,
    /// Growth evaluation strategy.
    pub growth_eval: GrowthEval,
    /// Whether the controller may move fidelity knobs after each step.
    pub adaptive_fidelity: bool,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
    /// Maximum number of recent step summaries retained in memory.
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            target_steps_per_second: 60,
            weight_floor: 1e-8,
            growth_eval: GrowthEval::Direct,
            adaptive_fidelity: true,
            rng_seed: None,
            history_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.params.validate()?;
        if self.target_steps_per_second == 0 {
            return Err(EngineError::InvalidConfig(
                "target step rate must be positive",
            ));
        }
        if !(self.weight_floor >= 0.0) || !self.weight_floor.is_finite() {
            return Err(EngineError::InvalidConfig(
                "weight floor must be finite and non-negative",
            ));
        }
        if self.history_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "history capacity must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Canonical parameter/pattern bundles for well-known Lenia species.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Preset {
    /// A gliding solitary creature; disk-seeded.
    Orbium,
    /// A dividing creature; ring-seeded.
    Geminium,
}

impl Preset {
    /// The update-rule parameters the species is stable under.
    #[must_use]
    pub fn params(self) -> SimulationParams {
        match self {
            Self::Orbium => SimulationParams::default(),
            Self::Geminium => SimulationParams {
                r: 10.0,
                delta_t: 0.1,
                mu: 0.14,
                sigma: 0.014,
                kernel_alpha: 4.0,
            },
        }
    }
}
