//! Solver configuration.
//!
//! All tunables that shape a simulation step live here, serializable
//! so that scenario files and the CLI can load them from TOML/JSON.

use serde::{Deserialize, Serialize};
use weft_types::constants;
use weft_types::error::{WeftError, WeftResult};

/// How constraint batches are scheduled within a substep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Evaluate and apply each batch before moving to the next.
    /// Gauss-Seidel flavored: faster convergence, order dependent.
    Sequential,
    /// Evaluate every batch of a constraint type, then apply all
    /// accumulated corrections averaged per particle. Jacobi flavored:
    /// order independent, slower convergence.
    Parallel,
}

/// Top-level solver tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Substeps per step. Each substep integrates, solves constraints,
    /// and rebuilds velocities at `dt / substeps`.
    pub substeps: u32,
    /// Constraint solver iterations per substep.
    pub iterations: u32,
    /// Gravity in world space (m/s^2).
    pub gravity: [f32; 3],
    /// Ambient wind velocity, consumed by aerodynamic constraints.
    pub wind: [f32; 3],
    /// Velocity damping per second; 0 disables.
    pub damping: f32,
    /// Successive over-relaxation factor applied to averaged
    /// corrections. 1.0 is plain averaging.
    pub sor_factor: f32,
    /// Batch scheduling mode.
    pub mode: ExecutionMode,
    /// Velocity magnitude cap (m/s); guards against blowups.
    pub max_velocity: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            substeps: constants::DEFAULT_SUBSTEPS,
            iterations: constants::DEFAULT_ITERATIONS,
            gravity: [0.0, -constants::GRAVITY, 0.0],
            wind: [0.0, 0.0, 0.0],
            damping: 0.0,
            sor_factor: constants::DEFAULT_SOR_FACTOR,
            mode: ExecutionMode::Sequential,
            max_velocity: 100.0,
        }
    }
}

impl SolverConfig {
    /// Cheap preset for interactive debugging: one substep, one iteration.
    pub fn debug() -> Self {
        Self {
            substeps: 1,
            iterations: 1,
            ..Self::default()
        }
    }

    /// Preset tuned for stiff cloth and rods.
    pub fn high_quality() -> Self {
        Self {
            substeps: 8,
            iterations: 2,
            ..Self::default()
        }
    }

    /// Validates ranges; call after deserializing from a file.
    pub fn validate(&self) -> WeftResult<()> {
        if self.substeps == 0 {
            return Err(WeftError::InvalidConfig("substeps must be >= 1".into()));
        }
        if self.iterations == 0 {
            return Err(WeftError::InvalidConfig("iterations must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(WeftError::InvalidConfig(format!(
                "damping must be in [0, 1], got {}",
                self.damping
            )));
        }
        if self.sor_factor <= 0.0 || self.sor_factor > 2.0 {
            return Err(WeftError::InvalidConfig(format!(
                "sor_factor must be in (0, 2], got {}",
                self.sor_factor
            )));
        }
        if self.max_velocity <= 0.0 {
            return Err(WeftError::InvalidConfig("max_velocity must be positive".into()));
        }
        Ok(())
    }
}
