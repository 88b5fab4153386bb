//! # weft-solver
//!
//! The XPBD particle solver at the heart of Weft.
//!
//! ## Key Types
//!
//! - [`ParticleStore`] — SoA buffers for positions, velocities, masses,
//!   orientations, with free-list range allocation
//! - [`constraint::ConstraintBatch`] — one homogeneous, conflict-free
//!   batch of constraints of a single type
//! - [`ConstraintBatcher`] — greedy graph coloring that partitions
//!   constraints into conflict-free batches
//! - [`Solver`] — the step orchestrator: collision, substeps,
//!   integration, contact events, interpolation
//! - [`ActorBlueprint`] — particle + constraint template for ropes,
//!   cloth grids, and custom actors

pub mod batcher;
pub mod blueprint;
pub mod config;
pub mod constraint;
pub mod interpolation;
pub mod particles;
pub mod solver;

pub use batcher::ConstraintBatcher;
pub use blueprint::ActorBlueprint;
pub use config::{ExecutionMode, SolverConfig};
pub use constraint::{ConstraintBatch, ConstraintKind, Plasticity, SubstepContext};
pub use particles::{ParticleRange, ParticleStore};
pub use solver::{Actor, CollisionBackend, PostStepFn, Solver, StitchSpec};
