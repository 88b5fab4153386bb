//! Constraint batches and the XPBD core.
//!
//! Every constraint type lives in its own homogeneous batch struct
//! with parallel arrays: particle indices, per-constraint parameters,
//! and accumulated Lagrange multipliers. [`ConstraintBatch`] wraps the
//! ten types in an enum so the solver can hold mixed lists and
//! dispatch without virtual calls.
//!
//! All positional types share the same XPBD update: for constraint
//! function `C` with compliance `a`, the multiplier increment is
//!
//! ```text
//! dL = (-C - (a / dt^2) * L) / (sum_j w_j |grad_j C|^2 + a / dt^2 + eps)
//! ```
//!
//! and each particle moves by `w_j * dL * grad_j C`. Multipliers reset
//! at the start of every substep.

use serde::{Deserialize, Serialize};
use weft_math::Vec3;
use weft_types::constants::XPBD_EPSILON;

use crate::particles::ParticleStore;

pub mod aerodynamic;
pub mod bend;
pub mod bend_twist;
pub mod distance;
pub mod shape_matching;
pub mod skin;
pub mod stitch;
pub mod stretch_shear;
pub mod tether;
pub mod volume;

pub use aerodynamic::AerodynamicBatch;
pub use bend::BendBatch;
pub use bend_twist::BendTwistBatch;
pub use distance::DistanceBatch;
pub use shape_matching::ShapeMatchingBatch;
pub use skin::SkinBatch;
pub use stitch::StitchBatch;
pub use stretch_shear::StretchShearBatch;
pub use tether::TetherBatch;
pub use volume::VolumeBatch;

/// Per-substep data passed to every batch evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SubstepContext {
    /// Full step duration.
    pub step_dt: f32,
    /// Substep duration; the `dt` in the XPBD update.
    pub dt: f32,
    /// Ambient wind velocity for aerodynamic constraints.
    pub wind: Vec3,
}

/// Plastic yield parameters shared by a batch.
///
/// When the constraint violation exceeds `yield_threshold`, the rest
/// value creeps toward the current state at `creep_rate` per second,
/// evaluated once per substep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plasticity {
    pub yield_threshold: f32,
    pub creep_rate: f32,
}

/// The XPBD multiplier increment for a scalar constraint.
#[inline]
pub(crate) fn xpbd_delta_lambda(c: f32, lambda: f32, w_sum: f32, compliance: f32, dt: f32) -> f32 {
    let alpha = compliance / (dt * dt);
    (-c - alpha * lambda) / (w_sum + alpha + XPBD_EPSILON)
}

/// Constraint type tags, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Tether,
    Stitch,
    Distance,
    Bend,
    BendTwist,
    StretchShear,
    Volume,
    Skin,
    ShapeMatching,
    Aerodynamic,
}

impl ConstraintKind {
    /// The fixed order in which the solver visits constraint types
    /// within an iteration. Long-range types first so local detail
    /// constraints get the last word, velocity-level aerodynamics last.
    pub const EVALUATION_ORDER: [ConstraintKind; 10] = [
        ConstraintKind::Tether,
        ConstraintKind::Stitch,
        ConstraintKind::Distance,
        ConstraintKind::Bend,
        ConstraintKind::BendTwist,
        ConstraintKind::StretchShear,
        ConstraintKind::Volume,
        ConstraintKind::Skin,
        ConstraintKind::ShapeMatching,
        ConstraintKind::Aerodynamic,
    ];
}

/// One conflict-free batch of constraints of a single type.
#[derive(Debug, Clone)]
pub enum ConstraintBatch {
    Tether(TetherBatch),
    Stitch(StitchBatch),
    Distance(DistanceBatch),
    Bend(BendBatch),
    BendTwist(BendTwistBatch),
    StretchShear(StretchShearBatch),
    Volume(VolumeBatch),
    Skin(SkinBatch),
    ShapeMatching(ShapeMatchingBatch),
    Aerodynamic(AerodynamicBatch),
}

impl ConstraintBatch {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Tether(_) => ConstraintKind::Tether,
            Self::Stitch(_) => ConstraintKind::Stitch,
            Self::Distance(_) => ConstraintKind::Distance,
            Self::Bend(_) => ConstraintKind::Bend,
            Self::BendTwist(_) => ConstraintKind::BendTwist,
            Self::StretchShear(_) => ConstraintKind::StretchShear,
            Self::Volume(_) => ConstraintKind::Volume,
            Self::Skin(_) => ConstraintKind::Skin,
            Self::ShapeMatching(_) => ConstraintKind::ShapeMatching,
            Self::Aerodynamic(_) => ConstraintKind::Aerodynamic,
        }
    }

    /// Number of constraints in the batch.
    pub fn len(&self) -> usize {
        match self {
            Self::Tether(b) => b.len(),
            Self::Stitch(b) => b.len(),
            Self::Distance(b) => b.len(),
            Self::Bend(b) => b.len(),
            Self::BendTwist(b) => b.len(),
            Self::StretchShear(b) => b.len(),
            Self::Volume(b) => b.len(),
            Self::Skin(b) => b.len(),
            Self::ShapeMatching(b) => b.len(),
            Self::Aerodynamic(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zeroes accumulated multipliers. Called at the start of every
    /// substep.
    pub fn reset_lambdas(&mut self) {
        match self {
            Self::Tether(b) => b.reset_lambdas(),
            Self::Stitch(b) => b.reset_lambdas(),
            Self::Distance(b) => b.reset_lambdas(),
            Self::Bend(b) => b.reset_lambdas(),
            Self::BendTwist(b) => b.reset_lambdas(),
            Self::StretchShear(b) => b.reset_lambdas(),
            Self::Volume(b) => b.reset_lambdas(),
            Self::Skin(b) => b.reset_lambdas(),
            Self::ShapeMatching(_) => {}
            Self::Aerodynamic(_) => {}
        }
    }

    /// Computes corrections into the store's delta accumulators.
    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        match self {
            Self::Tether(b) => b.evaluate(store, ctx),
            Self::Stitch(b) => b.evaluate(store, ctx),
            Self::Distance(b) => b.evaluate(store, ctx),
            Self::Bend(b) => b.evaluate(store, ctx),
            Self::BendTwist(b) => b.evaluate(store, ctx),
            Self::StretchShear(b) => b.evaluate(store, ctx),
            Self::Volume(b) => b.evaluate(store, ctx),
            Self::Skin(b) => b.evaluate(store, ctx),
            Self::ShapeMatching(b) => b.evaluate(store, ctx),
            Self::Aerodynamic(b) => b.evaluate(store, ctx),
        }
    }

    /// Folds accumulated corrections into the particles this batch
    /// touches. A particle already drained by another batch is a
    /// no-op, so joint application never double-counts.
    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        match self {
            Self::Tether(b) => b.apply(store, sor),
            Self::Stitch(b) => b.apply(store, sor),
            Self::Distance(b) => b.apply(store, sor),
            Self::Bend(b) => b.apply(store, sor),
            Self::BendTwist(b) => b.apply(store, sor),
            Self::StretchShear(b) => b.apply(store, sor),
            Self::Volume(b) => b.apply(store, sor),
            Self::Skin(b) => b.apply(store, sor),
            Self::ShapeMatching(b) => b.apply(store, sor),
            Self::Aerodynamic(_) => {}
        }
    }
}
