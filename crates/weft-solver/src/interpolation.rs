//! Render-state interpolation.
//!
//! Hosts that step the simulation at a fixed rate but render at a
//! variable one blend between the previous and current step states.
//! The solver captures the pre-step state in `begin_step`; the host
//! calls [`Solver::interpolate`](crate::Solver::interpolate) with its
//! frame-time remainder and reads the render buffers.

use weft_math::{Quat, Vec4};

use crate::particles::ParticleStore;

#[derive(Debug, Default)]
pub struct InterpolationBuffers {
    prev_positions: Vec<Vec4>,
    prev_orientations: Vec<Quat>,
    /// Blended positions, radius preserved in w.
    pub render_positions: Vec<Vec4>,
    /// Blended orientations.
    pub render_orientations: Vec<Quat>,
}

impl InterpolationBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the store's current state as the blend origin. Called at
    /// the start of every step, before integration moves anything.
    pub fn capture(&mut self, store: &ParticleStore) {
        self.prev_positions.clear();
        self.prev_positions.extend_from_slice(&store.positions);
        self.prev_orientations.clear();
        self.prev_orientations.extend_from_slice(&store.orientations);
    }

    /// Fills the render buffers with `lerp(prev, current, alpha)`.
    /// Orientations use normalized lerp, which is adequate for the
    /// small per-step rotations a stable simulation produces.
    pub fn blend(&mut self, store: &ParticleStore, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let n = store.positions.len();

        self.render_positions.resize(n, Vec4::ZERO);
        self.render_orientations.resize(n, Quat::IDENTITY);

        // A capture from before a resize may be shorter than the store;
        // uncovered slots pass through un-blended.
        let covered = self.prev_positions.len().min(n);

        for i in 0..covered {
            self.render_positions[i] = self.prev_positions[i].lerp(store.positions[i], alpha);
            self.render_orientations[i] = self.prev_orientations[i].lerp(store.orientations[i], alpha).normalize();
        }
        for i in covered..n {
            self.render_positions[i] = store.positions[i];
            self.render_orientations[i] = store.orientations[i];
        }
    }
}
