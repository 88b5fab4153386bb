//! Tether constraints: one-sided long-range distance caps.
//!
//! A tether ties a dynamic particle to an anchor (usually a pinned
//! particle) and activates only when their separation exceeds
//! `max_length * scale`. Inactive tethers contribute nothing, so long
//! ropes can carry many of them at negligible cost.

use weft_types::constants::DEGENERATE_LENGTH_SQ;

use super::{xpbd_delta_lambda, SubstepContext};
use crate::particles::ParticleStore;

/// Particle order per constraint: `[dynamic, anchor]`.
#[derive(Debug, Clone, Default)]
pub struct TetherBatch {
    particles: Vec<[u32; 2]>,
    max_lengths: Vec<f32>,
    scales: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
}

impl TetherBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn set_constraints(
        &mut self,
        particles: &[[u32; 2]],
        max_lengths: &[f32],
        scales: &[f32],
        compliances: &[f32],
    ) {
        debug_assert_eq!(particles.len(), max_lengths.len());
        debug_assert_eq!(particles.len(), scales.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.max_lengths.clear();
        self.max_lengths.extend_from_slice(max_lengths);
        self.scales.clear();
        self.scales.extend_from_slice(scales);
        self.compliances.clear();
        self.compliances.extend_from_slice(compliances);
        self.lambdas.clear();
        self.lambdas.resize(particles.len(), 0.0);
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(0.0);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let [p, anchor] = self.particles[i];
            let (p, anchor) = (p as usize, anchor as usize);
            let wp = store.inv_masses[p];
            let wa = store.inv_masses[anchor];
            let w_sum = wp + wa;
            if w_sum == 0.0 {
                continue;
            }

            let d = store.position(p) - store.position(anchor);
            let len_sq = d.length_squared();
            if len_sq < DEGENERATE_LENGTH_SQ {
                continue;
            }
            let len = len_sq.sqrt();
            let limit = self.max_lengths[i] * self.scales[i];
            let c = len - limit;
            if c <= 0.0 {
                // Inside the limit; inequality constraint is inactive.
                continue;
            }
            let n = d / len;

            let dl = xpbd_delta_lambda(c, self.lambdas[i], w_sum, self.compliances[i], ctx.dt);
            self.lambdas[i] += dl;

            store.accumulate_delta(p, n * (dl * wp));
            store.accumulate_delta(anchor, n * (-dl * wa));
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &[p, anchor] in &self.particles {
            store.apply_delta(p as usize, sor);
            store.apply_delta(anchor as usize, sor);
        }
    }
}
