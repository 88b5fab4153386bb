//! Stitch constraints: distance links across actor boundaries.
//!
//! Identical math to a distance constraint, but the two particles may
//! belong to different actors, so stitches live in solver-owned
//! batches rather than actor-owned ones. The usual rest length is
//! zero, gluing the particles together.

use weft_types::constants::DEGENERATE_LENGTH_SQ;

use super::{xpbd_delta_lambda, SubstepContext};
use crate::particles::ParticleStore;

#[derive(Debug, Clone, Default)]
pub struct StitchBatch {
    particles: Vec<[u32; 2]>,
    rest_lengths: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
}

impl StitchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn set_constraints(&mut self, particles: &[[u32; 2]], rest_lengths: &[f32], compliances: &[f32]) {
        debug_assert_eq!(particles.len(), rest_lengths.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.rest_lengths.clear();
        self.rest_lengths.extend_from_slice(rest_lengths);
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
            let [a, b] = self.particles[i];
            let (a, b) = (a as usize, b as usize);
            let wa = store.inv_masses[a];
            let wb = store.inv_masses[b];
            let w_sum = wa + wb;
            if w_sum == 0.0 {
                continue;
            }

            let d = store.position(b) - store.position(a);
            let len_sq = d.length_squared();
            let rest = self.rest_lengths[i];

            // Zero-rest stitches still need a correction when the gap
            // is tiny but nonzero; only a truly coincident pair skips.
            if len_sq < DEGENERATE_LENGTH_SQ {
                continue;
            }
            let len = len_sq.sqrt();
            let n = d / len;
            let c = len - rest;

            let dl = xpbd_delta_lambda(c, self.lambdas[i], w_sum, self.compliances[i], ctx.dt);
            self.lambdas[i] += dl;

            store.accumulate_delta(a, n * (-dl * wa));
            store.accumulate_delta(b, n * (dl * wb));
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &[a, b] in &self.particles {
            store.apply_delta(a as usize, sor);
            store.apply_delta(b as usize, sor);
        }
    }
}
