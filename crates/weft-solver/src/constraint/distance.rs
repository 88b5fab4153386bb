//! Distance constraints: keep particle pairs at a rest length.
//!
//! The workhorse constraint for ropes and cloth edges. Supports
//! per-batch plasticity, where rest lengths creep when the strain
//! exceeds the yield threshold.

use weft_types::constants::DEGENERATE_LENGTH_SQ;

use super::{xpbd_delta_lambda, Plasticity, SubstepContext};
use crate::particles::ParticleStore;

#[derive(Debug, Clone, Default)]
pub struct DistanceBatch {
    particles: Vec<[u32; 2]>,
    rest_lengths: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
    plasticity: Option<Plasticity>,
}

impl DistanceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replaces the batch contents wholesale. Slices must be equal
    /// length; multipliers are reset.
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

    pub fn set_plasticity(&mut self, plasticity: Option<Plasticity>) {
        self.plasticity = plasticity;
    }

    /// Current rest length of constraint `i`; shifts under plasticity.
    pub fn rest_length(&self, i: usize) -> f32 {
        self.rest_lengths[i]
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
            if len_sq < DEGENERATE_LENGTH_SQ {
                continue;
            }
            let len = len_sq.sqrt();
            let n = d / len;
            let mut c = len - self.rest_lengths[i];

            if let Some(p) = self.plasticity {
                if c.abs() > p.yield_threshold {
                    self.rest_lengths[i] += c * p.creep_rate * ctx.dt;
                    c = len - self.rest_lengths[i];
                }
            }

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
