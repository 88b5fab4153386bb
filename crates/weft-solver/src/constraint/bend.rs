//! Three-particle bend constraints.
//!
//! Constrains the center particle's distance from the midpoint of the
//! two outer particles. A rest bend of zero keeps a rope straight;
//! positive values hold a kink. Plasticity creeps the rest bend so a
//! wire holds its shape after bending past the yield point.

use weft_types::constants::DEGENERATE_LENGTH_SQ;

use super::{xpbd_delta_lambda, Plasticity, SubstepContext};
use crate::particles::ParticleStore;

/// Particle order per constraint: `[outer0, center, outer1]`.
#[derive(Debug, Clone, Default)]
pub struct BendBatch {
    particles: Vec<[u32; 3]>,
    rest_bends: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
    plasticity: Option<Plasticity>,
}

impl BendBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn set_constraints(&mut self, particles: &[[u32; 3]], rest_bends: &[f32], compliances: &[f32]) {
        debug_assert_eq!(particles.len(), rest_bends.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.rest_bends.clear();
        self.rest_bends.extend_from_slice(rest_bends);
        self.compliances.clear();
        self.compliances.extend_from_slice(compliances);
        self.lambdas.clear();
        self.lambdas.resize(particles.len(), 0.0);
    }

    pub fn set_plasticity(&mut self, plasticity: Option<Plasticity>) {
        self.plasticity = plasticity;
    }

    /// Current rest bend of constraint `i`; shifts under plasticity.
    pub fn rest_bend(&self, i: usize) -> f32 {
        self.rest_bends[i]
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(0.0);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let [p0, p1, p2] = self.particles[i];
            let (p0, p1, p2) = (p0 as usize, p1 as usize, p2 as usize);
            let w0 = store.inv_masses[p0];
            let w1 = store.inv_masses[p1];
            let w2 = store.inv_masses[p2];

            // Gradient wrt the center is n; the outers each take -n/2.
            let w_sum = w1 + 0.25 * (w0 + w2);
            if w_sum == 0.0 {
                continue;
            }

            let mid = (store.position(p0) + store.position(p2)) * 0.5;
            let d = store.position(p1) - mid;
            let len_sq = d.length_squared();
            if len_sq < DEGENERATE_LENGTH_SQ {
                continue;
            }
            let len = len_sq.sqrt();
            let n = d / len;
            let mut c = len - self.rest_bends[i];

            if let Some(p) = self.plasticity {
                if c.abs() > p.yield_threshold {
                    self.rest_bends[i] += c * p.creep_rate * ctx.dt;
                    c = len - self.rest_bends[i];
                }
            }

            let dl = xpbd_delta_lambda(c, self.lambdas[i], w_sum, self.compliances[i], ctx.dt);
            self.lambdas[i] += dl;

            store.accumulate_delta(p1, n * (dl * w1));
            store.accumulate_delta(p0, n * (-0.5 * dl * w0));
            store.accumulate_delta(p2, n * (-0.5 * dl * w2));
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &[p0, p1, p2] in &self.particles {
            store.apply_delta(p0 as usize, sor);
            store.apply_delta(p1 as usize, sor);
            store.apply_delta(p2 as usize, sor);
        }
    }
}
