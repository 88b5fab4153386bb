//! Stretch/shear constraints for oriented rod elements.
//!
//! Couples the segment between two particles to the third director of
//! an orientation frame (the local z axis): the segment should have
//! its rest length and point along the director. Per-axis compliance
//! separates shear (x/y) from stretch (z) in the frame's local basis.

use weft_math::{Quat, Vec3, Vec4};
use weft_types::constants::XPBD_EPSILON;

use super::SubstepContext;
use crate::particles::ParticleStore;

#[derive(Debug, Clone, Default)]
pub struct StretchShearBatch {
    /// Segment endpoints `[a, b]` per constraint.
    particles: Vec<[u32; 2]>,
    /// Index of the oriented particle carrying the frame.
    orientation_indices: Vec<u32>,
    rest_lengths: Vec<f32>,
    /// Per-axis compliance in the frame's local basis.
    compliances: Vec<Vec3>,
    lambdas: Vec<Vec3>,
}

impl StretchShearBatch {
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
        orientation_indices: &[u32],
        rest_lengths: &[f32],
        compliances: &[Vec3],
    ) {
        debug_assert_eq!(particles.len(), orientation_indices.len());
        debug_assert_eq!(particles.len(), rest_lengths.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.orientation_indices.clear();
        self.orientation_indices.extend_from_slice(orientation_indices);
        self.rest_lengths.clear();
        self.rest_lengths.extend_from_slice(rest_lengths);
        self.compliances.clear();
        self.compliances.extend_from_slice(compliances);
        self.lambdas.clear();
        self.lambdas.resize(particles.len(), Vec3::ZERO);
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(Vec3::ZERO);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let [a, b] = self.particles[i];
            let (a, b) = (a as usize, b as usize);
            let o = self.orientation_indices[i] as usize;
            let wa = store.inv_masses[a];
            let wb = store.inv_masses[b];
            let wq = store.inv_rot_masses[o];
            let rest = self.rest_lengths[i];
            if rest <= 0.0 {
                continue;
            }

            let q = store.orientations[o];
            let d3 = q * Vec3::Z;

            // C = (b - a) - d3 * rest, one scalar constraint per axis.
            let c = (store.position(b) - store.position(a)) - d3 * rest;
            let w_sum = wa + wb + 4.0 * wq * rest * rest;
            if w_sum == 0.0 {
                continue;
            }

            let mut d_lambda = Vec3::ZERO;
            for axis in 0..3 {
                let alpha = self.compliances[i][axis] / (ctx.dt * ctx.dt);
                let dl = (-c[axis] - alpha * self.lambdas[i][axis]) / (w_sum + alpha + XPBD_EPSILON);
                self.lambdas[i][axis] += dl;
                d_lambda[axis] = dl;
            }

            store.accumulate_delta(a, d_lambda * -wa);
            store.accumulate_delta(b, d_lambda * wb);

            // Rotate the director toward the segment: small-angle
            // correction with axis d3 x (-dL), folded into the frame.
            if wq > 0.0 {
                let rot = d3.cross(-d_lambda) * (2.0 * wq * rest);
                let dq = Quat::from_xyzw(rot.x * 0.5, rot.y * 0.5, rot.z * 0.5, 0.0) * q;
                store.accumulate_orientation_delta(o, Vec4::from(dq));
            }
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for (i, &[a, b]) in self.particles.iter().enumerate() {
            store.apply_delta(a as usize, sor);
            store.apply_delta(b as usize, sor);
            store.apply_orientation_delta(self.orientation_indices[i] as usize, sor);
        }
    }
}
