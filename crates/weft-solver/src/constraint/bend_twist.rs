//! Bend/twist constraints between adjacent oriented rod elements.
//!
//! Constrains the Darboux vector (the imaginary part of `q0^-1 * q1`)
//! to its rest value, with independent compliance per local axis: x/y
//! control bending, z controls twist. The quaternion double cover
//! means `-rest` encodes the same rotation as `rest`; evaluation picks
//! whichever sign is closer to the current Darboux vector before
//! measuring the violation.

use weft_math::{Quat, Vec3, Vec4};
use weft_types::constants::XPBD_EPSILON;

use super::SubstepContext;
use crate::particles::ParticleStore;

/// Oriented-particle index pairs `[q0, q1]` per constraint.
#[derive(Debug, Clone, Default)]
pub struct BendTwistBatch {
    particles: Vec<[u32; 2]>,
    rest_darboux: Vec<Vec3>,
    /// Per-axis compliance: x/y bend, z twist.
    compliances: Vec<Vec3>,
    lambdas: Vec<Vec3>,
}

impl BendTwistBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn set_constraints(&mut self, particles: &[[u32; 2]], rest_darboux: &[Vec3], compliances: &[Vec3]) {
        debug_assert_eq!(particles.len(), rest_darboux.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.rest_darboux.clear();
        self.rest_darboux.extend_from_slice(rest_darboux);
        self.compliances.clear();
        self.compliances.extend_from_slice(compliances);
        self.lambdas.clear();
        self.lambdas.resize(particles.len(), Vec3::ZERO);
    }

    /// Computes the rest Darboux vectors from current orientations.
    pub fn capture_rest_state(&mut self, store: &ParticleStore) {
        for (i, &[a, b]) in self.particles.iter().enumerate() {
            let q0 = store.orientations[a as usize];
            let q1 = store.orientations[b as usize];
            let r = q0.conjugate() * q1;
            self.rest_darboux[i] = Vec3::new(r.x, r.y, r.z);
        }
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(Vec3::ZERO);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let [a, b] = self.particles[i];
            let (a, b) = (a as usize, b as usize);
            let w0 = store.inv_rot_masses[a];
            let w1 = store.inv_rot_masses[b];
            let w_sum = w0 + w1;
            if w_sum == 0.0 {
                continue;
            }

            let q0 = store.orientations[a];
            let q1 = store.orientations[b];
            let r = q0.conjugate() * q1;
            let omega = Vec3::new(r.x, r.y, r.z);

            let mut rest = self.rest_darboux[i];
            if (omega + rest).length_squared() < (omega - rest).length_squared() {
                rest = -rest;
            }

            let mut d_lambda = Vec3::ZERO;
            for axis in 0..3 {
                let c = omega[axis] - rest[axis];
                let alpha = self.compliances[i][axis] / (ctx.dt * ctx.dt);
                let dl = (-c - alpha * self.lambdas[i][axis]) / (w_sum + alpha + XPBD_EPSILON);
                self.lambdas[i][axis] += dl;
                d_lambda[axis] = dl;
            }

            let dq = Quat::from_xyzw(d_lambda.x, d_lambda.y, d_lambda.z, 0.0);
            let corr0 = Vec4::from(q1 * dq) * -w0;
            let corr1 = Vec4::from(q0 * dq) * w1;
            store.accumulate_orientation_delta(a, corr0);
            store.accumulate_orientation_delta(b, corr1);
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &[a, b] in &self.particles {
            store.apply_orientation_delta(a as usize, sor);
            store.apply_orientation_delta(b as usize, sor);
        }
    }
}
