//! Volume constraints: hold an enclosed triangle mesh at a target
//! volume.
//!
//! Each constraint owns a list of triangles over its particles. The
//! signed volume is the divergence-theorem sum over triangles, and the
//! per-particle gradients are the triangle cross products. A pressure
//! factor scales the rest volume, so balloons can inflate or deflate
//! at runtime.

use std::collections::BTreeMap;

use weft_math::Vec3;
use weft_types::constants::XPBD_EPSILON;

use super::SubstepContext;
use crate::particles::ParticleStore;

#[derive(Debug, Clone, Default)]
pub struct VolumeBatch {
    /// All triangles, flattened; constraint `i` owns
    /// `triangles[tri_offsets[i]..tri_offsets[i + 1]]`.
    triangles: Vec<[u32; 3]>,
    tri_offsets: Vec<usize>,
    /// Unique particles per constraint, same offset scheme.
    members: Vec<u32>,
    member_offsets: Vec<usize>,
    rest_volumes: Vec<f32>,
    pressures: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
    // Ordered so gradient accumulation is deterministic.
    grads: BTreeMap<u32, Vec3>,
}

impl VolumeBatch {
    pub fn new() -> Self {
        Self {
            tri_offsets: vec![0],
            member_offsets: vec![0],
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rest_volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest_volumes.is_empty()
    }

    /// Adds one volume constraint over `triangles`.
    pub fn push_constraint(&mut self, triangles: &[[u32; 3]], rest_volume: f32, pressure: f32, compliance: f32) {
        self.triangles.extend_from_slice(triangles);
        self.tri_offsets.push(self.triangles.len());

        let mut unique: Vec<u32> = triangles.iter().flatten().copied().collect();
        unique.sort_unstable();
        unique.dedup();
        self.members.extend_from_slice(&unique);
        self.member_offsets.push(self.members.len());

        self.rest_volumes.push(rest_volume);
        self.pressures.push(pressure);
        self.compliances.push(compliance);
        self.lambdas.push(0.0);
    }

    /// Sets the pressure factor of constraint `i`.
    pub fn set_pressure(&mut self, i: usize, pressure: f32) {
        self.pressures[i] = pressure;
    }

    /// Signed volume of constraint `i` at current positions.
    pub fn current_volume(&self, i: usize, store: &ParticleStore) -> f32 {
        let mut v = 0.0;
        for t in &self.triangles[self.tri_offsets[i]..self.tri_offsets[i + 1]] {
            let p0 = store.position(t[0] as usize);
            let p1 = store.position(t[1] as usize);
            let p2 = store.position(t[2] as usize);
            v += p0.dot(p1.cross(p2));
        }
        v / 6.0
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(0.0);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.len() {
            let c = self.current_volume(i, store) - self.rest_volumes[i] * self.pressures[i];

            self.grads.clear();
            for t in &self.triangles[self.tri_offsets[i]..self.tri_offsets[i + 1]] {
                let p0 = store.position(t[0] as usize);
                let p1 = store.position(t[1] as usize);
                let p2 = store.position(t[2] as usize);
                *self.grads.entry(t[0]).or_insert(Vec3::ZERO) += p1.cross(p2) / 6.0;
                *self.grads.entry(t[1]).or_insert(Vec3::ZERO) += p2.cross(p0) / 6.0;
                *self.grads.entry(t[2]).or_insert(Vec3::ZERO) += p0.cross(p1) / 6.0;
            }

            let mut w_sum = 0.0;
            for (&p, g) in &self.grads {
                w_sum += store.inv_masses[p as usize] * g.length_squared();
            }
            if w_sum < XPBD_EPSILON {
                continue;
            }

            let alpha = self.compliances[i] / (ctx.dt * ctx.dt);
            let dl = (-c - alpha * self.lambdas[i]) / (w_sum + alpha + XPBD_EPSILON);
            self.lambdas[i] += dl;

            for (&p, g) in &self.grads {
                let w = store.inv_masses[p as usize];
                if w > 0.0 {
                    store.accumulate_delta(p as usize, *g * (dl * w));
                }
            }
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &p in &self.members {
            store.apply_delta(p as usize, sor);
        }
    }
}
