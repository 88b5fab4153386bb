//! Shape-matching constraints: pull particle clusters toward a rigid
//! transform of their rest shape.
//!
//! Per cluster, the best-fit rotation of the rest shape onto the
//! current positions comes from a warm-started polar decomposition of
//! the mass-weighted covariance. Stiffness blends particles toward
//! their goal positions; plasticity absorbs large deformations into
//! the rest shape itself.

use weft_math::{extract_rotation, Mat3, Quat, Vec3};

use super::{Plasticity, SubstepContext};
use crate::particles::ParticleStore;

// Mass substituted for pinned particles so they dominate the best-fit
// transform instead of dropping out of it.
const PINNED_MASS: f32 = 1.0e9;

#[derive(Debug, Clone, Default)]
pub struct ShapeMatchingBatch {
    /// Cluster members, flattened; cluster `i` owns
    /// `members[offsets[i]..offsets[i + 1]]`.
    members: Vec<u32>,
    offsets: Vec<usize>,
    /// Rest offset from the rest center of mass, parallel to `members`.
    rest_offsets: Vec<Vec3>,
    stiffnesses: Vec<f32>,
    /// Warm-start rotation per cluster.
    rotations: Vec<Quat>,
    plasticity: Option<Plasticity>,
}

impl ShapeMatchingBatch {
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.stiffnesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stiffnesses.is_empty()
    }

    /// Adds one cluster, capturing the rest shape from current
    /// positions in the store.
    pub fn push_cluster(&mut self, members: &[u32], stiffness: f32, store: &ParticleStore) {
        let com = Self::center_of_mass(members, store);
        for &p in members {
            self.rest_offsets.push(store.position(p as usize) - com);
        }
        self.members.extend_from_slice(members);
        self.offsets.push(self.members.len());
        self.stiffnesses.push(stiffness);
        self.rotations.push(Quat::IDENTITY);
    }

    pub fn set_plasticity(&mut self, plasticity: Option<Plasticity>) {
        self.plasticity = plasticity;
    }

    /// Best-fit rotation of cluster `i` from the last evaluation.
    pub fn rotation(&self, i: usize) -> Quat {
        self.rotations[i]
    }

    fn center_of_mass(members: &[u32], store: &ParticleStore) -> Vec3 {
        let mut com = Vec3::ZERO;
        let mut total = 0.0;
        for &p in members {
            let w = store.inv_masses[p as usize];
            let m = if w > 0.0 { 1.0 / w } else { PINNED_MASS };
            com += store.position(p as usize) * m;
            total += m;
        }
        com / total
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for k in 0..self.len() {
            let range = self.offsets[k]..self.offsets[k + 1];
            let members = &self.members[range.clone()];
            let com = Self::center_of_mass(members, store);

            // Covariance A = Σ m (x - com) rᵀ over the cluster.
            let mut a = Mat3::ZERO;
            for (j, &p) in members.iter().enumerate() {
                let w = store.inv_masses[p as usize];
                let m = if w > 0.0 { 1.0 / w } else { PINNED_MASS };
                let d = (store.position(p as usize) - com) * m;
                let r = self.rest_offsets[range.start + j];
                a += Mat3::from_cols(d * r.x, d * r.y, d * r.z);
            }

            let rot = extract_rotation(&a, self.rotations[k], 8);
            self.rotations[k] = rot;

            let stiffness = self.stiffnesses[k];
            let mut deform = 0.0;
            for (j, &p) in members.iter().enumerate() {
                let p = p as usize;
                let goal = com + rot * self.rest_offsets[range.start + j];
                let diff = goal - store.position(p);
                deform += diff.length();
                if store.inv_masses[p] > 0.0 {
                    store.accumulate_delta(p, diff * stiffness);
                }
            }

            if let Some(pl) = self.plasticity {
                let mean_deform = deform / members.len().max(1) as f32;
                if mean_deform > pl.yield_threshold {
                    let blend = (pl.creep_rate * ctx.dt).min(1.0);
                    let inv_rot = rot.conjugate();
                    for (j, &p) in members.iter().enumerate() {
                        let actual = inv_rot * (store.position(p as usize) - com);
                        let rest = &mut self.rest_offsets[range.start + j];
                        *rest += (actual - *rest) * blend;
                    }
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
