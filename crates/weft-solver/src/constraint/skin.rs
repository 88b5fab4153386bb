//! Skin constraints: tie cloth particles to an animated skinned
//! surface.
//!
//! Each constraint holds one particle inside a sphere of `radius`
//! around its skin attachment point, and a backstop plane pushed along
//! the negative skin normal keeps the particle from sinking below the
//! surface. Attachment points and normals are re-fed every frame by
//! the host application.

use super::{xpbd_delta_lambda, SubstepContext};
use crate::particles::ParticleStore;
use weft_math::Vec3;
use weft_types::constants::DEGENERATE_LENGTH_SQ;

#[derive(Debug, Clone, Default)]
pub struct SkinBatch {
    particles: Vec<u32>,
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    /// Max distance from the attachment point.
    radii: Vec<f32>,
    /// Backstop offset along the negative normal.
    backstops: Vec<f32>,
    compliances: Vec<f32>,
    lambdas: Vec<f32>,
}

impl SkinBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_constraints(
        &mut self,
        particles: &[u32],
        points: &[Vec3],
        normals: &[Vec3],
        radii: &[f32],
        backstops: &[f32],
        compliances: &[f32],
    ) {
        debug_assert_eq!(particles.len(), points.len());
        debug_assert_eq!(particles.len(), normals.len());
        debug_assert_eq!(particles.len(), radii.len());
        debug_assert_eq!(particles.len(), backstops.len());
        debug_assert_eq!(particles.len(), compliances.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.points.clear();
        self.points.extend_from_slice(points);
        self.normals.clear();
        self.normals.extend_from_slice(normals);
        self.radii.clear();
        self.radii.extend_from_slice(radii);
        self.backstops.clear();
        self.backstops.extend_from_slice(backstops);
        self.compliances.clear();
        self.compliances.extend_from_slice(compliances);
        self.lambdas.clear();
        self.lambdas.resize(particles.len(), 0.0);
    }

    /// Updates attachment points and normals in place, keeping
    /// multipliers and parameters. Called once per frame with the
    /// animated skin state.
    pub fn update_skin(&mut self, points: &[Vec3], normals: &[Vec3]) {
        debug_assert_eq!(points.len(), self.points.len());
        debug_assert_eq!(normals.len(), self.normals.len());
        self.points.copy_from_slice(points);
        self.normals.copy_from_slice(normals);
    }

    pub fn reset_lambdas(&mut self) {
        self.lambdas.fill(0.0);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let p = self.particles[i] as usize;
            let w = store.inv_masses[p];
            if w == 0.0 {
                continue;
            }

            let pos = store.position(p);
            let to_particle = pos - self.points[i];

            // Radial cap: one-sided pull back inside the sphere.
            let dist_sq = to_particle.length_squared();
            if dist_sq > DEGENERATE_LENGTH_SQ {
                let dist = dist_sq.sqrt();
                let c = dist - self.radii[i];
                if c > 0.0 {
                    let n = to_particle / dist;
                    let dl = xpbd_delta_lambda(c, self.lambdas[i], w, self.compliances[i], ctx.dt);
                    self.lambdas[i] += dl;
                    store.accumulate_delta(p, n * (dl * w));
                }
            }

            // Backstop: hard projection above the offset surface plane.
            let depth = to_particle.dot(self.normals[i]) + self.backstops[i];
            if depth < 0.0 {
                store.accumulate_delta(p, self.normals[i] * -depth);
            }
        }
    }

    pub fn apply(&self, store: &mut ParticleStore, sor: f32) {
        for &p in &self.particles {
            store.apply_delta(p as usize, sor);
        }
    }
}
