//! Aerodynamic constraints: velocity-level drag and lift.
//!
//! Not a positional constraint at all. Each entry damps one particle's
//! velocity relative to the ambient wind (drag) and deflects it along
//! the surface normal (lift). No multipliers, no coloring conflicts,
//! no position corrections; evaluation writes velocities directly.

use weft_math::Vec3;
use weft_types::constants::EPSILON;

use super::SubstepContext;
use crate::particles::ParticleStore;

#[derive(Debug, Clone, Default)]
pub struct AerodynamicBatch {
    particles: Vec<u32>,
    /// Surface normals, fed by the host per frame.
    normals: Vec<Vec3>,
    areas: Vec<f32>,
    drag_coefficients: Vec<f32>,
    lift_coefficients: Vec<f32>,
}

impl AerodynamicBatch {
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
        particles: &[u32],
        normals: &[Vec3],
        areas: &[f32],
        drag_coefficients: &[f32],
        lift_coefficients: &[f32],
    ) {
        debug_assert_eq!(particles.len(), normals.len());
        debug_assert_eq!(particles.len(), areas.len());
        debug_assert_eq!(particles.len(), drag_coefficients.len());
        debug_assert_eq!(particles.len(), lift_coefficients.len());
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.normals.clear();
        self.normals.extend_from_slice(normals);
        self.areas.clear();
        self.areas.extend_from_slice(areas);
        self.drag_coefficients.clear();
        self.drag_coefficients.extend_from_slice(drag_coefficients);
        self.lift_coefficients.clear();
        self.lift_coefficients.extend_from_slice(lift_coefficients);
    }

    /// Updates surface normals in place.
    pub fn update_normals(&mut self, normals: &[Vec3]) {
        debug_assert_eq!(normals.len(), self.normals.len());
        self.normals.copy_from_slice(normals);
    }

    pub fn evaluate(&mut self, store: &mut ParticleStore, ctx: &SubstepContext) {
        for i in 0..self.particles.len() {
            let p = self.particles[i] as usize;
            let w = store.inv_masses[p];
            if w == 0.0 {
                continue;
            }

            let v_rel = store.velocity(p) - ctx.wind;
            let speed = v_rel.length();
            if speed < EPSILON {
                continue;
            }

            let area = self.areas[i];
            let drag = v_rel * (-self.drag_coefficients[i] * area * speed);

            // Lift acts perpendicular to the flow, in the plane spanned
            // by the flow and the surface normal.
            let n = self.normals[i];
            let lift_dir = v_rel.cross(n).cross(v_rel);
            let lift = if lift_dir.length_squared() > EPSILON {
                lift_dir.normalize() * (self.lift_coefficients[i] * area * speed * speed)
            } else {
                Vec3::ZERO
            };

            let dv = (drag + lift) * (w * ctx.dt);
            let v = store.velocity(p) + dv;

            // Impulse clamping: drag may never reverse the relative flow.
            let v_rel_after = v - ctx.wind;
            let v = if v_rel_after.dot(v_rel) < 0.0 { ctx.wind } else { v };
            store.set_velocity(p, v);
        }
    }
}
