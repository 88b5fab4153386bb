//! Rotation helpers for oriented particles.
//!
//! Provides the Darboux vector used by bend-twist rod constraints and
//! a robust polar decomposition (rotation extraction) used by shape
//! matching. The extraction is the iterative quaternion method, which
//! stays stable for degenerate and inverted configurations where a
//! direct eigendecomposition would fail.

use glam::{Mat3, Quat, Vec3};
use weft_types::constants::DEGENERATE_LENGTH_SQ;

/// Darboux vector between two orientations.
///
/// Measures the bend and twist of the rod segment between two oriented
/// particles: `Ω = 2/l · Im(q0⁻¹ q1)` where `l` is the rest length of
/// the segment. Identical orientations give the zero vector.
#[inline]
pub fn darboux_vector(q0: Quat, q1: Quat, inv_rest_length: f32) -> Vec3 {
    let r = q0.conjugate() * q1;
    Vec3::new(r.x, r.y, r.z) * (2.0 * inv_rest_length)
}

/// Integrate an angular velocity into an orientation over `dt`.
///
/// Uses the exact exponential map rather than the first-order
/// quaternion derivative, so large angular velocities stay normalized.
#[inline]
pub fn integrate_angular_velocity(q: Quat, omega: Vec3, dt: f32) -> Quat {
    let angle_sq = omega.length_squared() * dt * dt;
    if angle_sq < DEGENERATE_LENGTH_SQ {
        return q;
    }
    let angle = angle_sq.sqrt();
    let axis = omega.normalize();
    (Quat::from_axis_angle(axis, angle) * q).normalize()
}

/// Extract the rotational part of a (possibly non-orthonormal) matrix.
///
/// Iterative quaternion-based polar decomposition. `initial` warm-starts
/// the iteration; for shape matching pass the previous frame's rotation
/// so one or two iterations suffice.
pub fn extract_rotation(a: &Mat3, initial: Quat, max_iterations: u32) -> Quat {
    let mut q = initial.normalize();

    for _ in 0..max_iterations {
        let r = Mat3::from_quat(q);

        // omega = (Σ rᵢ × aᵢ) / (|Σ rᵢ · aᵢ| + ε)
        let cross = r.x_axis.cross(a.x_axis) + r.y_axis.cross(a.y_axis) + r.z_axis.cross(a.z_axis);
        let dot = r.x_axis.dot(a.x_axis) + r.y_axis.dot(a.y_axis) + r.z_axis.dot(a.z_axis);
        let omega = cross * (1.0 / (dot.abs() + 1.0e-9));

        let angle_sq = omega.length_squared();
        if angle_sq < DEGENERATE_LENGTH_SQ {
            break;
        }
        let angle = angle_sq.sqrt();
        q = (Quat::from_axis_angle(omega / angle, angle) * q).normalize();
    }

    q
}
