//! Integration tests for weft-math.

use std::f32::consts::FRAC_PI_2;

use weft_math::rotation::{darboux_vector, extract_rotation, integrate_angular_velocity};
use weft_math::{Aabb, Mat3, Quat, Vec3};

// ─── Aabb Tests ───────────────────────────────────────────────

#[test]
fn aabb_overlap() {
    let a = Aabb::from_sphere(Vec3::ZERO, 1.0);
    let b = Aabb::from_sphere(Vec3::new(1.5, 0.0, 0.0), 1.0);
    let c = Aabb::from_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0);
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
}

#[test]
fn aabb_union_contains_both() {
    let a = Aabb::from_sphere(Vec3::ZERO, 0.5);
    let b = Aabb::from_sphere(Vec3::new(3.0, 0.0, 0.0), 0.5);
    let u = a.union(&b);
    assert!(u.contains(Vec3::ZERO));
    assert!(u.contains(Vec3::new(3.0, 0.0, 0.0)));
}

#[test]
fn aabb_empty_union_is_identity() {
    let a = Aabb::from_sphere(Vec3::new(1.0, 2.0, 3.0), 0.25);
    let u = Aabb::EMPTY.union(&a);
    assert_eq!(u, a);
}

#[test]
fn aabb_swept_covers_displacement() {
    // A fast particle moving +X should produce a box covering its path.
    let a = Aabb::from_sphere(Vec3::ZERO, 0.1);
    let swept = a.swept(Vec3::new(2.0, 0.0, 0.0));
    assert!(swept.contains(Vec3::new(1.5, 0.0, 0.0)));
    assert!(!swept.contains(Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn aabb_expanded_grows_symmetrically() {
    let a = Aabb::from_sphere(Vec3::ZERO, 1.0).expanded(0.5);
    assert!((a.size().x - 3.0).abs() < 1e-6);
    assert_eq!(a.center(), Vec3::ZERO);
}

// ─── Rotation Tests ───────────────────────────────────────────

#[test]
fn darboux_of_identical_orientations_is_zero() {
    let q = Quat::from_axis_angle(Vec3::Y, 0.7);
    let omega = darboux_vector(q, q, 1.0);
    assert!(omega.length() < 1e-6);
}

#[test]
fn darboux_measures_relative_twist() {
    let q0 = Quat::IDENTITY;
    let q1 = Quat::from_axis_angle(Vec3::Z, 0.2);
    let omega = darboux_vector(q0, q1, 1.0);
    // Small-angle: Im(q1) ≈ axis · sin(θ/2), so Ω ≈ axis · θ
    assert!((omega.z - 0.2).abs() < 1e-3);
    assert!(omega.x.abs() < 1e-6);
}

#[test]
fn integrate_angular_velocity_quarter_turn() {
    let q = integrate_angular_velocity(Quat::IDENTITY, Vec3::new(0.0, FRAC_PI_2, 0.0), 1.0);
    let rotated = q * Vec3::X;
    assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
}

#[test]
fn integrate_zero_angular_velocity_is_noop() {
    let q = Quat::from_axis_angle(Vec3::X, 0.3);
    let out = integrate_angular_velocity(q, Vec3::ZERO, 1.0 / 60.0);
    assert!((out.dot(q) - 1.0).abs() < 1e-6);
}

#[test]
fn extract_rotation_recovers_pure_rotation() {
    let expected = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 0.5).normalize(), 0.9);
    let m = Mat3::from_quat(expected);
    let q = extract_rotation(&m, Quat::IDENTITY, 32);
    // q and -q represent the same rotation
    assert!(q.dot(expected).abs() > 0.9999);
}

#[test]
fn extract_rotation_ignores_stretch() {
    let expected = Quat::from_axis_angle(Vec3::Y, 0.4);
    // R * diag(2, 0.5, 1): stretched but not sheared
    let scale = Mat3::from_diagonal(Vec3::new(2.0, 0.5, 1.0));
    let m = Mat3::from_quat(expected) * scale;
    let q = extract_rotation(&m, Quat::IDENTITY, 64);
    assert!(q.dot(expected).abs() > 0.999);
}
