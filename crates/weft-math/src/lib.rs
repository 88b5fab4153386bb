//! # weft-math
//!
//! Linear algebra primitives for the Weft simulation engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Quat`, etc.)
//! - Axis-aligned bounding boxes with swept expansion
//! - Rotation helpers: Darboux vectors for rods, robust polar
//!   decomposition for shape matching

pub mod aabb;
pub mod rotation;

pub use aabb::Aabb;
pub use rotation::{darboux_vector, extract_rotation, integrate_angular_velocity};

// Re-export glam types as the canonical math types for Weft.
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
