//! Scalar type alias.
//!
//! The engine simulates in `f32`; energy and residual accumulations
//! use `f64` locally where drift matters.

/// Simulation scalar type.
pub type Scalar = f32;
