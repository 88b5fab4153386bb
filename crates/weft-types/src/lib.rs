//! # weft-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the Weft particle simulation engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Weft crates share.

pub mod constants;
pub mod contact;
pub mod error;
pub mod ids;
pub mod scalar;

pub use contact::Contact;
pub use error::{WeftError, WeftResult};
pub use ids::{ActorId, ColliderId, MaterialId, ParticleId};
pub use scalar::Scalar;
