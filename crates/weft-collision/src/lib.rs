//! # weft-collision
//!
//! Collision detection for the Weft particle solver.
//!
//! ## Key Types
//!
//! - [`ColliderWorld`] — collider registry and the standard
//!   `CollisionBackend` implementation: linear broad phase over swept
//!   AABBs, analytic narrow phase, speculative contact admission
//! - [`Collider`] / [`ColliderShape`] — placed shapes: sphere, box,
//!   capsule, edge mesh, distance field
//! - [`DistanceField`] — flat-octree signed distance field with
//!   trilinear sampling
//! - [`SdfCache`] — content-hashed, reference-counted field storage
//! - [`MaterialTable`] — shared friction/restitution materials

pub mod material;
pub mod sdf;
pub mod sdf_builder;
pub mod sdf_cache;
pub mod shape;
pub mod world;

pub use material::{CollisionMaterial, CombineMode, MaterialTable};
pub use sdf::{DfNode, DistanceField};
pub use sdf_builder::SdfBuildSettings;
pub use sdf_cache::{SdfCache, SdfHandle};
pub use shape::{Collider, ColliderShape, CollisionFilter, EdgeMesh, EdgeMeshHandle};
pub use world::ColliderWorld;
