//! Collider shapes and transforms.
//!
//! Analytic shapes answer distance queries in local space; the world
//! handles the transform into and out of collider space. Edge meshes
//! and distance fields are referenced by handle and resolved by the
//! world at query time.

use weft_math::{Quat, Vec3};
use weft_types::MaterialId;

use crate::sdf_cache::SdfHandle;

/// Handle into the world's edge mesh registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeMeshHandle(pub u32);

/// A polyline collider: segments with a tube thickness. Used for
/// thin features like railings and cables that an SDF would blur out.
#[derive(Debug, Clone)]
pub struct EdgeMesh {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
    pub thickness: f32,
}

impl EdgeMesh {
    /// Closest point on any segment, with outward normal and distance
    /// to the tube surface.
    pub fn closest_surface(&self, p: Vec3) -> Option<(Vec3, Vec3, f32)> {
        let mut best: Option<(Vec3, f32)> = None;
        for e in &self.edges {
            let a = self.vertices[e[0] as usize];
            let b = self.vertices[e[1] as usize];
            let ab = b - a;
            let t = if ab.length_squared() > 0.0 {
                ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + ab * t;
            let dist_sq = (p - closest).length_squared();
            if best.map_or(true, |(_, d)| dist_sq < d) {
                best = Some((closest, dist_sq));
            }
        }
        let (closest, dist_sq) = best?;
        let dist = dist_sq.sqrt();
        let normal = if dist > 1.0e-6 {
            (p - closest) / dist
        } else {
            Vec3::Y
        };
        Some((closest + normal * self.thickness, normal, dist - self.thickness))
    }
}

/// Category bits and mask; two filters pass when each one's category
/// intersects the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: 1,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub fn collides_with(&self, other: &CollisionFilter) -> bool {
        (self.category & other.mask) != 0 && (other.category & self.mask) != 0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ColliderShape {
    Sphere {
        radius: f32,
    },
    Box3 {
        half_extents: Vec3,
    },
    /// Capsule along the local Y axis.
    Capsule {
        radius: f32,
        half_height: f32,
    },
    EdgeMesh {
        handle: EdgeMeshHandle,
    },
    DistanceField {
        handle: SdfHandle,
    },
}

impl ColliderShape {
    /// Surface point, outward normal, and signed distance for a query
    /// point, all in local space. Handle-based shapes return `None`;
    /// the world resolves those itself.
    pub fn local_surface(&self, p: Vec3) -> Option<(Vec3, Vec3, f32)> {
        match *self {
            ColliderShape::Sphere { radius } => {
                let len = p.length();
                let normal = if len > 1.0e-6 { p / len } else { Vec3::Y };
                Some((normal * radius, normal, len - radius))
            }
            ColliderShape::Box3 { half_extents } => Some(box_surface(p, half_extents)),
            ColliderShape::Capsule { radius, half_height } => {
                // Closest point on the inner segment, then a sphere query.
                let clamped_y = p.y.clamp(-half_height, half_height);
                let axis_point = Vec3::new(0.0, clamped_y, 0.0);
                let d = p - axis_point;
                let len = d.length();
                let normal = if len > 1.0e-6 { d / len } else { Vec3::X };
                Some((axis_point + normal * radius, normal, len - radius))
            }
            ColliderShape::EdgeMesh { .. } | ColliderShape::DistanceField { .. } => None,
        }
    }
}

fn box_surface(p: Vec3, he: Vec3) -> (Vec3, Vec3, f32) {
    let q = p.abs() - he;
    if q.max_element() <= 0.0 {
        // Inside: exit through the nearest face.
        let dx = -q.x;
        let dy = -q.y;
        let dz = -q.z;
        let (normal, dist) = if dx <= dy && dx <= dz {
            (Vec3::new(p.x.signum(), 0.0, 0.0), -dx)
        } else if dy <= dz {
            (Vec3::new(0.0, p.y.signum(), 0.0), -dy)
        } else {
            (Vec3::new(0.0, 0.0, p.z.signum()), -dz)
        };
        let surface = p - normal * dist; // dist is negative: push to the face
        (surface, normal, dist)
    } else {
        let clamped = p.clamp(-he, he);
        let d = p - clamped;
        let dist = d.length();
        let normal = if dist > 1.0e-6 { d / dist } else { Vec3::Y };
        (clamped, normal, dist)
    }
}

/// A placed collider.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: ColliderShape,
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale; non-uniform scaling of analytic shapes is not
    /// supported.
    pub scale: f32,
    /// Extra skin around the surface where contacts are generated.
    pub contact_offset: f32,
    pub material: MaterialId,
    pub filter: CollisionFilter,
    /// Triggers raise contact events but get no collision response.
    pub is_trigger: bool,
}

impl Collider {
    pub fn new(shape: ColliderShape, position: Vec3) -> Self {
        Self {
            shape,
            position,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            contact_offset: weft_types::constants::DEFAULT_CONTACT_OFFSET,
            material: MaterialId(0),
            filter: CollisionFilter::default(),
            is_trigger: false,
        }
    }

    /// World point into collider-local space.
    #[inline]
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        self.rotation.conjugate() * (p - self.position) / self.scale
    }

    /// Collider-local point back to world space.
    #[inline]
    pub fn to_world(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.position
    }

    /// Collider-local direction to world space.
    #[inline]
    pub fn dir_to_world(&self, d: Vec3) -> Vec3 {
        self.rotation * d
    }
}
