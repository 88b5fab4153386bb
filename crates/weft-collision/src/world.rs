//! The collider world: registration, broad phase, narrow phase, and
//! speculative contact generation.
//!
//! Implements the solver's `CollisionBackend`. Broad phase is a linear
//! scan of swept particle AABBs against collider AABBs; narrow phase
//! dispatches on shape. Contacts are admitted speculatively: a
//! particle flying toward a surface generates a contact before it
//! penetrates, using a first-order extrapolation of the separating
//! distance over the step.

use std::collections::HashMap;

use tracing::trace;
use weft_math::{Aabb, Mat3, Vec3};
use weft_solver::{CollisionBackend, ParticleStore};
use weft_types::constants::COLLISION_MARGIN;
use weft_types::{ActorId, ColliderId, Contact};

use crate::material::{CollisionMaterial, CombineMode, MaterialTable};
use crate::sdf_cache::SdfCache;
use crate::shape::{Collider, ColliderShape, CollisionFilter, EdgeMesh, EdgeMeshHandle};

pub struct ColliderWorld {
    colliders: Vec<Option<Collider>>,
    free: Vec<u32>,
    /// Swept world-space bounds, parallel to `colliders`.
    bounds: Vec<Aabb>,
    prev_positions: Vec<Vec3>,
    velocities: Vec<Vec3>,

    edge_meshes: Vec<Option<EdgeMesh>>,
    sdf_cache: SdfCache,

    materials: MaterialTable,
    /// Material representing the particle side of every contact.
    particle_material: CollisionMaterial,
    combine_mode: CombineMode,

    /// Per-actor collision filters; unlisted actors collide with
    /// everything.
    actor_filters: HashMap<u32, CollisionFilter>,
}

impl Default for ColliderWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ColliderWorld {
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            free: Vec::new(),
            bounds: Vec::new(),
            prev_positions: Vec::new(),
            velocities: Vec::new(),
            edge_meshes: Vec::new(),
            sdf_cache: SdfCache::new(),
            materials: MaterialTable::new(),
            particle_material: CollisionMaterial::default(),
            combine_mode: CombineMode::Geometric,
            actor_filters: HashMap::new(),
        }
    }

    // ─── Registration ───

    pub fn register(&mut self, collider: Collider) -> ColliderId {
        if let Some(slot) = self.free.pop() {
            let i = slot as usize;
            self.prev_positions[i] = collider.position;
            self.velocities[i] = Vec3::ZERO;
            self.colliders[i] = Some(collider);
            ColliderId(slot)
        } else {
            self.prev_positions.push(collider.position);
            self.velocities.push(Vec3::ZERO);
            self.bounds.push(Aabb::EMPTY);
            self.colliders.push(Some(collider));
            ColliderId((self.colliders.len() - 1) as u32)
        }
    }

    pub fn unregister(&mut self, id: ColliderId) {
        if let Some(slot) = self.colliders.get_mut(id.index()) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id.index()).and_then(Option::as_ref)
    }

    pub fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    /// Moves a collider; the next `update` derives its velocity from
    /// the position change.
    pub fn set_transform(&mut self, id: ColliderId, position: Vec3, rotation: weft_math::Quat) {
        if let Some(c) = self.collider_mut(id) {
            c.position = position;
            c.rotation = rotation;
        }
    }

    pub fn add_edge_mesh(&mut self, mesh: EdgeMesh) -> EdgeMeshHandle {
        self.edge_meshes.push(Some(mesh));
        EdgeMeshHandle((self.edge_meshes.len() - 1) as u32)
    }

    pub fn remove_edge_mesh(&mut self, handle: EdgeMeshHandle) {
        if let Some(slot) = self.edge_meshes.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }

    pub fn sdf_cache(&self) -> &SdfCache {
        &self.sdf_cache
    }

    pub fn sdf_cache_mut(&mut self) -> &mut SdfCache {
        &mut self.sdf_cache
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    pub fn set_particle_material(&mut self, material: CollisionMaterial) {
        self.particle_material = material;
    }

    pub fn set_combine_mode(&mut self, mode: CombineMode) {
        self.combine_mode = mode;
    }

    pub fn set_actor_filter(&mut self, actor: ActorId, filter: CollisionFilter) {
        self.actor_filters.insert(actor.0, filter);
    }

    // ─── Queries ───

    /// Surface point, outward normal, and signed distance (all world
    /// space) from `point` to the collider surface. `None` when the
    /// shape's mesh or field handle is unresolved.
    pub fn surface(&self, collider: &Collider, point: Vec3) -> Option<(Vec3, Vec3, f32)> {
        let local = collider.to_local(point);
        let (surface, normal, dist) = match collider.shape {
            ColliderShape::EdgeMesh { handle } => self
                .edge_meshes
                .get(handle.0 as usize)?
                .as_ref()?
                .closest_surface(local)?,
            ColliderShape::DistanceField { handle } => {
                let field = self.sdf_cache.get(handle)?;
                let (dist, gradient) = field.sample(local);
                let normal = gradient.normalize_or_zero();
                if normal == Vec3::ZERO {
                    return None;
                }
                (local - normal * dist, normal, dist)
            }
            _ => collider.shape.local_surface(local)?,
        };
        Some((
            collider.to_world(surface),
            collider.dir_to_world(normal),
            dist * collider.scale,
        ))
    }

    fn world_bounds(&self, collider: &Collider) -> Aabb {
        let scale = collider.scale;
        match collider.shape {
            ColliderShape::Sphere { radius } => Aabb::from_sphere(collider.position, radius * scale),
            ColliderShape::Box3 { half_extents } => {
                let m = Mat3::from_quat(collider.rotation);
                let he = half_extents * scale;
                let ext = Vec3::new(
                    m.x_axis.x.abs() * he.x + m.y_axis.x.abs() * he.y + m.z_axis.x.abs() * he.z,
                    m.x_axis.y.abs() * he.x + m.y_axis.y.abs() * he.y + m.z_axis.y.abs() * he.z,
                    m.x_axis.z.abs() * he.x + m.y_axis.z.abs() * he.y + m.z_axis.z.abs() * he.z,
                );
                Aabb {
                    min: collider.position - ext,
                    max: collider.position + ext,
                }
            }
            ColliderShape::Capsule { radius, half_height } => {
                let axis = collider.rotation * Vec3::Y * (half_height * scale);
                Aabb::from_sphere(collider.position + axis, radius * scale)
                    .union(&Aabb::from_sphere(collider.position - axis, radius * scale))
            }
            ColliderShape::EdgeMesh { handle } => {
                match self.edge_meshes.get(handle.0 as usize).and_then(Option::as_ref) {
                    Some(mesh) => {
                        let mut aabb = Aabb::EMPTY;
                        for v in &mesh.vertices {
                            let w = collider.to_world(*v);
                            aabb = aabb.union(&Aabb { min: w, max: w });
                        }
                        aabb.expanded(mesh.thickness * scale)
                    }
                    None => Aabb::EMPTY,
                }
            }
            ColliderShape::DistanceField { handle } => match self.sdf_cache.get(handle) {
                Some(field) => {
                    let half = field.extent() * 0.5 * scale;
                    let center = match field.nodes.first() {
                        Some(root) => collider.to_world(root.center_xyz_size.truncate()),
                        None => collider.position,
                    };
                    // Conservative: the rotated cube fits in a sphere.
                    Aabb::from_sphere(center, half * 3.0f32.sqrt())
                }
                None => Aabb::EMPTY,
            },
        }
    }

    fn actor_filter(&self, actor: u32) -> CollisionFilter {
        self.actor_filters.get(&actor).copied().unwrap_or_default()
    }
}

impl CollisionBackend for ColliderWorld {
    /// Derives collider velocities from transform changes and rebuilds
    /// swept bounds.
    fn update(&mut self, dt: f32) {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        for i in 0..self.colliders.len() {
            let Some(collider) = self.colliders[i].as_ref() else {
                self.bounds[i] = Aabb::EMPTY;
                continue;
            };
            let velocity = (collider.position - self.prev_positions[i]) * inv_dt;
            self.velocities[i] = velocity;
            self.prev_positions[i] = collider.position;
            self.bounds[i] = self
                .world_bounds(collider)
                .expanded(collider.contact_offset + COLLISION_MARGIN)
                .swept(velocity * dt);
        }
    }

    fn generate_contacts(
        &mut self,
        store: &ParticleStore,
        particle_actors: &[u32],
        dt: f32,
        out: &mut Vec<Contact>,
    ) {
        for i in 0..store.capacity() {
            let actor = particle_actors[i];
            if actor == u32::MAX {
                continue;
            }
            let p = store.position(i);
            let radius = store.radius(i);
            let velocity = store.velocity(i);
            let particle_aabb = Aabb::from_sphere(p, radius + COLLISION_MARGIN).swept(velocity * dt);
            let filter = self.actor_filter(actor);

            for (ci, collider) in self.colliders.iter().enumerate() {
                let Some(collider) = collider.as_ref() else {
                    continue;
                };
                if !filter.collides_with(&collider.filter) {
                    continue;
                }
                if !self.bounds[ci].overlaps(&particle_aabb) {
                    continue;
                }

                let Some((point, normal, center_dist)) = self.surface(collider, p) else {
                    continue;
                };
                let surface_dist = center_dist - radius;

                // Speculative admission: keep the contact if the
                // particle can reach the offset surface this step.
                let approach = (velocity - self.velocities[ci]).dot(normal);
                if surface_dist + approach * dt > collider.contact_offset + COLLISION_MARGIN {
                    continue;
                }

                let material = MaterialTable::combine(
                    self.materials.get(collider.material),
                    self.particle_material,
                    self.combine_mode,
                );
                out.push(Contact {
                    particle: i as u32,
                    collider: ColliderId(ci as u32),
                    actor: ActorId(actor),
                    point: point.to_array(),
                    normal: normal.to_array(),
                    distance: surface_dist,
                    friction: material.friction,
                    restitution: material.restitution,
                    is_trigger: collider.is_trigger,
                });
            }
        }
        trace!(contacts = out.len(), "contact generation");
    }
}
