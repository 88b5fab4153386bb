//! Integration tests for weft-collision.

use weft_collision::sdf_builder::{self, SdfBuildSettings};
use weft_collision::{
    Collider, ColliderShape, ColliderWorld, CollisionFilter, CollisionMaterial, CombineMode, EdgeMesh,
    MaterialTable, SdfCache,
};
use weft_math::Vec3;
use weft_solver::{ActorBlueprint, CollisionBackend, ParticleStore, Solver, SolverConfig};
use weft_types::error::WeftError;
use weft_types::{ActorId, ColliderId, Contact};

/// Unit cube centered at the origin, outward wound.
fn cube_mesh() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let vertices = vec![
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
    ];
    let triangles = vec![
        [0, 3, 2],
        [0, 2, 1],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    (vertices, triangles)
}

// ─── Shapes ───

#[test]
fn sphere_surface_distance() {
    let shape = ColliderShape::Sphere { radius: 1.0 };
    let (point, normal, dist) = shape.local_surface(Vec3::new(3.0, 0.0, 0.0)).unwrap();
    assert!((dist - 2.0).abs() < 1e-6);
    assert_eq!(normal, Vec3::X);
    assert!((point - Vec3::X).length() < 1e-6);
}

#[test]
fn box_surface_outside_and_inside() {
    let shape = ColliderShape::Box3 {
        half_extents: Vec3::new(1.0, 1.0, 1.0),
    };

    let (_, normal, dist) = shape.local_surface(Vec3::new(2.0, 0.0, 0.0)).unwrap();
    assert!((dist - 1.0).abs() < 1e-6);
    assert_eq!(normal, Vec3::X);

    // Inside, closest to the +y face.
    let (point, normal, dist) = shape.local_surface(Vec3::new(0.2, 0.8, 0.0)).unwrap();
    assert!(dist < 0.0, "inside distance should be negative, got {dist}");
    assert!((dist + 0.2).abs() < 1e-6);
    assert_eq!(normal, Vec3::Y);
    assert!((point.y - 1.0).abs() < 1e-6);
}

#[test]
fn capsule_surface_beyond_cap() {
    let shape = ColliderShape::Capsule {
        radius: 0.5,
        half_height: 1.0,
    };
    // Directly above the top cap.
    let (_, normal, dist) = shape.local_surface(Vec3::new(0.0, 2.0, 0.0)).unwrap();
    assert!((dist - 0.5).abs() < 1e-6);
    assert_eq!(normal, Vec3::Y);
    // Beside the cylinder.
    let (_, normal, dist) = shape.local_surface(Vec3::new(1.0, 0.5, 0.0)).unwrap();
    assert!((dist - 0.5).abs() < 1e-6);
    assert_eq!(normal, Vec3::X);
}

#[test]
fn edge_mesh_closest_segment() {
    let mesh = EdgeMesh {
        vertices: vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
        edges: vec![[0, 1]],
        thickness: 0.1,
    };
    let (point, normal, dist) = mesh.closest_surface(Vec3::new(1.0, 1.0, 0.0)).unwrap();
    assert!((dist - 0.9).abs() < 1e-5);
    assert_eq!(normal, Vec3::Y);
    assert!((point - Vec3::new(1.0, 0.1, 0.0)).length() < 1e-5);
}

#[test]
fn collision_filter_categories() {
    let cloth = CollisionFilter {
        category: 0b01,
        mask: 0b10,
    };
    let world_geo = CollisionFilter {
        category: 0b10,
        mask: u32::MAX,
    };
    let debris = CollisionFilter {
        category: 0b100,
        mask: 0b100,
    };
    assert!(cloth.collides_with(&world_geo));
    assert!(!cloth.collides_with(&debris));
}

// ─── Materials ───

#[test]
fn material_combine_modes() {
    let a = CollisionMaterial {
        friction: 0.4,
        restitution: 0.0,
    };
    let b = CollisionMaterial {
        friction: 0.9,
        restitution: 0.5,
    };

    let avg = MaterialTable::combine(a, b, CombineMode::Average);
    assert!((avg.friction - 0.65).abs() < 1e-6);
    let geo = MaterialTable::combine(a, b, CombineMode::Geometric);
    assert!((geo.friction - (0.4f32 * 0.9).sqrt()).abs() < 1e-6);
    let min = MaterialTable::combine(a, b, CombineMode::Minimum);
    assert_eq!(min.friction, 0.4);

    // Restitution always takes the bouncier side.
    assert_eq!(avg.restitution, 0.5);
}

// ─── Distance fields ───

#[test]
fn sdf_of_cube_has_correct_sign_and_magnitude() {
    let (vertices, triangles) = cube_mesh();
    let settings = SdfBuildSettings {
        max_error: 0.005,
        max_depth: 5,
        margin: 0.5,
    };
    let field = sdf_builder::build(&vertices, &triangles, &settings, None).unwrap();
    assert!(field.node_count() > 1, "cube field should subdivide");

    let (inside, _) = field.sample(Vec3::ZERO);
    assert!((inside + 0.5).abs() < 0.1, "center distance {inside}");

    let (outside, gradient) = field.sample(Vec3::new(1.0, 0.0, 0.0));
    assert!((outside - 0.5).abs() < 0.1, "outside distance {outside}");
    assert!(gradient.normalize().dot(Vec3::X) > 0.8, "gradient {gradient}");
}

#[test]
fn sdf_far_query_clamps_to_root() {
    let (vertices, triangles) = cube_mesh();
    let field = sdf_builder::build(&vertices, &triangles, &SdfBuildSettings::default(), None).unwrap();
    let (dist, gradient) = field.sample(Vec3::new(100.0, 0.0, 0.0));
    assert!(dist > 90.0, "far distance {dist}");
    assert!(gradient.dot(Vec3::X) > 0.99);
}

#[test]
fn sdf_build_reports_progress_and_cancels() {
    let (vertices, triangles) = cube_mesh();

    let mut fractions = Vec::new();
    let mut record = |f: f32| {
        fractions.push(f);
        true
    };
    sdf_builder::build(&vertices, &triangles, &SdfBuildSettings::default(), Some(&mut record)).unwrap();
    assert_eq!(*fractions.last().unwrap(), 1.0);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1] + 1e-6));

    let mut cancel = |_f: f32| false;
    let result = sdf_builder::build(&vertices, &triangles, &SdfBuildSettings::default(), Some(&mut cancel));
    assert!(matches!(result, Err(WeftError::BuildCancelled)));
}

#[test]
fn sdf_cache_shares_and_evicts() {
    let (vertices, triangles) = cube_mesh();
    let mut cache = SdfCache::new();
    let settings = SdfBuildSettings::default();

    let a = cache.acquire_or_build(&vertices, &triangles, &settings, None).unwrap();
    let b = cache.acquire_or_build(&vertices, &triangles, &settings, None).unwrap();
    assert_eq!(a, b, "identical meshes must share one field");
    assert_eq!(cache.len(), 1);

    cache.release(a);
    assert_eq!(cache.len(), 1, "still referenced");
    cache.release(b);
    assert!(cache.is_empty(), "last release evicts");

    assert!(cache.acquire(a).is_none(), "evicted handle cannot be re-acquired");
}

// ─── World and contact generation ───

fn single_particle_store(position: Vec3, radius: f32, velocity: Vec3) -> (ParticleStore, Vec<u32>) {
    let mut store = ParticleStore::new(1);
    store.allocate(1).unwrap();
    store.set_position(0, position);
    store.set_radius(0, radius);
    store.set_velocity(0, velocity);
    store.inv_masses[0] = 1.0;
    (store, vec![0])
}

fn contacts_for(world: &mut ColliderWorld, store: &ParticleStore, actors: &[u32], dt: f32) -> Vec<Contact> {
    let mut out = Vec::new();
    world.update(dt);
    world.generate_contacts(store, actors, dt, &mut out);
    out
}

#[test]
fn world_register_reuses_slots() {
    let mut world = ColliderWorld::new();
    let a = world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::ZERO));
    let b = world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::X));
    assert_ne!(a, b);

    world.unregister(a);
    assert_eq!(world.collider_count(), 1);
    let c = world.register(Collider::new(ColliderShape::Sphere { radius: 2.0 }, Vec3::Y));
    assert_eq!(c, a, "freed slot should be reused");
}

#[test]
fn resting_particle_generates_contact() {
    let mut world = ColliderWorld::new();
    world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::ZERO));

    let (store, actors) = single_particle_store(Vec3::new(0.0, 1.09, 0.0), 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert_eq!(contacts.len(), 1);
    let c = &contacts[0];
    assert!(c.distance.abs() < 0.02, "surface distance {}", c.distance);
    assert!(Vec3::from(c.normal).dot(Vec3::Y) > 0.99);
}

#[test]
fn distant_static_particle_generates_nothing() {
    let mut world = ColliderWorld::new();
    world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::ZERO));

    let (store, actors) = single_particle_store(Vec3::new(0.0, 3.0, 0.0), 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert!(contacts.is_empty());
}

#[test]
fn fast_approach_is_admitted_speculatively() {
    let mut world = ColliderWorld::new();
    world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::ZERO));

    // 2 m above the surface, closing at 150 m/s: crosses this step.
    let (store, actors) = single_particle_store(Vec3::new(0.0, 3.0, 0.0), 0.1, Vec3::new(0.0, -150.0, 0.0));
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert_eq!(contacts.len(), 1, "speculative contact expected");
    assert!(contacts[0].distance > 0.0, "not yet penetrating");
}

#[test]
fn filters_suppress_contacts() {
    let mut world = ColliderWorld::new();
    let mut collider = Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::ZERO);
    collider.filter = CollisionFilter {
        category: 0b10,
        mask: 0b10,
    };
    world.register(collider);
    world.set_actor_filter(
        ActorId(0),
        CollisionFilter {
            category: 0b01,
            mask: 0b01,
        },
    );

    let (store, actors) = single_particle_store(Vec3::new(0.0, 1.05, 0.0), 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert!(contacts.is_empty());
}

#[test]
fn trigger_colliders_flag_their_contacts() {
    let mut world = ColliderWorld::new();
    let mut collider = Collider::new(ColliderShape::Box3 { half_extents: Vec3::ONE }, Vec3::ZERO);
    collider.is_trigger = true;
    world.register(collider);

    let (store, actors) = single_particle_store(Vec3::new(0.0, 0.5, 0.0), 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert_eq!(contacts.len(), 1);
    assert!(contacts[0].is_trigger);
}

#[test]
fn unresolved_sdf_handle_is_skipped() {
    use weft_collision::SdfHandle;

    let mut world = ColliderWorld::new();
    world.register(Collider::new(
        ColliderShape::DistanceField {
            handle: SdfHandle(0xDEAD),
        },
        Vec3::ZERO,
    ));

    let (store, actors) = single_particle_store(Vec3::ZERO, 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert!(contacts.is_empty());
}

#[test]
fn sdf_collider_produces_outward_contacts() {
    let (vertices, triangles) = cube_mesh();
    let mut world = ColliderWorld::new();
    let handle = world
        .sdf_cache_mut()
        .acquire_or_build(&vertices, &triangles, &SdfBuildSettings::default(), None)
        .unwrap();
    world.register(Collider::new(ColliderShape::DistanceField { handle }, Vec3::ZERO));

    let (store, actors) = single_particle_store(Vec3::new(0.0, 0.55, 0.0), 0.05, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert_eq!(contacts.len(), 1);
    assert!(Vec3::from(contacts[0].normal).dot(Vec3::Y) > 0.7);
}

// ─── End-to-end with the solver ───

#[test]
fn particle_rests_on_sphere() {
    let mut world = ColliderWorld::new();
    world.register(Collider::new(ColliderShape::Sphere { radius: 0.5 }, Vec3::ZERO));

    let mut config = SolverConfig::default();
    config.damping = 0.2;
    let mut solver = Solver::new(4, config);
    let bp = ActorBlueprint {
        positions: vec![Vec3::new(0.0, 1.0, 0.0)],
        inv_masses: vec![1.0],
        radii: vec![0.1],
        ..ActorBlueprint::default()
    };
    solver.add_actor(&bp).unwrap();
    solver.set_collision_backend(Box::new(world));

    for _ in 0..240 {
        solver.step(1.0 / 60.0);
    }
    let y = solver.store.position(0).y;
    assert!((y - 0.6).abs() < 0.03, "rest height {y}");

    // The collider received downward reaction impulses.
    let impulses = solver.take_rigid_impulses();
    assert!(impulses.iter().all(|(id, _)| *id == ColliderId(0)));
}

#[test]
fn moving_collider_velocity_enters_admission() {
    let mut world = ColliderWorld::new();
    let id = world.register(Collider::new(ColliderShape::Sphere { radius: 1.0 }, Vec3::new(0.0, -5.0, 0.0)));

    // Prime prev_position, then teleport upward: the derived collider
    // velocity closes on the particle even though the particle rests.
    world.update(1.0 / 60.0);
    world.set_transform(id, Vec3::new(0.0, -1.2, 0.0), weft_math::Quat::IDENTITY);

    let (store, actors) = single_particle_store(Vec3::ZERO, 0.1, Vec3::ZERO);
    let contacts = contacts_for(&mut world, &store, &actors, 1.0 / 60.0);
    assert_eq!(contacts.len(), 1, "approaching collider admits contact");
}
