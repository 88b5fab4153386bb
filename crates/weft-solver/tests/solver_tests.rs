//! Integration tests for weft-solver.

use weft_math::{Quat, Vec3};
use weft_solver::blueprint::{self, DistanceSpec, ShapeMatchingSpec, TetherSpec};
use weft_solver::constraint::{
    ConstraintBatch, DistanceBatch, Plasticity, ShapeMatchingBatch, SkinBatch, StretchShearBatch,
    SubstepContext, TetherBatch, VolumeBatch,
};
use weft_solver::{
    ActorBlueprint, CollisionBackend, ConstraintBatcher, ExecutionMode, ParticleStore, Solver, SolverConfig,
    StitchSpec,
};
use weft_types::error::WeftError;
use weft_types::{ActorId, ColliderId, Contact};

const DT: f32 = 1.0 / 60.0;

fn ctx(dt: f32) -> SubstepContext {
    SubstepContext {
        step_dt: dt,
        dt,
        wind: Vec3::ZERO,
    }
}

// ─── Particle store ───

#[test]
fn store_allocates_first_fit() {
    let mut store = ParticleStore::new(100);
    let a = store.allocate(30).unwrap();
    let b = store.allocate(30).unwrap();
    assert_eq!(a.start, 0);
    assert_eq!(b.start, 30);
    assert_eq!(store.allocated(), 60);
}

#[test]
fn store_rejects_over_capacity() {
    let mut store = ParticleStore::new(10);
    store.allocate(8).unwrap();
    match store.allocate(4) {
        Err(WeftError::CapacityExceeded { requested, available }) => {
            assert_eq!(requested, 4);
            assert_eq!(available, 2);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
}

#[test]
fn store_free_coalesces_neighbors() {
    let mut store = ParticleStore::new(90);
    let a = store.allocate(30).unwrap();
    let b = store.allocate(30).unwrap();
    let c = store.allocate(30).unwrap();
    assert_eq!(store.largest_free_block(), 0);

    // Free the middle, then the left: both must merge so that a full
    // 60-slot request fits again.
    store.free(b);
    store.free(a);
    assert_eq!(store.largest_free_block(), 60);
    store.free(c);
    assert_eq!(store.largest_free_block(), 90);
}

#[test]
fn store_allocate_resets_stale_state() {
    let mut store = ParticleStore::new(4);
    let r = store.allocate(2).unwrap();
    store.set_position(0, Vec3::splat(5.0));
    store.inv_masses[0] = 1.0;
    store.free(r);

    let r = store.allocate(2).unwrap();
    assert_eq!(r.start, 0);
    assert_eq!(store.position(0), Vec3::ZERO);
    assert_eq!(store.inv_masses[0], 0.0);
}

#[test]
fn store_resize_extends_free_space() {
    let mut store = ParticleStore::new(4);
    store.allocate(4).unwrap();
    store.resize(10);
    let r = store.allocate(6).unwrap();
    assert_eq!(r.start, 4);
}

// ─── Graph coloring ───

#[test]
fn coloring_chain_uses_two_colors() {
    let mut batcher = ConstraintBatcher::new();
    for i in 0..10u32 {
        batcher.add_constraint(&[i, i + 1]);
    }
    let colors = batcher.colorize();
    assert_eq!(colors.iter().copied().max().unwrap(), 1);
}

#[test]
fn coloring_batches_are_conflict_free() {
    // 4-cycle: needs at least 2 colors, and no batch may contain two
    // constraints sharing a particle.
    let edges = [[0u32, 1], [1, 2], [2, 3], [3, 0]];
    let mut batcher = ConstraintBatcher::new();
    for e in &edges {
        batcher.add_constraint(e);
    }

    let batches = batcher.partition();
    assert!(batches.len() >= 2);

    let total: usize = batches.iter().map(Vec::len).sum();
    assert_eq!(total, edges.len());

    for batch in &batches {
        let mut seen = std::collections::HashSet::new();
        for &i in batch {
            for &p in &edges[i as usize] {
                assert!(seen.insert(p), "batch shares particle {p}");
            }
        }
    }
}

// ─── Distance constraints ───

#[test]
fn distance_constraint_restores_rest_length() {
    let mut store = ParticleStore::new(2);
    store.allocate(2).unwrap();
    store.set_position(1, Vec3::new(2.0, 0.0, 0.0));
    store.inv_masses[0] = 0.0; // pinned
    store.inv_masses[1] = 1.0;

    let mut batch = DistanceBatch::new();
    batch.set_constraints(&[[0, 1]], &[1.0], &[0.0]);

    let c = ctx(DT);
    for _ in 0..20 {
        batch.reset_lambdas();
        batch.evaluate(&mut store, &c);
        batch.apply(&mut store, 1.0);
    }

    let len = (store.position(1) - store.position(0)).length();
    assert!((len - 1.0).abs() < 1e-3, "length {len}");
    assert_eq!(store.position(0), Vec3::ZERO, "pinned particle moved");
}

#[test]
fn higher_compliance_stretches_more() {
    let stretch = |compliance: f32| {
        let mut store = ParticleStore::new(2);
        store.allocate(2).unwrap();
        store.set_position(1, Vec3::new(0.0, -1.0, 0.0));
        store.inv_masses[1] = 1.0;

        let mut batch = DistanceBatch::new();
        batch.set_constraints(&[[0, 1]], &[1.0], &[compliance]);

        // Pull down, then solve one substep worth of iterations.
        store.set_position(1, Vec3::new(0.0, -1.5, 0.0));
        let c = ctx(DT);
        batch.reset_lambdas();
        for _ in 0..10 {
            batch.evaluate(&mut store, &c);
            batch.apply(&mut store, 1.0);
        }
        (store.position(1) - store.position(0)).length() - 1.0
    };

    let stiff = stretch(0.0);
    let soft = stretch(0.01);
    assert!(stiff < soft, "stiff {stiff} soft {soft}");
    assert!(stiff.abs() < 1e-3);
}

#[test]
fn distance_plasticity_creeps_rest_length() {
    let mut store = ParticleStore::new(2);
    store.allocate(2).unwrap();
    store.set_position(1, Vec3::new(1.5, 0.0, 0.0));
    store.inv_masses[1] = 1.0;

    let mut batch = DistanceBatch::new();
    batch.set_constraints(&[[0, 1]], &[1.0], &[0.0]);
    batch.set_plasticity(Some(Plasticity {
        yield_threshold: 0.1,
        creep_rate: 2.0,
    }));

    // Violation C = 0.5 exceeds the yield threshold, so one evaluation
    // moves the rest length by exactly C * creep * dt.
    let c = ctx(DT);
    batch.reset_lambdas();
    batch.evaluate(&mut store, &c);
    let expected = 1.0 + 0.5 * 2.0 * DT;
    assert!((batch.rest_length(0) - expected).abs() < 1e-6);
}

#[test]
fn plasticity_below_yield_leaves_rest_untouched() {
    let mut store = ParticleStore::new(2);
    store.allocate(2).unwrap();
    store.set_position(1, Vec3::new(1.05, 0.0, 0.0));
    store.inv_masses[1] = 1.0;

    let mut batch = DistanceBatch::new();
    batch.set_constraints(&[[0, 1]], &[1.0], &[0.0]);
    batch.set_plasticity(Some(Plasticity {
        yield_threshold: 0.1,
        creep_rate: 2.0,
    }));

    batch.evaluate(&mut store, &ctx(DT));
    assert_eq!(batch.rest_length(0), 1.0);
}

// ─── Pinned particles ───

#[test]
fn pinned_particle_ignores_every_constraint_type() {
    // Particle 0 is pinned at the origin; particles 1..4 complete a
    // unit tetrahedron. Each batch gets a violated constraint touching
    // the pin, and the pin must stay exactly in place while the free
    // particles move.
    let make_store = || {
        let mut store = ParticleStore::new(4);
        store.allocate(4).unwrap();
        store.set_position(1, Vec3::X);
        store.set_position(2, Vec3::Y);
        store.set_position(3, Vec3::Z);
        store.inv_masses.copy_from_slice(&[0.0, 1.0, 1.0, 1.0]);
        store
    };
    let c = ctx(DT);

    // Volume: current volume 1/6 against rest volume 1.
    let mut store = make_store();
    let mut volume = VolumeBatch::new();
    let tris = [[0u32, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
    volume.push_constraint(&tris, 1.0, 1.0, 0.0);
    volume.reset_lambdas();
    volume.evaluate(&mut store, &c);
    volume.apply(&mut store, 1.0);
    assert_eq!(store.position(0), Vec3::ZERO, "volume moved the pin");
    assert_ne!(store.position(1), Vec3::X, "volume left free particles static");

    // Skin: attachment far away, radius badly violated.
    let mut store = make_store();
    let mut skin = SkinBatch::new();
    skin.set_constraints(&[0], &[Vec3::splat(5.0)], &[Vec3::Y], &[0.1], &[0.0], &[0.0]);
    skin.reset_lambdas();
    skin.evaluate(&mut store, &c);
    skin.apply(&mut store, 1.0);
    assert_eq!(store.position(0), Vec3::ZERO, "skin moved the pin");

    // Stretch/shear: the segment points along X, the director along Z.
    let mut store = make_store();
    let mut rod = StretchShearBatch::new();
    rod.set_constraints(&[[0, 1]], &[0], &[1.0], &[Vec3::ZERO]);
    rod.reset_lambdas();
    rod.evaluate(&mut store, &c);
    rod.apply(&mut store, 1.0);
    assert_eq!(store.position(0), Vec3::ZERO, "stretch/shear moved the pin");
    assert_ne!(store.position(1), Vec3::X, "stretch/shear left free particles static");

    // Shape matching: deform a free member after capturing rest.
    let mut store = make_store();
    let mut cluster = ShapeMatchingBatch::new();
    cluster.push_cluster(&[0, 1, 2, 3], 1.0, &store);
    store.set_position(1, Vec3::new(2.0, 0.0, 0.0));
    cluster.evaluate(&mut store, &c);
    cluster.apply(&mut store, 1.0);
    assert_eq!(store.position(0), Vec3::ZERO, "shape matching moved the pin");
    assert_ne!(
        store.position(1),
        Vec3::new(2.0, 0.0, 0.0),
        "shape matching left the deformed member static"
    );
}

// ─── Tether and volume ───

#[test]
fn tether_inactive_inside_limit() {
    let mut store = ParticleStore::new(2);
    store.allocate(2).unwrap();
    store.set_position(0, Vec3::new(0.5, 0.0, 0.0));
    store.inv_masses[0] = 1.0;

    let mut batch = TetherBatch::new();
    batch.set_constraints(&[[0, 1]], &[1.0], &[1.0], &[0.0]);
    batch.evaluate(&mut store, &ctx(DT));
    batch.apply(&mut store, 1.0);
    assert_eq!(store.position(0), Vec3::new(0.5, 0.0, 0.0));
}

#[test]
fn tether_pulls_back_past_limit() {
    let mut store = ParticleStore::new(2);
    store.allocate(2).unwrap();
    store.set_position(0, Vec3::new(2.0, 0.0, 0.0));
    store.inv_masses[0] = 1.0;

    let mut batch = TetherBatch::new();
    batch.set_constraints(&[[0, 1]], &[1.0], &[1.0], &[0.0]);
    for _ in 0..10 {
        batch.reset_lambdas();
        batch.evaluate(&mut store, &ctx(DT));
        batch.apply(&mut store, 1.0);
    }
    let dist = store.position(0).length();
    assert!((dist - 1.0).abs() < 1e-3, "distance {dist}");
}

#[test]
fn volume_of_unit_tetrahedron() {
    let mut store = ParticleStore::new(4);
    store.allocate(4).unwrap();
    store.set_position(1, Vec3::X);
    store.set_position(2, Vec3::Y);
    store.set_position(3, Vec3::Z);

    let mut batch = VolumeBatch::new();
    // Outward-wound faces of the tetrahedron (0, X, Y, Z).
    batch.push_constraint(
        &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        1.0 / 6.0,
        1.0,
        0.0,
    );
    let v = batch.current_volume(0, &store);
    assert!((v - 1.0 / 6.0).abs() < 1e-6, "volume {v}");
}

// ─── End-to-end: hanging chain ───

fn hanging_chain_solver(mode: ExecutionMode) -> Solver {
    let config = SolverConfig {
        damping: 0.2,
        mode,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(16, config);
    let mut bp = blueprint::rope(Vec3::ZERO, 10, 1.0, 0.1, 0.05, 0.0);
    bp.pin(0);
    solver.add_actor(&bp).unwrap();
    solver
}

#[test]
fn hanging_chain_settles_to_rest_length() {
    let mut solver = hanging_chain_solver(ExecutionMode::Sequential);
    for _ in 0..300 {
        solver.step(DT);
    }

    let length: f32 = (0..9)
        .map(|i| (solver.store.position(i + 1) - solver.store.position(i)).length())
        .sum();
    assert!((length - 9.0).abs() < 0.09, "chain length {length}");
    assert_eq!(solver.store.position(0), Vec3::ZERO, "pinned root moved");
}

#[test]
fn parallel_mode_also_settles() {
    let mut solver = hanging_chain_solver(ExecutionMode::Parallel);
    for _ in 0..300 {
        solver.step(DT);
    }
    let length: f32 = (0..9)
        .map(|i| (solver.store.position(i + 1) - solver.store.position(i)).length())
        .sum();
    assert!((length - 9.0).abs() < 0.2, "chain length {length}");
}

#[test]
fn stepping_is_deterministic() {
    let run = || {
        let mut solver = hanging_chain_solver(ExecutionMode::Sequential);
        for _ in 0..50 {
            solver.step(DT);
        }
        solver.packed_positions()
    };
    assert_eq!(run(), run());
}

// ─── Actors and stitches ───

#[test]
fn actor_slots_are_reused() {
    let mut solver = Solver::new(32, SolverConfig::default());
    let bp = blueprint::rope(Vec3::ZERO, 8, 1.0, 0.1, 0.05, 0.0);
    let a = solver.add_actor(&bp).unwrap();
    let b = solver.add_actor(&bp).unwrap();
    assert_ne!(a, b);
    assert_eq!(solver.actor_count(), 2);

    solver.remove_actor(a);
    assert_eq!(solver.actor_count(), 1);
    let c = solver.add_actor(&bp).unwrap();
    assert_eq!(c, a, "freed slot and range should be reused");
}

#[test]
fn blueprint_validation_catches_bad_index() {
    let mut bp = blueprint::rope(Vec3::ZERO, 4, 1.0, 0.1, 0.05, 0.0);
    bp.distance.push(DistanceSpec {
        particles: [0, 99],
        rest_length: 1.0,
        compliance: 0.0,
    });
    let mut solver = Solver::new(8, SolverConfig::default());
    assert!(matches!(solver.add_actor(&bp), Err(WeftError::InvalidBlueprint(_))));
}

#[test]
fn stitch_pulls_actors_together() {
    let mut config = SolverConfig::default();
    config.gravity = [0.0, 0.0, 0.0];
    config.damping = 0.2;
    let mut solver = Solver::new(8, config);

    let mut bp = ActorBlueprint {
        positions: vec![Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)],
        inv_masses: vec![0.0, 1.0],
        radii: vec![0.05; 2],
        ..ActorBlueprint::default()
    };
    bp.distance.push(DistanceSpec {
        particles: [0, 1],
        rest_length: 1.0,
        compliance: 0.0,
    });
    let a = solver.add_actor(&bp).unwrap();

    bp.positions = vec![Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.5, -1.0, 0.0)];
    let b = solver.add_actor(&bp).unwrap();

    // Stitch the two free ends with zero rest length.
    let pa = solver.actor(a).unwrap().range.start + 1;
    let pb = solver.actor(b).unwrap().range.start + 1;
    solver.set_stitches(&[StitchSpec {
        particles: [pa, pb],
        rest_length: 0.0,
        compliance: 0.0,
    }]);

    // The ends start 1.5 apart and can meet: a point 1.0 below and
    // between the two pinned tops satisfies both distance constraints.
    for _ in 0..120 {
        solver.step(DT);
    }
    let after = (solver.store.position(pa as usize) - solver.store.position(pb as usize)).length();
    assert!(after < 0.2, "stitch gap {after}");
}

// ─── Shape matching ───

#[test]
fn shape_matching_recovers_rest_shape() {
    let mut config = SolverConfig::default();
    config.gravity = [0.0, 0.0, 0.0];
    config.damping = 0.3;
    let mut solver = Solver::new(8, config);

    let mut bp = ActorBlueprint {
        positions: vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
        ],
        inv_masses: vec![1.0; 4],
        radii: vec![0.05; 4],
        ..ActorBlueprint::default()
    };
    bp.shape_matching.push(ShapeMatchingSpec {
        members: vec![0, 1, 2, 3],
        stiffness: 0.5,
    });
    solver.add_actor(&bp).unwrap();

    // Squash one corner, then let the cluster relax.
    solver.store.set_position(1, Vec3::new(0.4, 0.0, 0.0));
    for _ in 0..120 {
        solver.step(DT);
    }

    let d01 = (solver.store.position(1) - solver.store.position(0)).length();
    assert!((d01 - 1.0).abs() < 0.05, "edge length {d01}");
}

// ─── Oriented particles ───

#[test]
fn bend_twist_is_stable_at_rest() {
    use weft_solver::blueprint::BendTwistSpec;

    let mut config = SolverConfig::default();
    config.gravity = [0.0, 0.0, 0.0];
    let mut solver = Solver::new(4, config);

    let mut bp = ActorBlueprint {
        positions: vec![Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)],
        inv_masses: vec![0.0, 1.0],
        radii: vec![0.05; 2],
        orientations: vec![Quat::IDENTITY; 2],
        inv_rot_masses: vec![1.0; 2],
        ..ActorBlueprint::default()
    };
    bp.bend_twist.push(BendTwistSpec {
        particles: [0, 1],
        rest_darboux: Vec3::ZERO,
        compliance: Vec3::ZERO,
    });
    solver.add_actor(&bp).unwrap();

    for _ in 0..30 {
        solver.step(DT);
    }
    let q = solver.store.orientations[1];
    assert!(q.angle_between(Quat::IDENTITY) < 1e-3);
}

// ─── Collision backend and contact events ───

/// Backend that reports a fixed contact for a configurable number of
/// steps, then goes silent.
struct ScriptedBackend {
    steps_with_contact: u32,
    steps_seen: u32,
}

impl CollisionBackend for ScriptedBackend {
    fn update(&mut self, _dt: f32) {
        self.steps_seen += 1;
    }

    fn generate_contacts(
        &mut self,
        _store: &ParticleStore,
        particle_actors: &[u32],
        _dt: f32,
        out: &mut Vec<Contact>,
    ) {
        if self.steps_seen <= self.steps_with_contact {
            out.push(Contact {
                particle: 0,
                collider: ColliderId(7),
                actor: ActorId(particle_actors[0]),
                point: [0.0, -0.1, 0.0],
                normal: [0.0, 1.0, 0.0],
                distance: 0.01,
                friction: 0.0,
                restitution: 0.0,
                is_trigger: true,
            });
        }
    }
}

#[test]
fn contact_events_follow_enter_stay_exit() {
    use weft_events::ContactPhase;

    let mut solver = Solver::new(4, SolverConfig::default());
    let bp = ActorBlueprint {
        positions: vec![Vec3::ZERO],
        inv_masses: vec![0.0],
        radii: vec![0.05],
        ..ActorBlueprint::default()
    };
    solver.add_actor(&bp).unwrap();
    solver.set_collision_backend(Box::new(ScriptedBackend {
        steps_with_contact: 2,
        steps_seen: 0,
    }));

    let phases = |solver: &Solver| -> Vec<ContactPhase> {
        solver.contact_events().iter().map(|e| e.phase).collect()
    };

    solver.step(DT);
    assert_eq!(phases(&solver), vec![ContactPhase::Enter]);
    solver.step(DT);
    assert_eq!(phases(&solver), vec![ContactPhase::Stay]);
    solver.step(DT);
    assert_eq!(phases(&solver), vec![ContactPhase::Exit]);
    solver.step(DT);
    assert!(phases(&solver).is_empty());
}

#[test]
fn contact_projection_resolves_penetration() {
    /// Ground plane at y = 0 reported as a penetrating contact.
    struct GroundBackend;
    impl CollisionBackend for GroundBackend {
        fn update(&mut self, _dt: f32) {}
        fn generate_contacts(
            &mut self,
            store: &ParticleStore,
            particle_actors: &[u32],
            _dt: f32,
            out: &mut Vec<Contact>,
        ) {
            for i in 0..store.capacity() {
                if particle_actors[i] == u32::MAX {
                    continue;
                }
                let p = store.position(i);
                let r = store.radius(i);
                if p.y - r < 0.05 {
                    out.push(Contact {
                        particle: i as u32,
                        collider: ColliderId(0),
                        actor: ActorId(particle_actors[i]),
                        point: [p.x, 0.0, p.z],
                        normal: [0.0, 1.0, 0.0],
                        distance: p.y - r,
                        friction: 0.2,
                        restitution: 0.0,
                        is_trigger: false,
                    });
                }
            }
        }
    }

    let mut solver = Solver::new(4, SolverConfig::default());
    let bp = ActorBlueprint {
        positions: vec![Vec3::new(0.0, 0.5, 0.0)],
        inv_masses: vec![1.0],
        radii: vec![0.1],
        ..ActorBlueprint::default()
    };
    solver.add_actor(&bp).unwrap();
    solver.set_collision_backend(Box::new(GroundBackend));

    for _ in 0..120 {
        solver.step(DT);
    }
    let y = solver.store.position(0).y;
    assert!(y >= 0.1 - 1e-3, "particle sank to y = {y}");
    assert!(y < 0.2, "particle hovering at y = {y}");
}

// ─── Config and interpolation ───

#[test]
fn config_validation() {
    assert!(SolverConfig::default().validate().is_ok());
    assert!(SolverConfig::high_quality().validate().is_ok());

    let bad = SolverConfig {
        substeps: 0,
        ..SolverConfig::default()
    };
    assert!(matches!(bad.validate(), Err(WeftError::InvalidConfig(_))));

    let bad = SolverConfig {
        damping: 1.5,
        ..SolverConfig::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn config_round_trips_through_json() {
    let config = SolverConfig::high_quality();
    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.substeps, 8);
    assert_eq!(back.mode, config.mode);
}

#[test]
fn interpolation_blends_between_steps() {
    let mut config = SolverConfig::default();
    config.gravity = [0.0, 0.0, 0.0];
    let mut solver = Solver::new(4, config);
    let bp = ActorBlueprint {
        positions: vec![Vec3::ZERO],
        inv_masses: vec![1.0],
        radii: vec![0.05],
        ..ActorBlueprint::default()
    };
    solver.add_actor(&bp).unwrap();
    solver.store.set_velocity(0, Vec3::new(1.0, 0.0, 0.0));

    solver.step(1.0);
    let end_x = solver.store.position(0).x;

    solver.interpolate(1.0, 0.5);
    let mid_x = solver.render_state().render_positions[0].x;
    assert!((mid_x - end_x * 0.5).abs() < 1e-4, "mid {mid_x} end {end_x}");
}

#[test]
fn blueprint_tethers_cap_rope_length() {
    // Blueprint-level tethers reach the solver as inequality batches.
    let mut config = SolverConfig::default();
    config.damping = 0.2;
    let mut solver = Solver::new(16, config);
    let mut bp = blueprint::rope(Vec3::ZERO, 6, 1.0, 0.1, 0.05, 0.01);
    bp.pin(0);
    for i in 1..6 {
        bp.tether.push(TetherSpec {
            particles: [i, 0],
            max_length: i as f32,
            scale: 1.0,
            compliance: 0.0,
        });
    }
    solver.add_actor(&bp).unwrap();

    for _ in 0..300 {
        solver.step(DT);
    }
    // Soft distance constraints alone would stretch past 5.0 + 2%;
    // tethers cap the total length.
    let end = solver.store.position(5).length();
    assert!(end <= 5.0 + 1e-2, "end distance {end}");
}

#[test]
fn batch_kind_reports_correctly() {
    let batch = ConstraintBatch::Distance(DistanceBatch::new());
    assert_eq!(batch.kind(), weft_solver::ConstraintKind::Distance);
    assert!(batch.is_empty());
}
