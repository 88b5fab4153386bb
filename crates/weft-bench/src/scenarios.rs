//! Standard benchmark scenarios.
//!
//! Each scenario builds a fully configured solver from scratch so
//! repeated runs are independent and deterministic.

use weft_collision::{Collider, ColliderShape, ColliderWorld};
use weft_math::Vec3;
use weft_solver::constraint::Plasticity;
use weft_solver::{blueprint, Solver, SolverConfig};

/// A named, self-contained benchmark setup.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    /// Fixed timestep the scenario is tuned for.
    pub dt: f32,
    /// Step count for a standard run.
    pub steps: u32,
    builder: fn() -> Solver,
}

impl Scenario {
    /// Builds a fresh solver for this scenario.
    pub fn build(&self) -> Solver {
        (self.builder)()
    }

    pub fn all() -> &'static [Scenario] {
        &SCENARIOS
    }

    pub fn by_name(name: &str) -> Option<Scenario> {
        SCENARIOS.iter().find(|s| s.name == name).copied()
    }
}

static SCENARIOS: [Scenario; 3] = [
    Scenario {
        name: "hanging_chain",
        description: "10-particle pinned rope settling under gravity",
        dt: 1.0 / 60.0,
        steps: 200,
        builder: hanging_chain,
    },
    Scenario {
        name: "cloth_drape",
        description: "16x16 cloth grid draping over a sphere",
        dt: 1.0 / 60.0,
        steps: 300,
        builder: cloth_drape,
    },
    Scenario {
        name: "plastic_hinge",
        description: "cantilevered rope bending past its plastic yield",
        dt: 1.0 / 60.0,
        steps: 300,
        builder: plastic_hinge,
    },
];

fn hanging_chain() -> Solver {
    let config = SolverConfig {
        damping: 0.2,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(16, config);
    let mut bp = blueprint::rope(Vec3::ZERO, 10, 1.0, 0.1, 0.05, 0.0);
    bp.pin(0);
    solver.add_actor(&bp).expect("chain fits capacity");
    solver
}

fn cloth_drape() -> Solver {
    let config = SolverConfig {
        damping: 0.1,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(512, config);

    // 16x16 grid, 1.5 m square, centered above a 0.5 m sphere.
    let bp = blueprint::cloth_grid(Vec3::new(-0.75, 0.8, -0.75), 16, 16, 0.1, 0.01, 0.02, 1.0e-5);
    solver.add_actor(&bp).expect("cloth fits capacity");

    let mut world = ColliderWorld::new();
    world.register(Collider::new(ColliderShape::Sphere { radius: 0.5 }, Vec3::ZERO));
    solver.set_collision_backend(Box::new(world));
    solver
}

fn plastic_hinge() -> Solver {
    let config = SolverConfig {
        damping: 0.2,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(32, config);

    // Horizontal rope clamped at one end; gravity bends it past the
    // yield threshold and the bend constraints hold the sag.
    let mut bp = blueprint::rope(Vec3::ZERO, 12, 0.25, 0.05, 0.02, 0.0);
    for (i, p) in bp.positions.iter_mut().enumerate() {
        *p = Vec3::new(i as f32 * 0.25, 0.0, 0.0);
    }
    bp.pin(0);
    bp.pin(1);
    bp.bend_plasticity = Some(Plasticity {
        yield_threshold: 0.01,
        creep_rate: 1.0,
    });
    solver.add_actor(&bp).expect("rope fits capacity");
    solver
}
