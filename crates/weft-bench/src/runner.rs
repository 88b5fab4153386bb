//! Scenario execution and measurement.

use std::time::Instant;

use tracing::info;
use weft_math::Vec3;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::Scenario;

/// Runs a scenario for its standard step count and collects metrics.
pub fn run(scenario: &Scenario) -> BenchmarkMetrics {
    run_steps(scenario, scenario.steps)
}

/// Runs a scenario for a custom number of steps.
pub fn run_steps(scenario: &Scenario, steps: u32) -> BenchmarkMetrics {
    let mut solver = scenario.build();
    let initial: Vec<Vec3> = (0..solver.store.capacity()).map(|i| solver.store.position(i)).collect();

    let mut max_step_ms: f64 = 0.0;
    let mut max_contacts = 0usize;
    let total_start = Instant::now();

    for _ in 0..steps {
        let step_start = Instant::now();
        solver.step(scenario.dt);
        let elapsed = step_start.elapsed().as_secs_f64() * 1000.0;
        max_step_ms = max_step_ms.max(elapsed);
        max_contacts = max_contacts.max(solver.contacts().len());
    }
    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;

    let mut kinetic = 0.0f32;
    let mut max_displacement = 0.0f32;
    for i in 0..solver.store.capacity() {
        let w = solver.store.inv_masses[i];
        if w > 0.0 {
            kinetic += 0.5 * solver.store.velocity(i).length_squared() / w;
        }
        max_displacement = max_displacement.max((solver.store.position(i) - initial[i]).length());
    }

    let metrics = BenchmarkMetrics {
        scenario: scenario.name.to_string(),
        steps,
        total_ms,
        mean_step_ms: total_ms / f64::from(steps.max(1)),
        max_step_ms,
        final_kinetic_energy: kinetic,
        max_displacement,
        max_contacts,
    };
    info!(
        scenario = scenario.name,
        steps,
        mean_step_ms = metrics.mean_step_ms,
        "benchmark complete"
    );
    metrics
}
