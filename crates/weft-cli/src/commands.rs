//! CLI command implementations.

use serde::Deserialize;
use tracing::info;
use weft_bench::{run, BenchmarkMetrics, Scenario};
use weft_debug::snapshot::StateSnapshot;
use weft_events::sinks::TracingSink;
use weft_solver::SolverConfig;

/// Simulation run description, loaded from TOML.
#[derive(Debug, Deserialize)]
struct SimulateConfig {
    /// Scenario to set up (hanging_chain, cloth_drape, plastic_hinge).
    scenario: String,
    /// Step count; defaults to the scenario's standard run.
    steps: Option<u32>,
    /// Timestep override in seconds.
    dt: Option<f32>,
    /// Where to write the final state snapshot, if anywhere.
    snapshot: Option<String>,
    /// Solver settings override.
    solver: Option<SolverConfig>,
}

/// Run a simulation from a config file.
pub fn simulate(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Simulation");
    println!("───────────────");
    println!("Config: {config_path}");
    println!();

    let content = std::fs::read_to_string(config_path)?;
    let config: SimulateConfig = toml::from_str(&content)?;

    let scenario = Scenario::by_name(&config.scenario).ok_or_else(|| {
        let names: Vec<&str> = Scenario::all().iter().map(|s| s.name).collect();
        format!(
            "Unknown scenario: '{}'. Available: {}",
            config.scenario,
            names.join(", ")
        )
    })?;

    let mut solver = scenario.build();
    solver.bus.add_sink(Box::new(TracingSink::new()));
    if let Some(solver_config) = config.solver {
        solver_config.validate()?;
        solver.config = solver_config;
    }

    let dt = config.dt.unwrap_or(scenario.dt);
    let steps = config.steps.unwrap_or(scenario.steps);
    println!("Scenario: {} ({})", scenario.name, scenario.description);
    println!("Steps:    {steps} at dt = {dt:.5}s");
    println!();

    for _ in 0..steps {
        solver.step(dt);
    }
    solver.bus.close();
    info!(steps, sim_time = solver.sim_time(), "simulation finished");

    println!("Done. Simulated {:.3}s of physics.", solver.sim_time());
    println!("Final contact count: {}", solver.contacts().len());

    if let Some(path) = config.snapshot {
        let snapshot = StateSnapshot::from_packed(
            solver.step_index(),
            solver.sim_time(),
            &solver.packed_positions(),
            &solver.packed_velocities(),
        );
        std::fs::write(&path, snapshot.to_bytes())?;
        println!("Snapshot written to: {path}");
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Benchmark Suite");
    println!("════════════════════");
    println!();

    let scenarios: Vec<Scenario> = if scenario_name == "all" {
        Scenario::all().to_vec()
    } else {
        let scenario = Scenario::by_name(scenario_name).ok_or_else(|| {
            let names: Vec<&str> = Scenario::all().iter().map(|s| s.name).collect();
            format!(
                "Unknown scenario: '{scenario_name}'. Available: {}, all",
                names.join(", ")
            )
        })?;
        vec![scenario]
    };

    let mut all_metrics = Vec::new();
    for scenario in &scenarios {
        println!("Running: {} ({} steps)", scenario.name, scenario.steps);

        let metrics = run(scenario);

        println!("  Wall time:     {:.3}ms", metrics.total_ms);
        println!("  Avg step:      {:.4}ms", metrics.mean_step_ms);
        println!("  Max step:      {:.4}ms", metrics.max_step_ms);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!("  Max contacts:  {}", metrics.max_contacts);
        println!();

        all_metrics.push(metrics);
    }

    let mut csv = String::from(BenchmarkMetrics::csv_header());
    for metrics in &all_metrics {
        csv.push('\n');
        csv.push_str(&metrics.to_csv_row());
    }

    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Inspect a state snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Snapshot Inspector");
    println!("───────────────────────");
    println!();

    let data = std::fs::read(path)?;
    let snapshot = StateSnapshot::from_bytes(&data)
        .map_err(|e| format!("Failed to read snapshot: {e}"))?;

    println!("Step:         {}", snapshot.step);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Particles:    {}", snapshot.particle_count);
    println!("Pos entries:  {}", snapshot.positions.len());
    println!("Vel entries:  {}", snapshot.velocities.len());

    if !snapshot.positions.is_empty() {
        let min_y = snapshot
            .positions
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 3 == 1)
            .map(|(_, v)| *v)
            .fold(f32::INFINITY, f32::min);
        let max_y = snapshot
            .positions
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 3 == 1)
            .map(|(_, v)| *v)
            .fold(f32::NEG_INFINITY, f32::max);
        println!("Y range:      [{min_y:.4}, {max_y:.4}]");
    }

    Ok(())
}

/// Validate a simulation config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Validator");
    println!("──────────────");
    println!();

    println!("Validating config: {path}");
    let content = std::fs::read_to_string(path)?;
    let config: SimulateConfig = toml::from_str(&content)?;

    if Scenario::by_name(&config.scenario).is_none() {
        let names: Vec<&str> = Scenario::all().iter().map(|s| s.name).collect();
        return Err(format!(
            "Unknown scenario: '{}'. Available: {}",
            config.scenario,
            names.join(", ")
        )
        .into());
    }
    if let Some(solver) = &config.solver {
        solver.validate()?;
    }
    if let Some(dt) = config.dt {
        if dt <= 0.0 {
            return Err("dt must be positive".into());
        }
    }

    println!("Config is valid.");
    Ok(())
}
