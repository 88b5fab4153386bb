//! Benchmark result collection.

/// Metrics from one scenario run.
#[derive(Debug, Clone)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    pub steps: u32,
    /// Total wall time, milliseconds.
    pub total_ms: f64,
    pub mean_step_ms: f64,
    pub max_step_ms: f64,
    /// Kinetic energy at the final step (joules).
    pub final_kinetic_energy: f32,
    /// Largest particle displacement from the initial state (meters).
    pub max_displacement: f32,
    /// Largest per-step contact count seen.
    pub max_contacts: usize,
}

impl BenchmarkMetrics {
    pub fn csv_header() -> &'static str {
        "scenario,steps,total_ms,mean_step_ms,max_step_ms,final_kinetic_energy,max_displacement,max_contacts"
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.3},{:.4},{:.4},{:.6},{:.4},{}",
            self.scenario,
            self.steps,
            self.total_ms,
            self.mean_step_ms,
            self.max_step_ms,
            self.final_kinetic_energy,
            self.max_displacement,
            self.max_contacts
        )
    }
}
