//! # weft-bench
//!
//! Standard benchmark scenarios and the runner that executes them and
//! collects [`BenchmarkMetrics`]. Used by `weft benchmark` and by
//! performance regression checks.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::run;
pub use scenarios::Scenario;
