//! # weft-debug
//!
//! Binary state snapshots for deterministic replay, diff-based
//! debugging, and the `weft inspect` CLI command.

pub mod snapshot;

pub use snapshot::StateSnapshot;
