//! Error types for the Weft engine.
//!
//! All crates return `WeftResult<T>` from fallible operations.
//!
//! Precondition violations (mismatched parallel-array lengths,
//! out-of-range particle indices) are *not* represented here: they are
//! programmer errors and fail fast via `debug_assert!`/panic, since a
//! corrupt constraint topology cannot be safely simulated.

use thiserror::Error;

/// Unified error type for the Weft engine.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Particle allocation beyond the store's capacity.
    ///
    /// Cannot be silently dropped — a failed actor add would otherwise
    /// cause undetected simulation divergence. Callers must resize the
    /// store between steps and retry.
    #[error("Particle capacity exceeded: requested {requested}, largest free block {available}")]
    CapacityExceeded { requested: u32, available: u32 },

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Actor blueprint is malformed (empty, inconsistent counts).
    #[error("Invalid blueprint: {0}")]
    InvalidBlueprint(String),

    /// Distance-field construction was cancelled by the progress callback.
    #[error("Distance field build cancelled")]
    BuildCancelled,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, WeftError>`.
pub type WeftResult<T> = Result<T, WeftError>;
