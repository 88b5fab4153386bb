//! Simulation event types.
//!
//! Structured events emitted by the solver at various points in each
//! step. Events are lightweight value types that carry just enough
//! data to be useful for monitoring and for gameplay-level listeners.

use serde::{Deserialize, Serialize};
use weft_types::{ActorId, ColliderId};

/// Lifecycle phase of a (collider, actor) contact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    /// Pair is in contact this step but was not in the previous step.
    Enter,
    /// Pair is in contact this step and was in the previous step.
    Stay,
    /// Pair was in contact in the previous step but is not any more.
    Exit,
}

/// A contact transition raised by the dispatcher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Transition phase.
    pub phase: ContactPhase,
    /// Actor owning the contacting particle.
    pub actor: ActorId,
    /// Collider involved.
    pub collider: ColliderId,
    /// Representative contact point (world space). Zero for `Exit`.
    pub point: [f32; 3],
    /// Representative contact normal. Zero for `Exit`.
    pub normal: [f32; 3],
}

/// An event emitted by the engine, tagged with the step it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    /// Step number (0-indexed).
    pub step: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// Fixed step started.
    StepBegin {
        /// Step size in seconds.
        dt: f32,
    },

    /// Fixed step completed.
    StepEnd {
        /// Wall-clock time for the entire step (seconds).
        wall_time: f64,
    },

    /// One substep of the constraint solve completed.
    SubstepEnd {
        /// Substep index within the step.
        substep: u32,
    },

    /// Collision detection completed for this step.
    ContactDetection {
        /// Number of contacts generated.
        contact_count: u32,
        /// Maximum penetration depth (meters).
        max_penetration: f32,
    },

    /// A contact pair changed phase.
    Contact(ContactEvent),
}
