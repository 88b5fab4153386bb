//! Contact records produced by the collision backend.
//!
//! Contacts are transient: regenerated each step, compared against the
//! previous step's sorted set for event semantics, then discarded.

use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, ColliderId};

/// A detected contact between a particle and a collider.
///
/// Carries the geometric data needed by contact response (position
/// projection, friction) and by the event dispatcher (enter/stay/exit).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contact {
    /// Particle index (solver-global).
    pub particle: u32,

    /// Collider handle.
    pub collider: ColliderId,

    /// Actor owning the particle.
    pub actor: ActorId,

    /// Contact point on the collider surface (world space).
    pub point: [f32; 3],

    /// Contact normal (unit vector, points from collider toward particle).
    pub normal: [f32; 3],

    /// Signed distance from particle surface to collider surface
    /// (negative = penetration).
    pub distance: f32,

    /// Combined friction coefficient for this pair.
    pub friction: f32,

    /// Combined restitution coefficient for this pair.
    pub restitution: f32,

    /// Whether the collider is a trigger (events only, no response).
    pub is_trigger: bool,
}

impl Contact {
    /// Key used for sorting and event matching: (collider, actor).
    #[inline]
    pub fn event_key(&self) -> (u32, u32) {
        (self.collider.0, self.actor.0)
    }

    /// Returns the penetration depth (positive if penetrating, zero otherwise).
    #[inline]
    pub fn penetration_depth(&self) -> f32 {
        (-self.distance).max(0.0)
    }

    /// Returns true if the contact represents actual penetration.
    #[inline]
    pub fn is_penetrating(&self) -> bool {
        self.distance < 0.0
    }
}
