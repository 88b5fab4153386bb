//! State snapshot serialization for replay and debugging.
//!
//! Snapshots capture the particle state at a point in time, enabling
//! deterministic replay checks and diff-based debugging.

use serde::{Deserialize, Serialize};

/// A complete particle-state snapshot.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Step index when this snapshot was taken.
    pub step: u32,
    /// Simulation time in seconds.
    pub sim_time: f64,
    /// Particle positions (flat: [x0, y0, z0, x1, y1, z1, ...]).
    pub positions: Vec<f32>,
    /// Particle velocities (flat: [vx0, vy0, vz0, ...]).
    pub velocities: Vec<f32>,
    /// Number of particles.
    pub particle_count: usize,
}

impl StateSnapshot {
    /// Creates a snapshot from interleaved position/velocity buffers.
    ///
    /// `positions` and `velocities` are 4-wide per particle (the solver
    /// packs radius into w); the snapshot keeps only xyz.
    pub fn from_packed(step: u32, sim_time: f64, positions: &[[f32; 4]], velocities: &[[f32; 4]]) -> Self {
        let n = positions.len();
        let mut pos = Vec::with_capacity(n * 3);
        let mut vel = Vec::with_capacity(n * 3);

        for p in positions {
            pos.extend_from_slice(&p[..3]);
        }
        for v in velocities {
            vel.extend_from_slice(&v[..3]);
        }

        Self {
            step,
            sim_time,
            positions: pos,
            velocities: vel,
            particle_count: n,
        }
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Snapshot serialization should not fail")
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        bincode::deserialize(data).map_err(|e| format!("Snapshot deserialization failed: {}", e))
    }

    /// Position of particle `i` as an xyz triple.
    pub fn position(&self, i: usize) -> [f32; 3] {
        [
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        ]
    }
}
