//! Structure-of-arrays particle storage.
//!
//! The store owns every per-particle buffer in the solver. Positions
//! pack the particle radius into `w`, so one `Vec4` load gives both.
//! Actors claim contiguous [`ParticleRange`]s from a first-fit free
//! list; freed ranges coalesce with their neighbors so long-running
//! scenes with actor churn do not fragment.
//!
//! Constraint corrections are not written to positions directly.
//! They accumulate into delta buffers together with a contribution
//! count, and [`ParticleStore::apply_delta`] folds the averaged
//! correction in. Averaging keeps overlapping corrections stable when
//! batches are evaluated jointly.

use weft_math::{Quat, Vec3, Vec4};
use weft_types::error::{WeftError, WeftResult};

/// A contiguous span of particle slots owned by one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleRange {
    /// First slot index.
    pub start: u32,
    /// Number of slots.
    pub count: u32,
}

impl ParticleRange {
    /// One-past-the-end slot index.
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    /// Iterates the slot indices in this range.
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end() as usize
    }

    /// Whether `index` falls inside this range.
    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index < self.end()
    }
}

/// SoA particle buffers plus the range allocator.
#[derive(Debug)]
pub struct ParticleStore {
    /// Position xyz, radius in w.
    pub positions: Vec<Vec4>,
    /// Position at the start of the current substep.
    pub prev_positions: Vec<Vec4>,
    /// Linear velocity xyz; w unused.
    pub velocities: Vec<Vec4>,
    /// Angular velocity xyz; w unused. Only meaningful for oriented particles.
    pub angular_velocities: Vec<Vec4>,
    /// Inverse mass; 0 pins the particle.
    pub inv_masses: Vec<f32>,
    /// Particle frame; identity for unoriented particles.
    pub orientations: Vec<Quat>,
    /// Orientation at the start of the current substep.
    pub prev_orientations: Vec<Quat>,
    /// Inverse rotational mass; 0 locks the frame.
    pub inv_rot_masses: Vec<f32>,

    deltas: Vec<Vec4>,
    delta_counts: Vec<f32>,
    orientation_deltas: Vec<Vec4>,
    orientation_delta_counts: Vec<f32>,

    // Free ranges sorted by start, pairwise non-adjacent.
    free: Vec<ParticleRange>,
}

impl ParticleStore {
    /// Creates a store with `capacity` particle slots, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![Vec4::ZERO; capacity],
            prev_positions: vec![Vec4::ZERO; capacity],
            velocities: vec![Vec4::ZERO; capacity],
            angular_velocities: vec![Vec4::ZERO; capacity],
            inv_masses: vec![0.0; capacity],
            orientations: vec![Quat::IDENTITY; capacity],
            prev_orientations: vec![Quat::IDENTITY; capacity],
            inv_rot_masses: vec![0.0; capacity],
            deltas: vec![Vec4::ZERO; capacity],
            delta_counts: vec![0.0; capacity],
            orientation_deltas: vec![Vec4::ZERO; capacity],
            orientation_delta_counts: vec![0.0; capacity],
            free: if capacity == 0 {
                Vec::new()
            } else {
                vec![ParticleRange {
                    start: 0,
                    count: capacity as u32,
                }]
            },
        }
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of slots currently handed out to actors.
    pub fn allocated(&self) -> usize {
        self.capacity() - self.free.iter().map(|r| r.count as usize).sum::<usize>()
    }

    /// Size of the largest contiguous free block.
    pub fn largest_free_block(&self) -> u32 {
        self.free.iter().map(|r| r.count).max().unwrap_or(0)
    }

    /// Claims a contiguous range of `count` slots, first fit.
    ///
    /// Claimed slots are reset to a neutral state (zero velocity,
    /// identity orientation, pinned) so stale data from a freed actor
    /// cannot leak through.
    pub fn allocate(&mut self, count: u32) -> WeftResult<ParticleRange> {
        if count == 0 {
            return Ok(ParticleRange { start: 0, count: 0 });
        }
        let slot = self
            .free
            .iter()
            .position(|r| r.count >= count)
            .ok_or(WeftError::CapacityExceeded {
                requested: count,
                available: self.largest_free_block(),
            })?;

        let range = ParticleRange {
            start: self.free[slot].start,
            count,
        };
        if self.free[slot].count == count {
            self.free.remove(slot);
        } else {
            self.free[slot].start += count;
            self.free[slot].count -= count;
        }

        for i in range.iter() {
            self.positions[i] = Vec4::ZERO;
            self.prev_positions[i] = Vec4::ZERO;
            self.velocities[i] = Vec4::ZERO;
            self.angular_velocities[i] = Vec4::ZERO;
            self.inv_masses[i] = 0.0;
            self.orientations[i] = Quat::IDENTITY;
            self.prev_orientations[i] = Quat::IDENTITY;
            self.inv_rot_masses[i] = 0.0;
            self.deltas[i] = Vec4::ZERO;
            self.delta_counts[i] = 0.0;
            self.orientation_deltas[i] = Vec4::ZERO;
            self.orientation_delta_counts[i] = 0.0;
        }
        Ok(range)
    }

    /// Returns a range to the free list, coalescing with adjacent
    /// free ranges.
    pub fn free(&mut self, range: ParticleRange) {
        if range.count == 0 {
            return;
        }
        debug_assert!(range.end() as usize <= self.capacity());

        let pos = self
            .free
            .iter()
            .position(|r| r.start > range.start)
            .unwrap_or(self.free.len());
        self.free.insert(pos, range);

        // Merge with the right neighbor, then the left.
        if pos + 1 < self.free.len() && self.free[pos].end() == self.free[pos + 1].start {
            self.free[pos].count += self.free[pos + 1].count;
            self.free.remove(pos + 1);
        }
        if pos > 0 && self.free[pos - 1].end() == self.free[pos].start {
            self.free[pos - 1].count += self.free[pos].count;
            self.free.remove(pos);
        }
    }

    /// Grows the store to `new_capacity` slots. Shrinking is not
    /// supported; a smaller value is a no-op.
    ///
    /// Must only be called between steps; the solver enforces this.
    pub fn resize(&mut self, new_capacity: usize) {
        let old = self.capacity();
        if new_capacity <= old {
            return;
        }
        self.positions.resize(new_capacity, Vec4::ZERO);
        self.prev_positions.resize(new_capacity, Vec4::ZERO);
        self.velocities.resize(new_capacity, Vec4::ZERO);
        self.angular_velocities.resize(new_capacity, Vec4::ZERO);
        self.inv_masses.resize(new_capacity, 0.0);
        self.orientations.resize(new_capacity, Quat::IDENTITY);
        self.prev_orientations.resize(new_capacity, Quat::IDENTITY);
        self.inv_rot_masses.resize(new_capacity, 0.0);
        self.deltas.resize(new_capacity, Vec4::ZERO);
        self.delta_counts.resize(new_capacity, 0.0);
        self.orientation_deltas.resize(new_capacity, Vec4::ZERO);
        self.orientation_delta_counts.resize(new_capacity, 0.0);

        self.free(ParticleRange {
            start: old as u32,
            count: (new_capacity - old) as u32,
        });
    }

    // ─── Per-particle accessors ───

    /// Position xyz of slot `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        self.positions[i].truncate()
    }

    /// Sets position xyz, preserving the packed radius.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        let r = self.positions[i].w;
        self.positions[i] = p.extend(r);
    }

    /// Particle radius (packed in position w).
    #[inline]
    pub fn radius(&self, i: usize) -> f32 {
        self.positions[i].w
    }

    /// Sets the packed particle radius.
    #[inline]
    pub fn set_radius(&mut self, i: usize, r: f32) {
        self.positions[i].w = r;
    }

    /// Linear velocity xyz of slot `i`.
    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        self.velocities[i].truncate()
    }

    /// Sets linear velocity xyz.
    #[inline]
    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        self.velocities[i] = v.extend(0.0);
    }

    // ─── Correction accumulation ───

    /// Adds a position correction for slot `i`.
    #[inline]
    pub fn accumulate_delta(&mut self, i: usize, correction: Vec3) {
        self.deltas[i] += correction.extend(0.0);
        self.delta_counts[i] += 1.0;
    }

    /// Adds an orientation correction (raw quaternion components).
    #[inline]
    pub fn accumulate_orientation_delta(&mut self, i: usize, correction: Vec4) {
        self.orientation_deltas[i] += correction;
        self.orientation_delta_counts[i] += 1.0;
    }

    /// Folds the averaged position correction into slot `i`, scaled by
    /// the SOR factor, then clears the accumulator. No-op when nothing
    /// accumulated, so visiting a particle twice is harmless.
    #[inline]
    pub fn apply_delta(&mut self, i: usize, sor: f32) {
        let count = self.delta_counts[i];
        if count > 0.0 {
            let d = self.deltas[i].truncate() * (sor / count);
            let p = self.position(i) + d;
            self.set_position(i, p);
            self.deltas[i] = Vec4::ZERO;
            self.delta_counts[i] = 0.0;
        }
    }

    /// Folds the averaged orientation correction into slot `i` and
    /// renormalizes the quaternion.
    #[inline]
    pub fn apply_orientation_delta(&mut self, i: usize, sor: f32) {
        let count = self.orientation_delta_counts[i];
        if count > 0.0 {
            let d = self.orientation_deltas[i] * (sor / count);
            let q = self.orientations[i];
            let blended = Vec4::new(q.x + d.x, q.y + d.y, q.z + d.z, q.w + d.w);
            if blended.length_squared() > 0.0 {
                self.orientations[i] = Quat::from_vec4(blended).normalize();
            }
            self.orientation_deltas[i] = Vec4::ZERO;
            self.orientation_delta_counts[i] = 0.0;
        }
    }

    /// Clears every accumulator. Called at the start of each substep.
    pub fn reset_deltas(&mut self) {
        self.deltas.fill(Vec4::ZERO);
        self.delta_counts.fill(0.0);
        self.orientation_deltas.fill(Vec4::ZERO);
        self.orientation_delta_counts.fill(0.0);
    }
}
