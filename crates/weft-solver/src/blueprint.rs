//! Actor blueprints: particle and constraint templates.
//!
//! A blueprint describes one actor in local particle indices. Adding
//! it to a [`Solver`](crate::Solver) allocates a particle range,
//! writes the initial state, and colors each constraint group into
//! conflict-free batches. Generators for the two most common
//! topologies, ropes and cloth grids, live here too.

use weft_math::{Quat, Vec3};
use weft_types::error::{WeftError, WeftResult};

use crate::batcher::ConstraintBatcher;
use crate::constraint::{
    AerodynamicBatch, BendBatch, BendTwistBatch, ConstraintBatch, DistanceBatch, Plasticity,
    ShapeMatchingBatch, SkinBatch, StretchShearBatch, TetherBatch, VolumeBatch,
};
use crate::particles::{ParticleRange, ParticleStore};

#[derive(Debug, Clone)]
pub struct DistanceSpec {
    pub particles: [u32; 2],
    pub rest_length: f32,
    pub compliance: f32,
}

#[derive(Debug, Clone)]
pub struct BendSpec {
    /// `[outer0, center, outer1]`.
    pub particles: [u32; 3],
    pub rest_bend: f32,
    pub compliance: f32,
}

#[derive(Debug, Clone)]
pub struct TetherSpec {
    /// `[dynamic, anchor]`.
    pub particles: [u32; 2],
    pub max_length: f32,
    pub scale: f32,
    pub compliance: f32,
}

#[derive(Debug, Clone)]
pub struct VolumeSpec {
    pub triangles: Vec<[u32; 3]>,
    pub rest_volume: f32,
    pub pressure: f32,
    pub compliance: f32,
}

#[derive(Debug, Clone)]
pub struct SkinSpec {
    pub particle: u32,
    pub point: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    pub backstop: f32,
    pub compliance: f32,
}

#[derive(Debug, Clone)]
pub struct AerodynamicSpec {
    pub particle: u32,
    pub normal: Vec3,
    pub area: f32,
    pub drag: f32,
    pub lift: f32,
}

#[derive(Debug, Clone)]
pub struct BendTwistSpec {
    /// Oriented particle pair `[q0, q1]`.
    pub particles: [u32; 2],
    pub rest_darboux: Vec3,
    pub compliance: Vec3,
}

#[derive(Debug, Clone)]
pub struct StretchShearSpec {
    pub particles: [u32; 2],
    /// Oriented particle carrying the frame, usually `particles[0]`.
    pub orientation: u32,
    pub rest_length: f32,
    pub compliance: Vec3,
}

#[derive(Debug, Clone)]
pub struct ShapeMatchingSpec {
    pub members: Vec<u32>,
    pub stiffness: f32,
}

/// An actor template in local particle indices.
#[derive(Debug, Clone, Default)]
pub struct ActorBlueprint {
    pub positions: Vec<Vec3>,
    /// Inverse masses; 0 pins a particle.
    pub inv_masses: Vec<f32>,
    pub radii: Vec<f32>,
    /// Frames for oriented particles; empty means all-identity.
    pub orientations: Vec<Quat>,
    /// Inverse rotational masses; empty means all-zero (locked).
    pub inv_rot_masses: Vec<f32>,

    pub distance: Vec<DistanceSpec>,
    pub bend: Vec<BendSpec>,
    pub tether: Vec<TetherSpec>,
    pub volume: Vec<VolumeSpec>,
    pub skin: Vec<SkinSpec>,
    pub aerodynamic: Vec<AerodynamicSpec>,
    pub bend_twist: Vec<BendTwistSpec>,
    pub stretch_shear: Vec<StretchShearSpec>,
    pub shape_matching: Vec<ShapeMatchingSpec>,

    pub distance_plasticity: Option<Plasticity>,
    pub bend_plasticity: Option<Plasticity>,
    pub shape_matching_plasticity: Option<Plasticity>,
}

impl ActorBlueprint {
    /// Number of particles.
    pub fn particle_count(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Pins particle `i` in place.
    pub fn pin(&mut self, i: usize) {
        self.inv_masses[i] = 0.0;
    }

    /// Checks internal consistency; every particle reference must fall
    /// inside the blueprint.
    pub fn validate(&self) -> WeftResult<()> {
        let n = self.particle_count();
        let check = |p: u32, what: &str| -> WeftResult<()> {
            if p >= n {
                return Err(WeftError::InvalidBlueprint(format!(
                    "{what} references particle {p}, but blueprint has {n}"
                )));
            }
            Ok(())
        };

        if self.inv_masses.len() != n as usize {
            return Err(WeftError::InvalidBlueprint(format!(
                "inv_masses has {} entries for {} particles",
                self.inv_masses.len(),
                n
            )));
        }
        if self.radii.len() != n as usize {
            return Err(WeftError::InvalidBlueprint(format!(
                "radii has {} entries for {} particles",
                self.radii.len(),
                n
            )));
        }
        if !self.orientations.is_empty() && self.orientations.len() != n as usize {
            return Err(WeftError::InvalidBlueprint("orientations length mismatch".into()));
        }
        if !self.inv_rot_masses.is_empty() && self.inv_rot_masses.len() != n as usize {
            return Err(WeftError::InvalidBlueprint("inv_rot_masses length mismatch".into()));
        }

        for s in &self.distance {
            check(s.particles[0], "distance")?;
            check(s.particles[1], "distance")?;
        }
        for s in &self.bend {
            for &p in &s.particles {
                check(p, "bend")?;
            }
        }
        for s in &self.tether {
            check(s.particles[0], "tether")?;
            check(s.particles[1], "tether")?;
        }
        for s in &self.volume {
            for t in &s.triangles {
                for &p in t {
                    check(p, "volume")?;
                }
            }
        }
        for s in &self.skin {
            check(s.particle, "skin")?;
        }
        for s in &self.aerodynamic {
            check(s.particle, "aerodynamic")?;
        }
        for s in &self.bend_twist {
            check(s.particles[0], "bend_twist")?;
            check(s.particles[1], "bend_twist")?;
        }
        for s in &self.stretch_shear {
            check(s.particles[0], "stretch_shear")?;
            check(s.particles[1], "stretch_shear")?;
            check(s.orientation, "stretch_shear")?;
        }
        for s in &self.shape_matching {
            for &p in &s.members {
                check(p, "shape_matching")?;
            }
        }
        Ok(())
    }

    /// Writes the initial particle state into an allocated range.
    pub(crate) fn write_particles(&self, store: &mut ParticleStore, range: ParticleRange) {
        for (local, global) in range.iter().enumerate() {
            store.set_position(global, self.positions[local]);
            store.set_radius(global, self.radii[local]);
            store.prev_positions[global] = store.positions[global];
            store.inv_masses[global] = self.inv_masses[local];
            if !self.orientations.is_empty() {
                store.orientations[global] = self.orientations[local];
                store.prev_orientations[global] = self.orientations[local];
            }
            if !self.inv_rot_masses.is_empty() {
                store.inv_rot_masses[global] = self.inv_rot_masses[local];
            }
        }
    }

    /// Colors every constraint group and builds the actor's batches,
    /// shifting local indices by the range start.
    pub(crate) fn build_batches(&self, offset: u32, store: &ParticleStore) -> Vec<ConstraintBatch> {
        let mut batches = Vec::new();

        for group in color_groups(self.distance.iter().map(|s| s.particles.to_vec())) {
            let mut particles = Vec::with_capacity(group.len());
            let mut rests = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = &self.distance[i as usize];
                particles.push([s.particles[0] + offset, s.particles[1] + offset]);
                rests.push(s.rest_length);
                compliances.push(s.compliance);
            }
            let mut batch = DistanceBatch::new();
            batch.set_constraints(&particles, &rests, &compliances);
            batch.set_plasticity(self.distance_plasticity);
            batches.push(ConstraintBatch::Distance(batch));
        }

        for group in color_groups(self.bend.iter().map(|s| s.particles.to_vec())) {
            let mut particles = Vec::with_capacity(group.len());
            let mut rests = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = &self.bend[i as usize];
                particles.push([
                    s.particles[0] + offset,
                    s.particles[1] + offset,
                    s.particles[2] + offset,
                ]);
                rests.push(s.rest_bend);
                compliances.push(s.compliance);
            }
            let mut batch = BendBatch::new();
            batch.set_constraints(&particles, &rests, &compliances);
            batch.set_plasticity(self.bend_plasticity);
            batches.push(ConstraintBatch::Bend(batch));
        }

        for group in color_groups(self.tether.iter().map(|s| s.particles.to_vec())) {
            let mut particles = Vec::with_capacity(group.len());
            let mut maxes = Vec::with_capacity(group.len());
            let mut scales = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = &self.tether[i as usize];
                particles.push([s.particles[0] + offset, s.particles[1] + offset]);
                maxes.push(s.max_length);
                scales.push(s.scale);
                compliances.push(s.compliance);
            }
            let mut batch = TetherBatch::new();
            batch.set_constraints(&particles, &maxes, &scales, &compliances);
            batches.push(ConstraintBatch::Tether(batch));
        }

        for group in color_groups(
            self.volume
                .iter()
                .map(|s| s.triangles.iter().flatten().copied().collect::<Vec<_>>()),
        ) {
            let mut batch = VolumeBatch::new();
            for &i in &group {
                let s = &self.volume[i as usize];
                let triangles: Vec<[u32; 3]> = s
                    .triangles
                    .iter()
                    .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset])
                    .collect();
                batch.push_constraint(&triangles, s.rest_volume, s.pressure, s.compliance);
            }
            batches.push(ConstraintBatch::Volume(batch));
        }

        // Skin and aerodynamic constraints are one per particle; no
        // conflicts, so a single batch each.
        if !self.skin.is_empty() {
            let particles: Vec<u32> = self.skin.iter().map(|s| s.particle + offset).collect();
            let points: Vec<Vec3> = self.skin.iter().map(|s| s.point).collect();
            let normals: Vec<Vec3> = self.skin.iter().map(|s| s.normal).collect();
            let radii: Vec<f32> = self.skin.iter().map(|s| s.radius).collect();
            let backstops: Vec<f32> = self.skin.iter().map(|s| s.backstop).collect();
            let compliances: Vec<f32> = self.skin.iter().map(|s| s.compliance).collect();
            let mut batch = SkinBatch::new();
            batch.set_constraints(&particles, &points, &normals, &radii, &backstops, &compliances);
            batches.push(ConstraintBatch::Skin(batch));
        }

        if !self.aerodynamic.is_empty() {
            let particles: Vec<u32> = self.aerodynamic.iter().map(|s| s.particle + offset).collect();
            let normals: Vec<Vec3> = self.aerodynamic.iter().map(|s| s.normal).collect();
            let areas: Vec<f32> = self.aerodynamic.iter().map(|s| s.area).collect();
            let drags: Vec<f32> = self.aerodynamic.iter().map(|s| s.drag).collect();
            let lifts: Vec<f32> = self.aerodynamic.iter().map(|s| s.lift).collect();
            let mut batch = AerodynamicBatch::new();
            batch.set_constraints(&particles, &normals, &areas, &drags, &lifts);
            batches.push(ConstraintBatch::Aerodynamic(batch));
        }

        for group in color_groups(self.bend_twist.iter().map(|s| s.particles.to_vec())) {
            let mut particles = Vec::with_capacity(group.len());
            let mut rests = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = &self.bend_twist[i as usize];
                particles.push([s.particles[0] + offset, s.particles[1] + offset]);
                rests.push(s.rest_darboux);
                compliances.push(s.compliance);
            }
            let mut batch = BendTwistBatch::new();
            batch.set_constraints(&particles, &rests, &compliances);
            batches.push(ConstraintBatch::BendTwist(batch));
        }

        for group in color_groups(
            self.stretch_shear
                .iter()
                .map(|s| vec![s.particles[0], s.particles[1], s.orientation]),
        ) {
            let mut particles = Vec::with_capacity(group.len());
            let mut orientations = Vec::with_capacity(group.len());
            let mut rests = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = &self.stretch_shear[i as usize];
                particles.push([s.particles[0] + offset, s.particles[1] + offset]);
                orientations.push(s.orientation + offset);
                rests.push(s.rest_length);
                compliances.push(s.compliance);
            }
            let mut batch = StretchShearBatch::new();
            batch.set_constraints(&particles, &orientations, &rests, &compliances);
            batches.push(ConstraintBatch::StretchShear(batch));
        }

        for group in color_groups(self.shape_matching.iter().map(|s| s.members.clone())) {
            let mut batch = ShapeMatchingBatch::new();
            for &i in &group {
                let s = &self.shape_matching[i as usize];
                let members: Vec<u32> = s.members.iter().map(|&p| p + offset).collect();
                batch.push_cluster(&members, s.stiffness, store);
            }
            batch.set_plasticity(self.shape_matching_plasticity);
            batches.push(ConstraintBatch::ShapeMatching(batch));
        }

        batches
    }
}

/// Colors one constraint group; returns constraint indices per color.
fn color_groups(constraints: impl Iterator<Item = Vec<u32>>) -> Vec<Vec<u32>> {
    let mut batcher = ConstraintBatcher::new();
    for particles in constraints {
        batcher.add_constraint(&particles);
    }
    batcher.partition()
}

// ─── Generators ───

/// A straight rope hanging along `-Y` from `origin`: `count` particles
/// spaced `spacing` apart, distance constraints between neighbors, and
/// zero-rest bend constraints over every interior triple.
pub fn rope(origin: Vec3, count: u32, spacing: f32, mass: f32, radius: f32, compliance: f32) -> ActorBlueprint {
    let mut bp = ActorBlueprint {
        positions: (0..count)
            .map(|i| origin - Vec3::Y * (i as f32 * spacing))
            .collect(),
        inv_masses: vec![1.0 / mass; count as usize],
        radii: vec![radius; count as usize],
        ..ActorBlueprint::default()
    };
    for i in 0..count.saturating_sub(1) {
        bp.distance.push(DistanceSpec {
            particles: [i, i + 1],
            rest_length: spacing,
            compliance,
        });
    }
    for i in 0..count.saturating_sub(2) {
        bp.bend.push(BendSpec {
            particles: [i, i + 1, i + 2],
            rest_bend: 0.0,
            compliance,
        });
    }
    bp
}

/// A cloth grid in the XZ plane: structural edges along rows and
/// columns, shear diagonals, and bend constraints over row and column
/// triples. Particle `(col, row)` sits at index `row * cols + col`.
pub fn cloth_grid(
    origin: Vec3,
    cols: u32,
    rows: u32,
    spacing: f32,
    mass: f32,
    radius: f32,
    compliance: f32,
) -> ActorBlueprint {
    let index = |c: u32, r: u32| r * cols + c;
    let count = (cols * rows) as usize;
    let mut bp = ActorBlueprint {
        positions: (0..rows)
            .flat_map(|r| {
                (0..cols).map(move |c| origin + Vec3::new(c as f32 * spacing, 0.0, r as f32 * spacing))
            })
            .collect(),
        inv_masses: vec![1.0 / mass; count],
        radii: vec![radius; count],
        ..ActorBlueprint::default()
    };

    let diagonal = spacing * std::f32::consts::SQRT_2;
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                bp.distance.push(DistanceSpec {
                    particles: [index(c, r), index(c + 1, r)],
                    rest_length: spacing,
                    compliance,
                });
            }
            if r + 1 < rows {
                bp.distance.push(DistanceSpec {
                    particles: [index(c, r), index(c, r + 1)],
                    rest_length: spacing,
                    compliance,
                });
            }
            if c + 1 < cols && r + 1 < rows {
                bp.distance.push(DistanceSpec {
                    particles: [index(c, r), index(c + 1, r + 1)],
                    rest_length: diagonal,
                    compliance,
                });
                bp.distance.push(DistanceSpec {
                    particles: [index(c + 1, r), index(c, r + 1)],
                    rest_length: diagonal,
                    compliance,
                });
            }
            if c + 2 < cols {
                bp.bend.push(BendSpec {
                    particles: [index(c, r), index(c + 1, r), index(c + 2, r)],
                    rest_bend: 0.0,
                    compliance,
                });
            }
            if r + 2 < rows {
                bp.bend.push(BendSpec {
                    particles: [index(c, r), index(c, r + 1), index(c, r + 2)],
                    rest_bend: 0.0,
                    compliance,
                });
            }
        }
    }
    bp
}
