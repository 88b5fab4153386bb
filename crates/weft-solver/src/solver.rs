//! The step orchestrator.
//!
//! `Solver` owns the particle store, the actors and their constraint
//! batches, and drives the XPBD loop:
//!
//! 1. `begin_step`: capture interpolation state, update colliders,
//!    run collision detection once for the step
//! 2. per substep: integrate, reset multipliers, solve constraint
//!    batches in type order, resolve contacts, rebuild velocities
//! 3. `end_step`: diff contacts into enter/stay/exit events, flush the
//!    event bus, run the post-step callback
//!
//! Collision detection lives behind the [`CollisionBackend`] trait so
//! the solver crate carries no collision dependency; `weft-collision`
//! provides the standard implementation.

use std::time::Instant;

use weft_events::{ContactDispatcher, ContactEvent, EventBus, EventKind, SimEvent};
use weft_math::{integrate_angular_velocity, Quat, Vec3};
use weft_types::error::WeftResult;
use weft_types::{ActorId, ColliderId, Contact};

use crate::blueprint::ActorBlueprint;
use crate::config::{ExecutionMode, SolverConfig};
use crate::constraint::{ConstraintBatch, ConstraintKind, StitchBatch, SubstepContext};
use crate::interpolation::InterpolationBuffers;
use crate::particles::{ParticleRange, ParticleStore};

/// Sentinel in the particle-to-actor map for unowned slots.
const NO_ACTOR: u32 = u32::MAX;

/// Collision detection as seen by the solver.
///
/// `update` advances collider transforms to the current step;
/// `generate_contacts` appends candidate contacts for the step,
/// including speculative (not yet penetrating) ones admitted by the
/// backend's continuous-collision test.
pub trait CollisionBackend: Send {
    fn update(&mut self, dt: f32);

    fn generate_contacts(
        &mut self,
        store: &ParticleStore,
        particle_actors: &[u32],
        dt: f32,
        out: &mut Vec<Contact>,
    );
}

/// A stitch request in solver-global particle indices.
#[derive(Debug, Clone, Copy)]
pub struct StitchSpec {
    pub particles: [u32; 2],
    pub rest_length: f32,
    pub compliance: f32,
}

/// One simulated object: a particle range plus its constraint batches.
pub struct Actor {
    pub id: ActorId,
    pub range: ParticleRange,
    batches: Vec<ConstraintBatch>,
}

impl Actor {
    pub fn batches(&self) -> &[ConstraintBatch] {
        &self.batches
    }

    /// Mutable batch access, for per-frame skin and normal updates.
    pub fn batches_mut(&mut self) -> &mut [ConstraintBatch] {
        &mut self.batches
    }
}

/// Called after each step with every live actor and the settled state.
pub type PostStepFn = Box<dyn FnMut(ActorId, ParticleRange, &ParticleStore) + Send>;

pub struct Solver {
    pub store: ParticleStore,
    pub config: SolverConfig,
    pub bus: EventBus,

    actors: Vec<Option<Actor>>,
    /// Actor id per particle slot, `NO_ACTOR` for free slots.
    particle_actors: Vec<u32>,
    stitches: Vec<ConstraintBatch>,

    collision: Option<Box<dyn CollisionBackend>>,
    contacts: Vec<Contact>,
    contact_pre_vn: Vec<f32>,
    dispatcher: ContactDispatcher,
    contact_events: Vec<ContactEvent>,
    rigid_impulses: Vec<(ColliderId, Vec3)>,

    interpolation: InterpolationBuffers,
    post_step: Option<PostStepFn>,

    step_index: u32,
    sim_time: f64,
}

impl Solver {
    pub fn new(capacity: usize, config: SolverConfig) -> Self {
        Self {
            store: ParticleStore::new(capacity),
            config,
            bus: EventBus::new(),
            actors: Vec::new(),
            particle_actors: vec![NO_ACTOR; capacity],
            stitches: Vec::new(),
            collision: None,
            contacts: Vec::new(),
            contact_pre_vn: Vec::new(),
            dispatcher: ContactDispatcher::new(),
            contact_events: Vec::new(),
            rigid_impulses: Vec::new(),
            interpolation: InterpolationBuffers::new(),
            post_step: None,
            step_index: 0,
            sim_time: 0.0,
        }
    }

    // ─── Structure (between steps only) ───

    /// Installs the collision backend. Replacing it clears contact
    /// history, so every touching pair re-enters on the next step.
    pub fn set_collision_backend(&mut self, backend: Box<dyn CollisionBackend>) {
        self.collision = Some(backend);
        self.dispatcher.clear();
    }

    pub fn set_post_step(&mut self, callback: Option<PostStepFn>) {
        self.post_step = callback;
    }

    /// Grows particle capacity.
    pub fn resize(&mut self, new_capacity: usize) {
        self.store.resize(new_capacity);
        self.particle_actors.resize(self.store.capacity(), NO_ACTOR);
    }

    /// Validates the blueprint, claims a particle range, and builds
    /// the actor's colored constraint batches.
    pub fn add_actor(&mut self, blueprint: &ActorBlueprint) -> WeftResult<ActorId> {
        blueprint.validate()?;
        let range = self.store.allocate(blueprint.particle_count())?;
        blueprint.write_particles(&mut self.store, range);

        let slot = self.actors.iter().position(Option::is_none).unwrap_or_else(|| {
            self.actors.push(None);
            self.actors.len() - 1
        });
        let id = ActorId(slot as u32);

        for i in range.iter() {
            self.particle_actors[i] = id.0;
        }
        self.actors[slot] = Some(Actor {
            id,
            range,
            batches: blueprint.build_batches(range.start, &self.store),
        });
        Ok(id)
    }

    /// Frees the actor's particles and drops its batches. Stitches
    /// referencing the actor's particles are the caller's to remove.
    pub fn remove_actor(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(id.index()).and_then(Option::take) {
            for i in actor.range.iter() {
                self.particle_actors[i] = NO_ACTOR;
                self.store.inv_masses[i] = 0.0;
            }
            self.store.free(actor.range);
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.index()).and_then(Option::as_ref)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.iter().flatten().count()
    }

    /// Replaces all cross-actor stitches, coloring them into
    /// conflict-free batches.
    pub fn set_stitches(&mut self, specs: &[StitchSpec]) {
        self.stitches.clear();
        let mut batcher = crate::batcher::ConstraintBatcher::new();
        for s in specs {
            batcher.add_constraint(&s.particles);
        }
        for group in batcher.partition() {
            let mut particles = Vec::with_capacity(group.len());
            let mut rests = Vec::with_capacity(group.len());
            let mut compliances = Vec::with_capacity(group.len());
            for &i in &group {
                let s = specs[i as usize];
                particles.push(s.particles);
                rests.push(s.rest_length);
                compliances.push(s.compliance);
            }
            let mut batch = StitchBatch::new();
            batch.set_constraints(&particles, &rests, &compliances);
            self.stitches.push(ConstraintBatch::Stitch(batch));
        }
    }

    // ─── Stepping ───

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let started = Instant::now();
        self.bus.emit(SimEvent {
            step: self.step_index,
            kind: EventKind::StepBegin { dt },
        });

        self.begin_step(dt);

        let substeps = self.config.substeps.max(1);
        let sub_dt = dt / substeps as f32;
        for s in 0..substeps {
            self.substep(dt, sub_dt);
            self.bus.emit(SimEvent {
                step: self.step_index,
                kind: EventKind::SubstepEnd { substep: s },
            });
        }

        self.end_step(started, dt);
    }

    fn begin_step(&mut self, dt: f32) {
        self.interpolation.capture(&self.store);
        self.rigid_impulses.clear();
        self.contacts.clear();

        if let Some(backend) = self.collision.as_mut() {
            backend.update(dt);
            backend.generate_contacts(&self.store, &self.particle_actors, dt, &mut self.contacts);

            let max_penetration = self
                .contacts
                .iter()
                .map(Contact::penetration_depth)
                .fold(0.0f32, f32::max);
            self.bus.emit(SimEvent {
                step: self.step_index,
                kind: EventKind::ContactDetection {
                    contact_count: self.contacts.len() as u32,
                    max_penetration,
                },
            });
        }
    }

    fn substep(&mut self, step_dt: f32, dt: f32) {
        let ctx = SubstepContext {
            step_dt,
            dt,
            wind: Vec3::from(self.config.wind),
        };

        self.integrate(dt);
        self.store.reset_deltas();
        for batch in self.all_batches_mut() {
            batch.reset_lambdas();
        }

        for _ in 0..self.config.iterations.max(1) {
            self.solve_constraints(&ctx);
            self.solve_contact_positions(dt);
        }

        self.capture_contact_velocities();
        self.update_velocities(dt);
        self.apply_contact_restitution();
    }

    fn end_step(&mut self, started: Instant, dt: f32) {
        self.contact_events.clear();
        self.dispatcher.update(&self.contacts, &mut self.contact_events);
        for event in &self.contact_events {
            self.bus.emit(SimEvent {
                step: self.step_index,
                kind: EventKind::Contact(*event),
            });
        }

        self.bus.emit(SimEvent {
            step: self.step_index,
            kind: EventKind::StepEnd {
                wall_time: started.elapsed().as_secs_f64(),
            },
        });
        self.bus.flush();

        if let Some(callback) = self.post_step.as_mut() {
            for actor in self.actors.iter().flatten() {
                callback(actor.id, actor.range, &self.store);
            }
        }

        self.step_index += 1;
        self.sim_time += f64::from(dt);
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = Vec3::from(self.config.gravity);
        let damping = (1.0 - self.config.damping * dt).max(0.0);
        let max_velocity = self.config.max_velocity;
        let store = &mut self.store;

        store.prev_positions.copy_from_slice(&store.positions);
        store.prev_orientations.copy_from_slice(&store.orientations);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            store
                .positions
                .par_iter_mut()
                .zip(store.velocities.par_iter_mut())
                .zip(store.inv_masses.par_iter())
                .for_each(|((p, v), &w)| {
                    if w > 0.0 {
                        let mut vel = v.truncate() + gravity * dt;
                        vel *= damping;
                        let speed = vel.length();
                        if speed > max_velocity {
                            vel *= max_velocity / speed;
                        }
                        *v = vel.extend(0.0);
                        let radius = p.w;
                        *p = (p.truncate() + vel * dt).extend(radius);
                    }
                });
            store
                .orientations
                .par_iter_mut()
                .zip(store.angular_velocities.par_iter())
                .zip(store.inv_rot_masses.par_iter())
                .for_each(|((q, omega), &wr)| {
                    if wr > 0.0 {
                        *q = integrate_angular_velocity(*q, omega.truncate(), dt);
                    }
                });
        }

        #[cfg(not(feature = "parallel"))]
        for i in 0..store.capacity() {
            if store.inv_masses[i] > 0.0 {
                let mut vel = store.velocity(i) + gravity * dt;
                vel *= damping;
                let speed = vel.length();
                if speed > max_velocity {
                    vel *= max_velocity / speed;
                }
                store.set_velocity(i, vel);
                let p = store.position(i) + vel * dt;
                store.set_position(i, p);
            }
            if store.inv_rot_masses[i] > 0.0 {
                let omega = store.angular_velocities[i].truncate();
                store.orientations[i] = integrate_angular_velocity(store.orientations[i], omega, dt);
            }
        }
    }

    fn solve_constraints(&mut self, ctx: &SubstepContext) {
        let mode = self.config.mode;
        let sor = self.config.sor_factor;
        let store = &mut self.store;
        let actors = &mut self.actors;
        let stitches = &mut self.stitches;

        for kind in ConstraintKind::EVALUATION_ORDER {
            match mode {
                ExecutionMode::Sequential => {
                    for batch in batches_of_kind(actors, stitches, kind) {
                        batch.evaluate(store, ctx);
                        batch.apply(store, sor);
                    }
                }
                ExecutionMode::Parallel => {
                    for batch in batches_of_kind(actors, stitches, kind) {
                        batch.evaluate(store, ctx);
                    }
                    for batch in batches_of_kind(actors, stitches, kind) {
                        batch.apply(store, sor);
                    }
                }
            }
        }
    }

    fn all_batches_mut(&mut self) -> impl Iterator<Item = &mut ConstraintBatch> {
        self.actors
            .iter_mut()
            .flatten()
            .flat_map(|a| a.batches.iter_mut())
            .chain(self.stitches.iter_mut())
    }

    /// Projects penetrating particles out of their colliders and
    /// applies positional friction. Reaction impulses accumulate for
    /// rigid-body write-back.
    fn solve_contact_positions(&mut self, dt: f32) {
        for c in &self.contacts {
            if c.is_trigger {
                continue;
            }
            let i = c.particle as usize;
            let w = self.store.inv_masses[i];
            if w == 0.0 {
                continue;
            }

            let normal = Vec3::from(c.normal);
            let point = Vec3::from(c.point);
            let radius = self.store.radius(i);
            let depth = (self.store.position(i) - point).dot(normal) - radius;
            if depth >= 0.0 {
                continue;
            }

            let p = self.store.position(i) - normal * depth;
            self.store.set_position(i, p);

            if c.friction > 0.0 {
                let motion = self.store.position(i) - self.store.prev_positions[i].truncate();
                let tangential = motion - normal * motion.dot(normal);
                let p = self.store.position(i) - tangential * c.friction.min(1.0);
                self.store.set_position(i, p);
            }

            // Reaction on the collider: equal and opposite to the push.
            let impulse = normal * (depth / (w * dt));
            self.rigid_impulses.push((c.collider, impulse));
        }
    }

    fn capture_contact_velocities(&mut self) {
        self.contact_pre_vn.clear();
        for c in &self.contacts {
            let vn = self
                .store
                .velocity(c.particle as usize)
                .dot(Vec3::from(c.normal));
            self.contact_pre_vn.push(vn);
        }
    }

    fn update_velocities(&mut self, dt: f32) {
        let inv_dt = 1.0 / dt;
        let store = &mut self.store;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            store
                .velocities
                .par_iter_mut()
                .zip(store.positions.par_iter())
                .zip(store.prev_positions.par_iter())
                .zip(store.inv_masses.par_iter())
                .for_each(|(((v, p), prev), &w)| {
                    if w > 0.0 {
                        *v = ((p.truncate() - prev.truncate()) * inv_dt).extend(0.0);
                    }
                });
            store
                .angular_velocities
                .par_iter_mut()
                .zip(store.orientations.par_iter())
                .zip(store.prev_orientations.par_iter())
                .zip(store.inv_rot_masses.par_iter())
                .for_each(|(((omega, q), prev), &wr)| {
                    if wr > 0.0 {
                        *omega = angular_velocity_from(*prev, *q, inv_dt).extend(0.0);
                    }
                });
        }

        #[cfg(not(feature = "parallel"))]
        for i in 0..store.capacity() {
            if store.inv_masses[i] > 0.0 {
                let v = (store.position(i) - store.prev_positions[i].truncate()) * inv_dt;
                store.set_velocity(i, v);
            }
            if store.inv_rot_masses[i] > 0.0 {
                let omega = angular_velocity_from(store.prev_orientations[i], store.orientations[i], inv_dt);
                store.angular_velocities[i] = omega.extend(0.0);
            }
        }
    }

    /// XPBD restitution: lift the post-solve normal velocity to
    /// `-e * vn_pre` where `vn_pre` is the pre-solve approach speed.
    fn apply_contact_restitution(&mut self) {
        for (c, &vn_pre) in self.contacts.iter().zip(&self.contact_pre_vn) {
            if c.is_trigger || c.restitution <= 0.0 || vn_pre >= 0.0 {
                continue;
            }
            let i = c.particle as usize;
            let w = self.store.inv_masses[i];
            if w == 0.0 {
                continue;
            }

            let normal = Vec3::from(c.normal);
            let v = self.store.velocity(i);
            let vn = v.dot(normal);
            let target = -c.restitution * vn_pre;
            if vn < target {
                self.store.set_velocity(i, v + normal * (target - vn));
            }
        }
    }

    // ─── Inspection ───

    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contact transitions from the most recent step.
    pub fn contact_events(&self) -> &[ContactEvent] {
        &self.contact_events
    }

    /// Drains the reaction impulses accumulated for rigid bodies.
    pub fn take_rigid_impulses(&mut self) -> Vec<(ColliderId, Vec3)> {
        std::mem::take(&mut self.rigid_impulses)
    }

    /// Blends previous and current step states for rendering.
    /// `accumulated` is the host's leftover frame time in `[0, dt]`.
    pub fn interpolate(&mut self, dt: f32, accumulated: f32) {
        let alpha = if dt > 0.0 { accumulated / dt } else { 1.0 };
        self.interpolation.blend(&self.store, alpha);
    }

    pub fn render_state(&self) -> &InterpolationBuffers {
        &self.interpolation
    }

    /// Positions as plain arrays, for snapshotting.
    pub fn packed_positions(&self) -> Vec<[f32; 4]> {
        self.store.positions.iter().map(|p| p.to_array()).collect()
    }

    /// Velocities as plain arrays, for snapshotting.
    pub fn packed_velocities(&self) -> Vec<[f32; 4]> {
        self.store.velocities.iter().map(|v| v.to_array()).collect()
    }
}

/// Batches of one constraint kind across all actors plus the stitches.
fn batches_of_kind<'a>(
    actors: &'a mut [Option<Actor>],
    stitches: &'a mut [ConstraintBatch],
    kind: ConstraintKind,
) -> impl Iterator<Item = &'a mut ConstraintBatch> {
    actors
        .iter_mut()
        .flatten()
        .flat_map(|a| a.batches.iter_mut())
        .chain(stitches.iter_mut())
        .filter(move |b| b.kind() == kind)
}

/// Finite-difference angular velocity between two orientations.
fn angular_velocity_from(prev: Quat, current: Quat, inv_dt: f32) -> Vec3 {
    let dq = current * prev.conjugate();
    let omega = Vec3::new(dq.x, dq.y, dq.z) * (2.0 * inv_dt);
    if dq.w >= 0.0 {
        omega
    } else {
        -omega
    }
}
