//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default number of substeps per fixed step.
pub const DEFAULT_SUBSTEPS: u32 = 4;

/// Default constraint iterations per substep.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Denominator guard for the XPBD multiplier update.
///
/// Prevents NaN when a constraint's effective mass and compliance
/// are both zero (e.g. two pinned or coincident particles).
pub const XPBD_EPSILON: f32 = 1.0e-6;

/// Default successive-over-relaxation factor applied when scattering
/// accumulated position deltas back into particle positions.
pub const DEFAULT_SOR_FACTOR: f32 = 1.0;

/// Default contact offset (meters). Minimum separation kept between
/// a particle surface and a collider surface.
pub const DEFAULT_CONTACT_OFFSET: f32 = 0.005;

/// Extra collision margin (meters) added during broad and narrow phase
/// so that contacts are generated slightly before actual touch.
pub const COLLISION_MARGIN: f32 = 0.02;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// Squared-length threshold below which a constraint direction is
/// considered degenerate and produces no correction.
pub const DEGENERATE_LENGTH_SQ: f32 = 1.0e-12;
