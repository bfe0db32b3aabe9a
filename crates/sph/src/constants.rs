//! Shared constants for the SPH solver.
//!
//! Every module reads hashing primes and default tuning values from here so
//! the sequential and parallel paths never drift apart.

/// First spatial-hash prime, multiplied with the cell x coordinate.
pub const HASH_PRIME_X: i32 = 73_856_093;

/// Second spatial-hash prime, multiplied with the cell y coordinate.
pub const HASH_PRIME_Y: i32 = 19_349_663;

/// Default restitution applied to velocity.x on both x walls.
pub const RESTITUTION_X: f32 = -0.9;

/// Default restitution applied to velocity.y on the floor.
///
/// Softer than the other walls so particles settle instead of bouncing.
pub const RESTITUTION_FLOOR: f32 = -0.5;

/// Default restitution applied to velocity.y on the ceiling.
pub const RESTITUTION_CEILING: f32 = -0.9;

/// Divisor applied to the pointer interaction pressure.
pub const INTERACTION_PRESSURE_SCALE: f32 = 0.1;

/// Speed that maps to color value 1.0 in the default config.
pub const COLOR_SPEED_MAX: f32 = 200.0;

/// Host-loop tick rate (Hz) used by the default config.
pub const TARGET_TICK_RATE: f32 = 50.0;
