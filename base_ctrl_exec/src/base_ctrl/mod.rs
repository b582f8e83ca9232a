//! # Base velocity control module
//!
//! Converts a pose error into a velocity command for the base in three steps:
//!
//! 1. Proportional gain control, each axis' velocity is its error multiplied
//!    by a gain.
//! 2. Limiting, each axis is clamped to the maximum magnitude the base can
//!    achieve. A zero limit disables an axis entirely, which is how the
//!    non-actuated axes of a planar base (z, roll, pitch) are removed.
//! 3. Synchronisation, the limited velocities are rescaled so that every
//!    actuated axis would reach zero error at the same time. Without this an
//!    axis with a small error finishes early while a clamped axis is still
//!    moving, giving a curved path to the target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod gain;
mod limiter;
mod sync;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use gain::*;
pub use limiter::*;
pub use sync::*;
