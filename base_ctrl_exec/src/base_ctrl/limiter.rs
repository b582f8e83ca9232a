//! Velocity limiting

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::axes::{Twist, VelocityLimits, NUM_AXES};
use util::maths::clamp_abs;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp each axis of the velocity to `[-limit, +limit]`.
///
/// The sign of each axis is preserved and no magnitude is ever increased.
pub fn limit(velocity: &Twist, limits: &VelocityLimits) -> Twist {
    let v = velocity.to_array();
    let l = limits.to_array();

    let mut out = [0f64; NUM_AXES];
    for i in 0..NUM_AXES {
        out[i] = clamp_abs(v[i], l[i]);
    }

    Twist::from(out)
}

/// Flags for the axes which `limit` would clamp.
pub fn limited_axes(velocity: &Twist, limits: &VelocityLimits) -> [bool; NUM_AXES] {
    let v = velocity.to_array();
    let l = limits.to_array();

    let mut flags = [false; NUM_AXES];
    for i in 0..NUM_AXES {
        flags[i] = v[i].abs() > l[i].abs();
    }

    flags
}
