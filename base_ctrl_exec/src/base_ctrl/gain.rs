//! Proportional gain control

use crate::axes::{ComponentWiseError, GainConfig, Twist, NUM_AXES};

/// Compute the velocity demand for the error using per-axis proportional
/// gains.
pub fn compute_velocity(error: &ComponentWiseError, gains: &GainConfig) -> Twist {
    let e = error.to_array();
    let k = gains.to_array();

    let mut v = [0f64; NUM_AXES];
    for i in 0..NUM_AXES {
        v[i] = e[i] * k[i];
    }

    Twist::from(v)
}
