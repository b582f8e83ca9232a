//! Pose error threshold monitoring

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::axes::{ComponentWiseError, ThresholdConfig, NUM_AXES};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if every axis of the error is within its threshold.
///
/// An axis is within its threshold if `|error| <= threshold`. NaN errors are
/// never within threshold.
pub fn within_threshold(error: &ComponentWiseError, threshold: &ThresholdConfig) -> bool {
    axes_within_threshold(error, threshold).iter().all(|w| *w)
}

/// Per-axis version of `within_threshold`.
pub fn axes_within_threshold(
    error: &ComponentWiseError,
    threshold: &ThresholdConfig,
) -> [bool; NUM_AXES] {
    let e = error.to_array();
    let t = threshold.to_array();

    let mut within = [false; NUM_AXES];
    for i in 0..NUM_AXES {
        within[i] = e[i].abs() <= t[i];
    }

    within
}
