//! # Base controller coordinator
//!
//! Runs the control tick. Each tick the latest target pose is compared with
//! the origin of the base frame:
//!
//! - No target yet: nothing is commanded (or a zero twist, if configured).
//! - Error can't be computed: zero twist.
//! - Error within thresholds: zero twist, the target has been reached.
//! - Obstacle in the latest scan: zero twist.
//! - Otherwise: gain, limit and synchronise the error into a twist.
//!
//! If no scan has ever been received the obstacle check is skipped. This is
//! reported as the `SensorStale` fault but does not stop the base.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller_state;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use controller_state::*;
pub use params::*;
pub use state::*;

use crate::pose_error::PoseErrorCalcError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Faults handled inside the control tick.
///
/// None of these are returned to the caller, they are reported in the
/// `StatusReport` and result in a zero twist (except `SensorStale`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BaseCtrlFault {
    #[error("Could not compute the pose error: {0}")]
    PoseError(PoseErrorCalcError),

    #[error("No range scan has been received, obstacle check skipped")]
    SensorStale,
}

#[cfg(test)]
mod test;
