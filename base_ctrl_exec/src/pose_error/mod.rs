//! # Pose error module
//!
//! Computes the component-wise error between the origin pose of the base and
//! a target pose, and decides whether that error is small enough to consider
//! the target reached.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calculator;
mod monitor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use calculator::*;
pub use monitor::*;

use crate::frame::FrameError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while computing the pose error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoseErrorCalcError {
    #[error("No {0} pose was provided")]
    InvalidInput(&'static str),

    #[error("Could not resolve the target pose into the origin frame: {0}")]
    FrameResolution(FrameError),
}
