//! Component-wise pose error calculation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;
use std::time::Duration;

// Internal
use super::PoseErrorCalcError;
use crate::{axes::ComponentWiseError, frame::FrameResolver, pose::Pose};
use util::maths::shortest_angle_diff;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Computes the error between an origin pose and a target pose.
#[derive(Debug, Clone, Copy)]
pub struct PoseErrorCalculator {
    /// Maximum time to wait for the frame resolver.
    pub timeout: Duration,

    /// Which target pose the error is computed from.
    pub source: ErrorSource,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Selects which version of the target pose the error is computed from.
///
/// In both cases the target must be resolvable into the origin's frame,
/// otherwise the calculation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorSource {
    /// The target pose as received. The resolved pose is only used to check
    /// that the target is reachable in the origin frame.
    Untransformed,

    /// The target pose after being resolved into the origin frame.
    Transformed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ErrorSource {
    fn default() -> Self {
        ErrorSource::Untransformed
    }
}

impl PoseErrorCalculator {
    pub fn new(timeout: Duration, source: ErrorSource) -> Self {
        Self { timeout, source }
    }

    /// Compute the component-wise error from `origin` to `target`.
    ///
    /// Linear error is `target.position - origin.position`. Angular error is
    /// the shortest signed difference between the roll, pitch and yaw of the
    /// two attitudes.
    pub fn compute<R>(
        &self,
        origin: Option<&Pose>,
        target: Option<&Pose>,
        resolver: &R,
    ) -> Result<ComponentWiseError, PoseErrorCalcError>
    where
        R: FrameResolver + ?Sized,
    {
        let origin = origin.ok_or(PoseErrorCalcError::InvalidInput("origin"))?;
        let target = target.ok_or(PoseErrorCalcError::InvalidInput("target"))?;

        let resolved = resolver
            .transform(target, &origin.frame_id, self.timeout)
            .map_err(PoseErrorCalcError::FrameResolution)?;

        let target = match self.source {
            ErrorSource::Untransformed => target,
            ErrorSource::Transformed => &resolved,
        };

        let error = pose_difference(origin, target);

        trace!("Pose error: {:?}", error);

        Ok(error)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The component-wise difference `target - origin`, ignoring frames.
pub fn pose_difference(origin: &Pose, target: &Pose) -> ComponentWiseError {
    let linear = target.position_m - origin.position_m;

    let (roll_o, pitch_o, yaw_o) = origin.rpy();
    let (roll_t, pitch_t, yaw_t) = target.rpy();

    ComponentWiseError {
        linear_x: linear[0],
        linear_y: linear[1],
        linear_z: linear[2],
        angular_x: shortest_angle_diff(roll_t, roll_o),
        angular_y: shortest_angle_diff(pitch_t, pitch_o),
        angular_z: shortest_angle_diff(yaw_t, yaw_o),
    }
}
