//! Parameters structure for the base controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;

use crate::{
    axes::{Axes, GainConfig, ThresholdConfig, VelocityLimits, AXIS_NAMES},
    pose_error::ErrorSource,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the base controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- FRAMES ----
    /// Frame of the base, in which the origin pose is expressed and into
    /// which target poses are resolved.
    #[serde(default = "default_base_frame")]
    pub base_frame: String,

    /// Maximum time to wait for the target pose to be resolved into the base
    /// frame.
    ///
    /// Units: seconds
    pub wait_for_transform_s: f64,

    /// Which version of the target pose the error is computed from.
    #[serde(default)]
    pub error_source: ErrorSource,

    // ---- CONTROL ----
    /// Error band inside which the target is considered reached.
    ///
    /// Units: meters, radians
    pub threshold: ThresholdConfig,

    /// Proportional gains.
    pub gain: GainConfig,

    /// Maximum velocity magnitudes.
    ///
    /// Units: meters/second, radians/second
    pub max_velocity: VelocityLimits,

    // ---- SAFETY ----
    /// If false the range scan is never checked for obstacles.
    pub use_collision_avoidance: bool,

    /// Readings strictly closer than this distance are obstacles.
    ///
    /// Units: meters
    pub obstacle_threshold_m: f64,

    /// If true a zero twist is published while no target has been received,
    /// otherwise nothing is published.
    #[serde(default)]
    pub publish_zero_when_idle: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("The base frame name is empty")]
    EmptyBaseFrame,

    #[error("wait_for_transform_s must be positive and finite, found {0}")]
    InvalidTimeout(f64),

    #[error("{0}.{1} must be non-negative, found {2}")]
    NegativeAxisValue(&'static str, &'static str, f64),

    #[error("obstacle_threshold_m must be non-negative, found {0}")]
    InvalidObstacleThreshold(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            base_frame: default_base_frame(),
            wait_for_transform_s: 1.0,
            error_source: ErrorSource::Untransformed,
            threshold: Axes::from([0.02, 0.02, 15.0, 15.0, 15.0, 0.04]),
            gain: Axes::from([1.4, 1.4, 1.4, 1.4, 1.4, 1.2]),
            max_velocity: Axes::from([0.65, 0.6, 0.0, 0.0, 0.0, 0.6]),
            use_collision_avoidance: true,
            obstacle_threshold_m: 0.5,
            publish_zero_when_idle: false,
        }
    }
}

impl Params {
    /// Check that the parameters are usable by the controller.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.base_frame.is_empty() {
            return Err(ParamsError::EmptyBaseFrame);
        }

        if !(self.wait_for_transform_s > 0.0 && self.wait_for_transform_s.is_finite()) {
            return Err(ParamsError::InvalidTimeout(self.wait_for_transform_s));
        }

        for (name, axes) in vec![
            ("threshold", &self.threshold),
            ("gain", &self.gain),
            ("max_velocity", &self.max_velocity),
        ] {
            if let Some(i) = axes.first_invalid() {
                return Err(ParamsError::NegativeAxisValue(
                    name,
                    AXIS_NAMES[i],
                    axes.to_array()[i],
                ));
            }
        }

        if !(self.obstacle_threshold_m >= 0.0) {
            return Err(ParamsError::InvalidObstacleThreshold(
                self.obstacle_threshold_m,
            ));
        }

        Ok(())
    }

    /// The frame resolution timeout as a `Duration`.
    pub fn transform_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.wait_for_transform_s)
    }
}

fn default_base_frame() -> String {
    String::from("base_footprint")
}
