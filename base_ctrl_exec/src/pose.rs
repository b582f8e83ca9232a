//! # Pose module
//!
//! Timestamped poses expressed in a named reference frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and attitude in a particular frame at a particular time.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// The position in the `frame_id` frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// The attitude in the `frame_id` frame.
    pub attitude_q: UnitQuaternion<f64>,

    /// Name of the frame the pose is expressed in.
    pub frame_id: String,

    /// Time at which the pose was valid.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose stamped with the current time.
    pub fn new(
        position_m: Vector3<f64>,
        attitude_q: UnitQuaternion<f64>,
        frame_id: &str,
    ) -> Self {
        Self {
            position_m,
            attitude_q,
            frame_id: frame_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// The origin of the given frame (zero position, identity attitude).
    pub fn identity(frame_id: &str) -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity(), frame_id)
    }

    /// Roll, pitch and yaw of the attitude in radians.
    ///
    /// Uses the fixed-axis X-Y-Z (roll about X, then pitch about Y, then yaw
    /// about Z) decomposition.
    pub fn rpy(&self) -> (f64, f64, f64) {
        self.attitude_q.euler_angles()
    }
}
