//! # Six-axis quantities
//!
//! Errors, velocities and the per-axis parameters (thresholds, gains, limits)
//! all share the same six components: three linear (x, y, z) and three angular
//! (roll about x, pitch about y, yaw about z).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of Cartesian axes (3 linear + 3 angular).
pub const NUM_AXES: usize = 6;

/// Axis names in array order, used for logging and reports.
pub const AXIS_NAMES: [&str; NUM_AXES] = [
    "linear_x",
    "linear_y",
    "linear_z",
    "angular_x",
    "angular_y",
    "angular_z",
];

// ---------------------------------------------------------------------------
// MACROS
// ---------------------------------------------------------------------------

/// Implements array conversions and per-axis helpers on a struct with the six
/// standard axis fields.
macro_rules! impl_six_axis {
    ($name:ident) => {
        impl $name {
            /// All axes zero.
            pub const fn zero() -> Self {
                Self {
                    linear_x: 0.0,
                    linear_y: 0.0,
                    linear_z: 0.0,
                    angular_x: 0.0,
                    angular_y: 0.0,
                    angular_z: 0.0,
                }
            }

            /// Values in axis order (see `AXIS_NAMES`).
            pub fn to_array(&self) -> [f64; NUM_AXES] {
                [
                    self.linear_x,
                    self.linear_y,
                    self.linear_z,
                    self.angular_x,
                    self.angular_y,
                    self.angular_z,
                ]
            }

            /// Build from values in axis order.
            pub fn from_array(a: [f64; NUM_AXES]) -> Self {
                Self {
                    linear_x: a[0],
                    linear_y: a[1],
                    linear_z: a[2],
                    angular_x: a[3],
                    angular_y: a[4],
                    angular_z: a[5],
                }
            }

            /// True if every axis is exactly zero.
            pub fn is_zero(&self) -> bool {
                self.to_array().iter().all(|v| *v == 0.0)
            }
        }

        impl From<[f64; NUM_AXES]> for $name {
            fn from(a: [f64; NUM_AXES]) -> Self {
                Self::from_array(a)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A set of per-axis parameter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub linear_x: f64,
    pub linear_y: f64,
    pub linear_z: f64,
    pub angular_x: f64,
    pub angular_y: f64,
    pub angular_z: f64,
}

/// Per-axis "close enough" band on the pose error.
///
/// Units: meters for linear axes, radians for angular axes.
pub type ThresholdConfig = Axes;

/// Per-axis proportional gains.
///
/// Units: 1/seconds
pub type GainConfig = Axes;

/// Per-axis maximum velocity magnitudes. A zero limit disables the axis.
///
/// Units: meters/second for linear axes, radians/second for angular axes.
pub type VelocityLimits = Axes;

/// The Cartesian difference between two poses.
///
/// Linear fields are plain differences in meters. Angular fields are the
/// shortest signed roll, pitch and yaw differences in radians, each in
/// `(-pi, pi]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComponentWiseError {
    pub linear_x: f64,
    pub linear_y: f64,
    pub linear_z: f64,
    pub angular_x: f64,
    pub angular_y: f64,
    pub angular_z: f64,
}

/// A Cartesian velocity command for the base.
///
/// Units: meters/second for linear axes, radians/second for angular axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Twist {
    pub linear_x: f64,
    pub linear_y: f64,
    pub linear_z: f64,
    pub angular_x: f64,
    pub angular_y: f64,
    pub angular_z: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl_six_axis!(Axes);
impl_six_axis!(ComponentWiseError);
impl_six_axis!(Twist);

impl Axes {
    /// Index of the first negative (or NaN) value, if any.
    pub fn first_invalid(&self) -> Option<usize> {
        self.to_array().iter().position(|v| !(*v >= 0.0))
    }
}
