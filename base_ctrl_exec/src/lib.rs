//! # Base controller library.
//!
//! This library allows the executable, benchmarks and other crates in the
//! workspace to access items defined inside the base controller crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Six-axis errors, velocities and per-axis parameters
pub mod axes;

/// Velocity control - gain, limit and synchronise the pose error into a twist
pub mod base_ctrl;

/// Coordinator - runs the control tick and holds the shared input state
pub mod coordinator;

/// Frame resolution - expresses poses in other frames
pub mod frame;

/// Input client - replays target poses, scans and transforms from a script
pub mod input_client;

/// Executable parameters
pub mod params;

/// Timestamped poses in named frames
pub mod pose;

/// Pose error calculation and threshold monitoring
pub mod pose_error;

/// Range scan sanitising and obstacle detection
pub mod scan;

/// Destinations for velocity commands
pub mod twist_sink;
