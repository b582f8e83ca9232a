//! Shared controller state
//!
//! Inputs to the controller arrive asynchronously from other threads. Each
//! input has a single slot, a new value overwrites the old one and the tick
//! reads whatever is latest.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use crate::{pose::Pose, scan::RangeScan};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State shared between the input handlers and the control loop.
#[derive(Debug, Default)]
pub struct ControllerState {
    target_pose: Mutex<Option<Pose>>,
    scan: Mutex<Option<RangeScan>>,

    /// Result of the last obstacle check.
    obstacle_detected: AtomicBool,

    /// True while the safety layer is overriding the velocity command.
    collision_avoidance_active: AtomicBool,
}

/// A consistent copy of the inputs, taken once per tick.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Latest target pose, or `None` if no target has been received.
    pub target_pose: Option<Pose>,

    /// Latest range scan, or `None` if no scan has been received.
    pub scan: Option<RangeScan>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the target pose.
    pub fn set_target_pose(&self, pose: Pose) {
        *self
            .target_pose
            .lock()
            .expect("ControllerState: target_pose mutex poisoned") = Some(pose);
    }

    /// Replace the range scan.
    pub fn set_scan(&self, scan: RangeScan) {
        *self
            .scan
            .lock()
            .expect("ControllerState: scan mutex poisoned") = Some(scan);
    }

    /// Copy the latest inputs.
    pub fn snapshot(&self) -> InputData {
        let target_pose = self
            .target_pose
            .lock()
            .expect("ControllerState: target_pose mutex poisoned")
            .clone();
        let scan = self
            .scan
            .lock()
            .expect("ControllerState: scan mutex poisoned")
            .clone();

        InputData { target_pose, scan }
    }

    pub fn obstacle_detected(&self) -> bool {
        self.obstacle_detected.load(Ordering::Relaxed)
    }

    pub fn collision_avoidance_active(&self) -> bool {
        self.collision_avoidance_active.load(Ordering::Relaxed)
    }

    pub(crate) fn set_obstacle_detected(&self, detected: bool) {
        self.obstacle_detected.store(detected, Ordering::Relaxed);
    }

    pub(crate) fn set_collision_avoidance_active(&self, active: bool) {
        self.collision_avoidance_active
            .store(active, Ordering::Relaxed);
    }
}
