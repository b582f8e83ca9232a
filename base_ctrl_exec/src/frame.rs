//! # Frame resolution
//!
//! Resolves poses expressed in one frame into another. The controller only
//! depends on the `FrameResolver` trait; `StaticFrameResolver` is a buffer of
//! rigid transforms which can be published to at any time, for example from
//! calibration parameters or an input script.
//!
//! A transform published as `(parent, child)` maps coordinates expressed in
//! `child` into `parent`. Lookups may use a transform directly, inverted, or
//! chained through one intermediate frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::{Isometry3, Point3};
use std::{
    collections::HashMap,
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::pose::Pose;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can express a pose in another frame.
pub trait FrameResolver {
    /// Express `pose` in `target_frame`.
    ///
    /// Implementations must return within (approximately) `timeout`, failing
    /// with `FrameError::Timeout` if the transform did not become available.
    fn transform(
        &self,
        pose: &Pose,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<Pose, FrameError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A buffer of static transforms between named frames.
#[derive(Default)]
pub struct StaticFrameResolver {
    /// Transforms keyed by `(parent, child)`.
    transforms: Mutex<HashMap<(String, String), Isometry3<f64>>>,

    /// Notified whenever a transform is published.
    published: Condvar,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("A pose with an empty frame id cannot be transformed")]
    EmptyFrameId,

    #[error("No transform from {source_frame:?} into {target_frame:?} became available within {timeout_s} s")]
    Timeout {
        source_frame: String,
        target_frame: String,
        timeout_s: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StaticFrameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) the transform mapping `child` coordinates into
    /// `parent` coordinates.
    pub fn publish(&self, parent: &str, child: &str, parent_from_child: Isometry3<f64>) {
        {
            let mut transforms = self.lock();
            transforms.insert((parent.to_string(), child.to_string()), parent_from_child);
        }

        debug!("Transform {:?} -> {:?} published", child, parent);

        self.published.notify_all();
    }

    /// Number of transforms currently in the buffer.
    pub fn num_transforms(&self) -> usize {
        self.lock().len()
    }

    /// Find the transform mapping `source` coordinates into `target`, if one
    /// can be built from the current buffer.
    pub fn lookup(&self, target: &str, source: &str) -> Option<Isometry3<f64>> {
        Self::lookup_in(&self.lock(), target, source)
    }

    fn lock(&self) -> MutexGuard<HashMap<(String, String), Isometry3<f64>>> {
        self.transforms
            .lock()
            .expect("StaticFrameResolver: transforms mutex poisoned")
    }

    fn lookup_in(
        transforms: &HashMap<(String, String), Isometry3<f64>>,
        target: &str,
        source: &str,
    ) -> Option<Isometry3<f64>> {
        if target == source {
            return Some(Isometry3::identity());
        }

        if let Some(t) = Self::single_hop(transforms, target, source) {
            return Some(t);
        }

        // Chain through any frame connected to both ends
        transforms
            .keys()
            .flat_map(|(p, c)| vec![p.as_str(), c.as_str()])
            .filter(|m| *m != target && *m != source)
            .find_map(|mid| {
                let target_from_mid = Self::single_hop(transforms, target, mid)?;
                let mid_from_source = Self::single_hop(transforms, mid, source)?;
                Some(target_from_mid * mid_from_source)
            })
    }

    fn single_hop(
        transforms: &HashMap<(String, String), Isometry3<f64>>,
        target: &str,
        source: &str,
    ) -> Option<Isometry3<f64>> {
        let key = (target.to_string(), source.to_string());
        if let Some(t) = transforms.get(&key) {
            return Some(*t);
        }

        let inv_key = (source.to_string(), target.to_string());
        transforms.get(&inv_key).map(|t| t.inverse())
    }
}

impl FrameResolver for StaticFrameResolver {
    fn transform(
        &self,
        pose: &Pose,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<Pose, FrameError> {
        if pose.frame_id.is_empty() || target_frame.is_empty() {
            return Err(FrameError::EmptyFrameId);
        }

        let deadline = Instant::now() + timeout;
        let mut transforms = self.lock();

        // Wait for the transform to be published or the deadline to pass
        let target_from_source = loop {
            if let Some(t) = Self::lookup_in(&transforms, target_frame, &pose.frame_id) {
                break t;
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(FrameError::Timeout {
                    source_frame: pose.frame_id.clone(),
                    target_frame: target_frame.to_string(),
                    timeout_s: timeout.as_secs_f64(),
                });
            }

            transforms = self
                .published
                .wait_timeout(transforms, deadline - now)
                .expect("StaticFrameResolver: transforms mutex poisoned")
                .0;
        };

        let position = target_from_source * Point3::from(pose.position_m);

        Ok(Pose {
            position_m: position.coords,
            attitude_q: target_from_source.rotation * pose.attitude_q,
            frame_id: target_frame.to_string(),
            timestamp: pose.timestamp,
        })
    }
}

impl<R> FrameResolver for Arc<R>
where
    R: FrameResolver + ?Sized,
{
    fn transform(
        &self,
        pose: &Pose,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<Pose, FrameError> {
        (**self).transform(pose, target_frame, timeout)
    }
}
