//! # Input Client
//!
//! The InputClient feeds the controller from a timed input script. Each entry
//! in the script is one of:
//!
//! - A target pose, which replaces the controller's current target.
//! - A range scan, which replaces the controller's latest scan.
//! - A static transform, which is published into the frame resolver.
//!
//! Entries are released by a background thread once their time (measured from
//! when the client was started) has passed, in the same way the telecommand
//! scripts are replayed. The control loop never blocks on the client, it
//! simply reads whatever was delivered last.
//!
//! An example script:
//!
//! ```text
//! # Sensor-to-base transform
//! 0.0: {"Transform": {"parent": "base_footprint", "child": "base_laser",
//!     "translation_m": [0.2, 0.0, 0.1], "rotation_q": [0.0, 0.0, 0.0, 1.0]}};
//! 0.0: {"Scan": {"ranges": [3.0, 3.0, null, 3.0], "range_min": 0.05, "range_max": 10.0}};
//! 0.5: {"TargetPose": {"frame_id": "base_footprint",
//!     "position_m": [1.0, 0.0, 0.0], "orientation_q": [0.0, 0.0, 0.0, 1.0]}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;
use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{coordinator::ControllerState, frame::StaticFrameResolver, pose::Pose, scan::RangeScan};
use util::script_interpreter::{Pending, ScriptError, ScriptInterpreter};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time the background thread sleeps between checks of the script.
const POLL_PERIOD: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

pub struct InputClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

/// A target pose as written in an input script.
#[derive(Debug, Clone, Deserialize)]
pub struct PoseMsg {
    pub frame_id: String,

    /// Units: meters
    pub position_m: [f64; 3],

    /// Quaternion in `[x, y, z, w]` order, normalised on conversion.
    pub orientation_q: [f64; 4],
}

/// A range scan as written in an input script. A `null` range is a NaN
/// reading.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanMsg {
    pub ranges: Vec<Option<f32>>,
    pub range_min: f32,
    pub range_max: f32,
}

/// A static transform mapping `child` coordinates into `parent`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformMsg {
    pub parent: String,
    pub child: String,

    /// Units: meters
    pub translation_m: [f64; 3],

    /// Quaternion in `[x, y, z, w]` order, normalised on conversion.
    pub rotation_q: [f64; 4],
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// A single input script entry.
#[derive(Debug, Clone, Deserialize)]
pub enum InputMsg {
    TargetPose(PoseMsg),
    Scan(ScanMsg),
    Transform(TransformMsg),
}

#[derive(Debug, thiserror::Error)]
pub enum InputClientError {
    #[error("Could not load the input script: {0}")]
    ScriptError(ScriptError),

    #[error("Invalid quaternion {0:?}, it must have a non-zero finite norm")]
    InvalidQuaternion([f64; 4]),

    #[error("Empty frame name in {0}")]
    EmptyFrame(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl InputClient {
    /// Load the script at `script_path` and start replaying it.
    pub fn new<P: AsRef<Path>>(
        script_path: P,
        state: Arc<ControllerState>,
        resolver: Arc<StaticFrameResolver>,
    ) -> Result<Self, InputClientError> {
        let si = ScriptInterpreter::new(script_path).map_err(InputClientError::ScriptError)?;

        info!(
            "Loaded input script {:?} lasts {:.02} s and contains {} entries",
            si.script_path(),
            si.get_duration(),
            si.get_num_items()
        );

        Ok(Self::from_interpreter(si, state, resolver))
    }

    /// Start replaying an already loaded script.
    pub fn from_interpreter(
        si: ScriptInterpreter<InputMsg>,
        state: Arc<ControllerState>,
        resolver: Arc<StaticFrameResolver>,
    ) -> Self {
        let bg_run = Arc::new(AtomicBool::new(true));
        let finished = Arc::new(AtomicBool::new(false));

        let bg_run_clone = bg_run.clone();
        let finished_clone = finished.clone();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(si, bg_run_clone, finished_clone, state, resolver)
        }));

        Self {
            bg_jh,
            bg_run,
            finished,
        }
    }

    /// True once every entry in the script has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Stop the background thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("InputClient background thread panicked");
            }
        }
    }
}

impl Drop for InputClient {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PoseMsg {
    pub fn to_pose(&self) -> Result<Pose, InputClientError> {
        if self.frame_id.is_empty() {
            return Err(InputClientError::EmptyFrame("TargetPose"));
        }

        Ok(Pose::new(
            Vector3::from(self.position_m),
            unit_quaternion(self.orientation_q)?,
            &self.frame_id,
        ))
    }
}

impl ScanMsg {
    pub fn to_scan(&self) -> RangeScan {
        RangeScan::new(
            self.ranges
                .iter()
                .map(|r| r.unwrap_or(std::f32::NAN))
                .collect(),
            self.range_min,
            self.range_max,
        )
    }
}

impl TransformMsg {
    /// The transform mapping `child` coordinates into `parent`.
    pub fn to_isometry(&self) -> Result<Isometry3<f64>, InputClientError> {
        if self.parent.is_empty() || self.child.is_empty() {
            return Err(InputClientError::EmptyFrame("Transform"));
        }

        Ok(Isometry3::from_parts(
            Translation3::new(
                self.translation_m[0],
                self.translation_m[1],
                self.translation_m[2],
            ),
            unit_quaternion(self.rotation_q)?,
        ))
    }

    /// Publish this transform into the resolver.
    pub fn publish(&self, resolver: &StaticFrameResolver) -> Result<(), InputClientError> {
        resolver.publish(&self.parent, &self.child, self.to_isometry()?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Deliver a single message to the controller state or frame resolver.
pub fn dispatch(
    msg: &InputMsg,
    state: &ControllerState,
    resolver: &StaticFrameResolver,
) -> Result<(), InputClientError> {
    match msg {
        InputMsg::TargetPose(p) => {
            let pose = p.to_pose()?;
            debug!(
                "New target pose in {:?}: {:?}",
                pose.frame_id,
                pose.position_m.as_slice()
            );
            state.set_target_pose(pose);
        }
        InputMsg::Scan(s) => state.set_scan(s.to_scan()),
        InputMsg::Transform(t) => t.publish(resolver)?,
    }

    Ok(())
}

/// Build a unit quaternion from `[x, y, z, w]`.
fn unit_quaternion(q: [f64; 4]) -> Result<UnitQuaternion<f64>, InputClientError> {
    let quat = Quaternion::new(q[3], q[0], q[1], q[2]);
    let norm = quat.norm();

    if !(norm.is_finite() && norm > 0.0) {
        return Err(InputClientError::InvalidQuaternion(q));
    }

    Ok(UnitQuaternion::from_quaternion(quat))
}

/// Background thread, releases script entries as they become due.
fn bg_thread(
    mut si: ScriptInterpreter<InputMsg>,
    run: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    state: Arc<ControllerState>,
    resolver: Arc<StaticFrameResolver>,
) {
    let start = Instant::now();

    while run.load(Ordering::Relaxed) {
        match si.get_pending_at(start.elapsed().as_secs_f64()) {
            Pending::None => thread::sleep(POLL_PERIOD),
            Pending::Some(msgs) => {
                for msg in msgs.iter() {
                    if let Err(e) = dispatch(msg, &state, &resolver) {
                        warn!("Could not deliver input script entry: {}", e);
                    }
                }
            }
            Pending::EndOfScript => {
                info!("End of input script reached");
                finished.store(true, Ordering::Relaxed);
                break;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::FrameResolver;

    const SCRIPT: &str = r#"
        # Laser mounted 0.2 m in front of the base
        0.0: {"Transform": {"parent": "base_footprint", "child": "base_laser",
            "translation_m": [0.2, 0.0, 0.0], "rotation_q": [0.0, 0.0, 0.0, 1.0]}};
        0.0: {"Scan": {"ranges": [1.0, null, 2.0], "range_min": 0.05, "range_max": 10.0}};
        0.05: {"TargetPose": {"frame_id": "base_laser",
            "position_m": [1.0, 0.0, 0.0], "orientation_q": [0.0, 0.0, 0.0, 2.0]}};
    "#;

    #[test]
    fn test_parse_messages() {
        let si: ScriptInterpreter<InputMsg> = ScriptInterpreter::from_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_items(), 3);
        assert!((si.get_duration() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_null_range_is_nan() {
        let msg: InputMsg = serde_json::from_str(
            r#"{"Scan": {"ranges": [null, 0.5], "range_min": 0.0, "range_max": 4.0}}"#,
        )
        .unwrap();

        let scan = match msg {
            InputMsg::Scan(s) => s.to_scan(),
            m => panic!("Expected a scan, got {:?}", m),
        };

        assert!(scan.ranges[0].is_nan());
        assert_eq!(scan.ranges[1], 0.5);
        assert_eq!(scan.range_max, 4.0);
    }

    #[test]
    fn test_dispatch() {
        let state = ControllerState::new();
        let resolver = StaticFrameResolver::new();

        let mut si: ScriptInterpreter<InputMsg> = ScriptInterpreter::from_str(SCRIPT).unwrap();
        let msgs = match si.get_pending_at(1.0) {
            Pending::Some(m) => m,
            p => panic!("Expected pending entries, got {:?}", p),
        };

        for m in msgs.iter() {
            dispatch(m, &state, &resolver).unwrap();
        }

        assert_eq!(resolver.num_transforms(), 1);

        let snap = state.snapshot();

        let scan = snap.scan.unwrap();
        assert_eq!(scan.ranges[0], 1.0);
        assert!(scan.ranges[1].is_nan());

        // Quaternion is normalised and the pose is resolvable into the base
        let target = snap.target_pose.unwrap();
        assert!((target.attitude_q.w - 1.0).abs() < 1e-12);

        let in_base = resolver
            .transform(&target, "base_footprint", Duration::from_millis(10))
            .unwrap();
        assert!((in_base.position_m[0] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_messages() {
        let state = ControllerState::new();
        let resolver = StaticFrameResolver::new();

        let bad_q = InputMsg::TargetPose(PoseMsg {
            frame_id: String::from("map"),
            position_m: [0.0; 3],
            orientation_q: [0.0; 4],
        });
        assert!(matches!(
            dispatch(&bad_q, &state, &resolver),
            Err(InputClientError::InvalidQuaternion(_))
        ));

        let bad_frame = InputMsg::Transform(TransformMsg {
            parent: String::new(),
            child: String::from("a"),
            translation_m: [0.0; 3],
            rotation_q: [0.0, 0.0, 0.0, 1.0],
        });
        assert!(matches!(
            dispatch(&bad_frame, &state, &resolver),
            Err(InputClientError::EmptyFrame(_))
        ));

        // Nothing was delivered
        assert!(state.snapshot().target_pose.is_none());
        assert_eq!(resolver.num_transforms(), 0);
    }

    #[test]
    fn test_background_replay() {
        let state = Arc::new(ControllerState::new());
        let resolver = Arc::new(StaticFrameResolver::new());

        let si = ScriptInterpreter::from_str(SCRIPT).unwrap();
        let client = InputClient::from_interpreter(si, state.clone(), resolver.clone());

        let deadline = Instant::now() + Duration::from_secs(2);
        while !client.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert!(client.is_finished());
        assert!(state.snapshot().target_pose.is_some());
        assert_eq!(resolver.num_transforms(), 1);
    }

    #[test]
    fn test_stop_before_end() {
        let state = Arc::new(ControllerState::new());
        let resolver = Arc::new(StaticFrameResolver::new());

        let si = ScriptInterpreter::from_str(
            r#"100.0: {"Scan": {"ranges": [1.0], "range_min": 0.0, "range_max": 5.0}};"#,
        )
        .unwrap();
        let mut client = InputClient::from_interpreter(si, state.clone(), resolver);

        client.stop();

        assert!(!client.is_finished());
        assert!(state.snapshot().scan.is_none());
    }
}
