//! Implementations for the BaseCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use std::{convert::Infallible, sync::Arc};

// Internal
use super::{BaseCtrlFault, ControllerState, InputData, Params, ParamsError};
use crate::{
    axes::{ComponentWiseError, Twist, NUM_AXES},
    base_ctrl::{compute_velocity, limit, limited_axes, synchronize, time_to_goal},
    frame::FrameResolver,
    pose::Pose,
    pose_error::{within_threshold, PoseErrorCalculator},
    scan::{detect_obstacle, sanitize},
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Base controller module state.
///
/// Each call to `proc` performs one control tick and produces at most one
/// velocity command.
pub struct BaseCtrl<R> {
    params: Params,

    resolver: R,

    /// Inputs written by other threads
    state: Arc<ControllerState>,

    /// Identity pose in the base frame, the error is measured from here
    origin: Pose,

    calculator: PoseErrorCalculator,

    mode: BaseCtrlMode,

    /// Fault raised on the previous tick, used to only log changes
    prev_fault: Option<BaseCtrlFault>,

    report: StatusReport,
}

/// Data needed to initialise BaseCtrl.
pub struct InitData<R> {
    /// Path to the parameter file, relative to the params directory
    pub params_path: String,

    /// The frame resolver used to express target poses in the base frame
    pub resolver: R,
}

/// Status report for BaseCtrl processing.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Mode the controller finished the tick in
    pub mode: BaseCtrlMode,

    /// Pose error computed this tick, if any
    pub error: Option<ComponentWiseError>,

    /// True if the error was within the thresholds
    pub within_threshold: bool,

    /// True if an obstacle was found in the scan this tick
    pub obstacle_detected: bool,

    /// Closest sanitised range reading, if the scan was checked
    pub closest_range_m: Option<f32>,

    /// Axes clamped by the velocity limiter
    pub vel_limited: [bool; NUM_AXES],

    /// Time for all axes to reach the target at the commanded velocity
    pub time_to_goal_s: Option<f64>,

    /// Fault raised this tick, if any
    pub fault: Option<BaseCtrlFault>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The modes of BaseCtrl.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseCtrlMode {
    /// No target has ever been received
    Idle,

    /// A target is present but the error could not be classified this tick
    Evaluating,

    /// The target has been reached
    WithinThreshold,

    /// An obstacle is too close, the base is held stopped
    ObstacleBlocked,

    /// Driving towards the target
    Commanding,
}

/// Errors which can occur while initialising BaseCtrl.
#[derive(Debug, thiserror::Error)]
pub enum BaseCtrlInitError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BaseCtrlMode {
    fn default() -> Self {
        BaseCtrlMode::Idle
    }
}

impl<R> State for BaseCtrl<R>
where
    R: FrameResolver,
{
    type InitData = InitData<R>;
    type InitError = BaseCtrlInitError;

    type InputData = InputData;
    type OutputData = Option<Twist>;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the BaseCtrl module from a parameter file.
    fn init(init_data: Self::InitData, _session: &Session) -> Result<Self, Self::InitError> {
        let params: Params =
            params::load(&init_data.params_path).map_err(BaseCtrlInitError::ParamLoadError)?;

        Self::new(params, init_data.resolver).map_err(BaseCtrlInitError::InvalidParams)
    }

    /// Perform one control tick.
    ///
    /// Never fails, every fault results in a zero twist being commanded.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();
        let prev_mode = self.mode;

        let output = self.run(input_data);

        // Paths which skip the scan check leave the report's flag cleared
        self.state.set_obstacle_detected(self.report.obstacle_detected);
        self.report.mode = self.mode;
        self.log_changes(prev_mode);

        trace!("BaseCtrl output: {:?}\n    {:?}", output, self.report);

        Ok((output, self.report.clone()))
    }
}

impl<R> BaseCtrl<R>
where
    R: FrameResolver,
{
    /// Create a new controller from already loaded parameters.
    pub fn new(params: Params, resolver: R) -> Result<Self, ParamsError> {
        params.validate()?;

        info!("BaseCtrl parameters:");
        info!("    Base frame: {:?}", params.base_frame);
        info!("    Transform timeout: {} s", params.wait_for_transform_s);
        info!("    Error source: {:?}", params.error_source);
        info!("    Threshold: {:?}", params.threshold.to_array());
        info!("    Gain: {:?}", params.gain.to_array());
        info!("    Max velocity: {:?}", params.max_velocity.to_array());
        info!(
            "    Collision avoidance: {} (threshold {} m)",
            params.use_collision_avoidance, params.obstacle_threshold_m
        );

        Ok(Self {
            origin: Pose::identity(&params.base_frame),
            calculator: PoseErrorCalculator::new(
                params.transform_timeout(),
                params.error_source,
            ),
            params,
            resolver,
            state: Arc::new(ControllerState::new()),
            mode: BaseCtrlMode::Idle,
            prev_fault: None,
            report: StatusReport::default(),
        })
    }

    /// Handle to the shared state, used by input sources to deliver new poses
    /// and scans.
    pub fn state(&self) -> Arc<ControllerState> {
        self.state.clone()
    }

    pub fn mode(&self) -> BaseCtrlMode {
        self.mode
    }

    /// Take a snapshot of the shared state and process it.
    pub fn tick(&mut self) -> (Option<Twist>, StatusReport) {
        let input = self.state.snapshot();

        match self.proc(&input) {
            Ok(r) => r,
            Err(e) => match e {},
        }
    }

    /// The per-tick algorithm. Sets `self.mode` and fills the report.
    fn run(&mut self, input: &InputData) -> Option<Twist> {
        // Without a target there is nothing to do
        let target = match input.target_pose {
            Some(ref t) => t,
            None => {
                self.mode = BaseCtrlMode::Idle;
                self.state.set_collision_avoidance_active(false);
                return match self.params.publish_zero_when_idle {
                    true => Some(Twist::zero()),
                    false => None,
                };
            }
        };

        self.mode = BaseCtrlMode::Evaluating;

        let error = match self
            .calculator
            .compute(Some(&self.origin), Some(target), &self.resolver)
        {
            Ok(e) => e,
            Err(e) => {
                self.report.fault = Some(BaseCtrlFault::PoseError(e));
                self.state.set_collision_avoidance_active(false);
                return Some(Twist::zero());
            }
        };
        self.report.error = Some(error);

        if within_threshold(&error, &self.params.threshold) {
            self.report.within_threshold = true;
            self.mode = BaseCtrlMode::WithinThreshold;
            self.state.set_collision_avoidance_active(false);
            return Some(Twist::zero());
        }

        if self.obstacle_check(input) {
            self.mode = BaseCtrlMode::ObstacleBlocked;
            self.state.set_collision_avoidance_active(true);
            return Some(Twist::zero());
        }
        self.state.set_collision_avoidance_active(false);

        let velocity = compute_velocity(&error, &self.params.gain);
        let limited = limit(&velocity, &self.params.max_velocity);
        let synced = synchronize(&limited, &error);

        self.report.vel_limited = limited_axes(&velocity, &self.params.max_velocity);
        self.report.time_to_goal_s = time_to_goal(&synced, &error);
        self.mode = BaseCtrlMode::Commanding;

        Some(synced)
    }

    /// Check the latest scan for obstacles, returning true if the base must
    /// stop.
    ///
    /// If no scan has ever been received the check is skipped and the
    /// `SensorStale` fault is reported.
    fn obstacle_check(&mut self, input: &InputData) -> bool {
        if !self.params.use_collision_avoidance {
            return false;
        }

        let mut scan = match input.scan {
            Some(ref s) => s.clone(),
            None => {
                self.report.fault = Some(BaseCtrlFault::SensorStale);
                return false;
            }
        };

        sanitize(&mut scan);

        let obstacle = detect_obstacle(&scan, self.params.obstacle_threshold_m as f32);

        self.report.closest_range_m = scan.closest();
        self.report.obstacle_detected = obstacle;

        if obstacle {
            debug!(
                "Obstacle at {:?} m, holding the base",
                self.report.closest_range_m
            );
        }

        obstacle
    }

    /// Log when the mode changes or a fault is raised or cleared, rather than
    /// on every tick.
    fn log_changes(&mut self, prev_mode: BaseCtrlMode) {
        if self.mode != prev_mode {
            match self.mode {
                BaseCtrlMode::ObstacleBlocked => {
                    warn!("Obstacle detected, collision avoidance active")
                }
                BaseCtrlMode::WithinThreshold => info!("Target reached"),
                m => debug!("BaseCtrl mode {:?} -> {:?}", prev_mode, m),
            }
        }

        if self.report.fault != self.prev_fault {
            match (&self.prev_fault, &self.report.fault) {
                (_, Some(f)) => warn!("BaseCtrl fault: {}", f),
                (Some(f), None) => info!("BaseCtrl fault cleared: {}", f),
                (None, None) => (),
            }
        }

        self.prev_fault = self.report.fault.clone();
    }
}
