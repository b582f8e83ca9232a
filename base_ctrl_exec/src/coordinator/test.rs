//! Control tick tests

use super::*;
use crate::{
    axes::{Axes, Twist},
    frame::{FrameError, FrameResolver, StaticFrameResolver},
    pose::Pose,
    pose_error::ErrorSource,
    scan::RangeScan,
};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use util::module::State;

/// A resolver which waits for the full timeout and then fails.
struct SlowResolver;

impl FrameResolver for SlowResolver {
    fn transform(&self, pose: &Pose, target_frame: &str, timeout: Duration) -> Result<Pose, FrameError> {
        std::thread::sleep(timeout);
        Err(FrameError::Timeout {
            source_frame: pose.frame_id.clone(),
            target_frame: target_frame.to_string(),
            timeout_s: timeout.as_secs_f64(),
        })
    }
}

fn params() -> Params {
    Params {
        wait_for_transform_s: 0.05,
        gain: Axes::from([1.0, 1.0, 1.0, 1.0, 1.0, 1.2]),
        ..Params::default()
    }
}

fn target(x: f64, y: f64, yaw: f64) -> Pose {
    Pose::new(
        Vector3::new(x, y, 0.0),
        UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        "base_footprint",
    )
}

fn clear_scan() -> RangeScan {
    RangeScan::new(vec![3.0; 16], 0.05, 10.0)
}

fn input(pose: Option<Pose>, scan: Option<RangeScan>) -> InputData {
    InputData {
        target_pose: pose,
        scan,
    }
}

fn ctrl(params: Params) -> BaseCtrl<StaticFrameResolver> {
    BaseCtrl::new(params, StaticFrameResolver::new()).unwrap()
}

#[test]
fn test_idle_publishes_nothing() {
    let mut c = ctrl(params());

    let (out, report) = c.proc(&input(None, Some(clear_scan()))).unwrap();

    assert_eq!(out, None);
    assert_eq!(report.mode, BaseCtrlMode::Idle);
    assert_eq!(c.mode(), BaseCtrlMode::Idle);
}

#[test]
fn test_idle_publishes_zero_if_configured() {
    let mut c = ctrl(Params {
        publish_zero_when_idle: true,
        ..params()
    });

    let (out, _) = c.proc(&input(None, None)).unwrap();

    assert_eq!(out, Some(Twist::zero()));
}

#[test]
fn test_single_axis_command() {
    let mut c = ctrl(params());

    let (out, report) = c
        .proc(&input(Some(target(1.0, 0.0, 0.0)), Some(clear_scan())))
        .unwrap();

    let out = out.unwrap();
    assert!((out.linear_x - 0.65).abs() < 1e-12);
    assert_eq!(out.linear_y, 0.0);
    assert_eq!(out.angular_z, 0.0);

    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert_eq!(report.error.map(|e| e.linear_x), Some(1.0));
    assert_eq!(report.vel_limited, [true, false, false, false, false, false]);
    assert!(report.fault.is_none());
    assert!(!report.obstacle_detected);
    assert_eq!(report.closest_range_m, Some(3.0));
}

#[test]
fn test_obstacle_overrides_command() {
    let mut c = ctrl(params());
    let state = c.state();

    let scan = RangeScan::new(
        vec![std::f32::NAN, 0.3, 0.3, 0.3, std::f32::INFINITY],
        0.05,
        10.0,
    );

    let (out, report) = c
        .proc(&input(Some(target(1.0, 0.0, 0.0)), Some(scan)))
        .unwrap();

    assert_eq!(out, Some(Twist::zero()));
    assert_eq!(report.mode, BaseCtrlMode::ObstacleBlocked);
    assert!(report.obstacle_detected);
    assert_eq!(report.closest_range_m, Some(0.3));
    assert!(state.obstacle_detected());
    assert!(state.collision_avoidance_active());

    // Once the obstacle moves away the base drives again
    let (out, report) = c
        .proc(&input(Some(target(1.0, 0.0, 0.0)), Some(clear_scan())))
        .unwrap();

    assert!((out.unwrap().linear_x - 0.65).abs() < 1e-12);
    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert!(!state.obstacle_detected());
    assert!(!state.collision_avoidance_active());
}

#[test]
fn test_obstacle_flag_cleared_when_scan_not_checked() {
    let mut c = ctrl(params());
    let state = c.state();
    let blocking = || Some(RangeScan::new(vec![0.1; 8], 0.05, 10.0));

    let block = |c: &mut BaseCtrl<StaticFrameResolver>| {
        let (_, report) = c
            .proc(&input(Some(target(1.0, 0.0, 0.0)), blocking()))
            .unwrap();
        assert_eq!(report.mode, BaseCtrlMode::ObstacleBlocked);
        assert!(state.obstacle_detected());
    };

    // Within threshold, the scan is never looked at
    block(&mut c);
    let (_, report) = c
        .proc(&input(Some(target(0.0, 0.0, 0.0)), blocking()))
        .unwrap();
    assert_eq!(report.mode, BaseCtrlMode::WithinThreshold);
    assert!(!report.obstacle_detected);
    assert!(!state.obstacle_detected());
    assert!(!state.collision_avoidance_active());

    // Idle
    block(&mut c);
    c.proc(&input(None, blocking())).unwrap();
    assert!(!state.obstacle_detected());

    // Pose error failure
    block(&mut c);
    let unknown = Pose::new(Vector3::new(1.0, 0.0, 0.0), UnitQuaternion::identity(), "map");
    let (_, report) = c.proc(&input(Some(unknown), blocking())).unwrap();
    assert!(report.fault.is_some());
    assert!(!state.obstacle_detected());

    // No scan any more
    block(&mut c);
    let (_, report) = c.proc(&input(Some(target(1.0, 0.0, 0.0)), None)).unwrap();
    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert!(!state.obstacle_detected());
}

#[test]
fn test_obstacle_ignored_when_collision_avoidance_disabled() {
    let mut c = ctrl(Params {
        use_collision_avoidance: false,
        ..params()
    });

    let scan = RangeScan::new(vec![0.1; 8], 0.05, 10.0);
    let (out, report) = c
        .proc(&input(Some(target(1.0, 0.0, 0.0)), Some(scan)))
        .unwrap();

    assert!((out.unwrap().linear_x - 0.65).abs() < 1e-12);
    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert!(report.fault.is_none());
}

#[test]
fn test_within_threshold_publishes_zero() {
    // Large gains would give a large command if the threshold was ignored
    let mut c = ctrl(Params {
        gain: Axes::from([100.0; 6]),
        ..params()
    });

    let (out, report) = c
        .proc(&input(Some(target(0.015, -0.02, 0.03)), Some(clear_scan())))
        .unwrap();

    assert_eq!(out, Some(Twist::zero()));
    assert_eq!(report.mode, BaseCtrlMode::WithinThreshold);
    assert!(report.within_threshold);
}

#[test]
fn test_within_threshold_checked_before_obstacles() {
    let mut c = ctrl(params());

    let scan = RangeScan::new(vec![0.1; 8], 0.05, 10.0);
    let (out, report) = c
        .proc(&input(Some(target(0.0, 0.0, 0.0)), Some(scan)))
        .unwrap();

    assert_eq!(out, Some(Twist::zero()));
    assert_eq!(report.mode, BaseCtrlMode::WithinThreshold);
    assert!(!report.obstacle_detected);
}

#[test]
fn test_resolver_timeout_fails_safe() {
    let mut c = BaseCtrl::new(params(), SlowResolver).unwrap();

    let start = Instant::now();
    let (out, report) = c
        .proc(&input(Some(target(1.0, 0.0, 0.0)), Some(clear_scan())))
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(out, Some(Twist::zero()));
    assert_eq!(report.mode, BaseCtrlMode::Evaluating);
    assert!(matches!(
        report.fault,
        Some(BaseCtrlFault::PoseError(PoseErrorCalcError::FrameResolution(
            FrameError::Timeout { .. }
        )))
    ));
}

#[test]
fn test_unknown_frame_fails_safe() {
    let mut c = ctrl(params());

    let mut t = target(1.0, 0.0, 0.0);
    t.frame_id = String::from("map");

    let (out, report) = c.proc(&input(Some(t), Some(clear_scan()))).unwrap();

    assert_eq!(out, Some(Twist::zero()));
    assert_eq!(report.mode, BaseCtrlMode::Evaluating);
    assert!(report.fault.is_some());
}

#[test]
fn test_no_scan_is_degraded_mode() {
    let mut c = ctrl(params());

    let (out, report) = c.proc(&input(Some(target(1.0, 0.0, 0.0)), None)).unwrap();

    // The check is skipped and the base still drives
    assert!((out.unwrap().linear_x - 0.65).abs() < 1e-12);
    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert_eq!(report.fault, Some(BaseCtrlFault::SensorStale));
}

#[test]
fn test_synchronised_multi_axis_command() {
    let mut c = ctrl(params());

    let (out, report) = c
        .proc(&input(Some(target(2.0, 0.5, 1.0)), Some(clear_scan())))
        .unwrap();
    let out = out.unwrap();

    // x is the slowest axis at 2.0 / 0.65 s
    let t = 2.0 / 0.65;
    assert!((report.time_to_goal_s.unwrap() - t).abs() < 1e-9);
    assert!((out.linear_x - 0.65).abs() < 1e-9);
    assert!((out.linear_y - 0.5 / t).abs() < 1e-9);
    assert!((out.angular_z - 1.0 / t).abs() < 1e-9);
    assert_eq!(out.linear_z, 0.0);
}

#[test]
fn test_error_source_selection() {
    let resolver = Arc::new(StaticFrameResolver::new());
    resolver.publish(
        "base_footprint",
        "map",
        Isometry3::from_parts(Translation3::new(-0.9, 0.0, 0.0), UnitQuaternion::identity()),
    );

    let mut t = target(1.0, 0.0, 0.0);
    t.frame_id = String::from("map");

    // Untransformed: error is the raw target position, 1.0 m
    let mut c = BaseCtrl::new(params(), resolver.clone()).unwrap();
    let (_, report) = c.proc(&input(Some(t.clone()), Some(clear_scan()))).unwrap();
    assert!((report.error.unwrap().linear_x - 1.0).abs() < 1e-9);
    assert_eq!(report.mode, BaseCtrlMode::Commanding);

    // Transformed: error is 0.1 m, which is still outside the threshold
    let mut c = BaseCtrl::new(
        Params {
            error_source: ErrorSource::Transformed,
            ..params()
        },
        resolver,
    )
    .unwrap();
    let (out, report) = c.proc(&input(Some(t), Some(clear_scan()))).unwrap();
    assert!((report.error.unwrap().linear_x - 0.1).abs() < 1e-9);
    assert!((out.unwrap().linear_x - 0.1).abs() < 1e-9);
}

#[test]
fn test_tick_reads_shared_state() {
    let mut c = ctrl(params());
    let state = c.state();

    assert_eq!(c.tick().0, None);

    state.set_scan(clear_scan());
    state.set_target_pose(target(5.0, 0.0, 0.0));
    state.set_target_pose(target(0.0, -1.0, 0.0));

    let (out, report) = c.tick();
    let out = out.unwrap();

    assert_eq!(report.mode, BaseCtrlMode::Commanding);
    assert_eq!(out.linear_x, 0.0);
    assert!((out.linear_y - -0.6).abs() < 1e-12);

    // Subsequent ticks keep using the last target
    let (out2, _) = c.tick();
    assert_eq!(out2, Some(out));
}

#[test]
fn test_invalid_params_rejected() {
    let mut p = params();
    p.threshold.linear_x = -0.1;

    assert!(BaseCtrl::new(p, StaticFrameResolver::new()).is_err());
}
