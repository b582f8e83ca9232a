//! # Control Tick Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use base_ctrl_lib::{
    coordinator::{BaseCtrl, InputData, Params},
    frame::StaticFrameResolver,
    pose::Pose,
    pose_error::ErrorSource,
    scan::RangeScan,
};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use util::module::State;

fn tick_benchmark(c: &mut Criterion) {
    // ---- Build the controller and inputs ----

    // Laser mounted in front of the base, target given in the laser frame
    let resolver = StaticFrameResolver::new();
    resolver.publish(
        "base_footprint",
        "base_laser",
        Isometry3::from_parts(Translation3::new(0.2, 0.0, 0.1), UnitQuaternion::identity()),
    );

    let params = Params {
        error_source: ErrorSource::Transformed,
        ..Params::default()
    };

    let mut base_ctrl = BaseCtrl::new(params, resolver).unwrap();

    // A typical 720 sample scan with some invalid readings
    let ranges: Vec<f32> = (0..720)
        .map(|i| match i % 97 {
            0 => std::f32::NAN,
            1 => std::f32::INFINITY,
            _ => 2.0 + (i as f32 * 0.01).sin(),
        })
        .collect();

    let input = InputData {
        target_pose: Some(Pose::new(
            Vector3::new(1.5, -0.4, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.8),
            "base_laser",
        )),
        scan: Some(RangeScan::new(ranges, 0.05, 10.0)),
    };

    // ---- Benchmark ----

    c.bench_function("control tick", |b| {
        b.iter(|| base_ctrl.proc(black_box(&input)))
    });
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
