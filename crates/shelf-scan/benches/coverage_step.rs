//! Per-frame cost of the coverage decision and the full session step.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use shelf_scan::core::{CameraFrame, CameraIntrinsics, EulerAngles, Frame, OriginPlane, Pose};
use shelf_scan::coverage::{CoverageEngine, CoverageParams};
use shelf_scan::motion::MotionState;
use shelf_scan::{DiscardCaptures, ScanConfig, ScanSession};

fn camera(x: f32, y: f32) -> CameraFrame {
    let r = EulerAngles::new(0.0, 0.0, -90f32.to_radians()).to_rotation();
    CameraFrame {
        pose: Pose::from_parts(&r, &Point3::new(x, y, 0.0)),
        intrinsics: CameraIntrinsics {
            fx: 1400.0,
            fy: 1400.0,
            cx: 960.0,
            cy: 720.0,
            width: 1920,
            height: 1440,
        },
    }
}

/// Sweep along a 4 m shelf at 1.2 m.
fn sweep(n: usize) -> Vec<CameraFrame> {
    (0..n)
        .map(|k| camera(k as f32 * 4.0 / n as f32, 0.0))
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let Some(plane) = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, -1.2), &Vector3::z())
    else {
        return;
    };
    let mut group = c.benchmark_group("coverage_engine");
    for cell_size in [0.25f32, 0.1, 0.05] {
        let frames = sweep(120);
        group.bench_with_input(
            BenchmarkId::new("sweep_120", cell_size),
            &cell_size,
            |b, &cell_size| {
                let params = CoverageParams {
                    cell_size,
                    ..CoverageParams::default()
                };
                b.iter(|| {
                    let mut engine = CoverageEngine::new(plane, params.clone());
                    for cam in &frames {
                        black_box(engine.process(cam, &MotionState::default()));
                    }
                    engine.covered().len()
                });
            },
        );
    }
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let Ok(mut session) = ScanSession::new(ScanConfig::default(), false) else {
        return;
    };
    session.start_scanning();
    let frame = Frame::new(0.0, camera(0.0, 0.0));
    c.bench_function("session_calibrating_frame", |b| {
        b.iter(|| black_box(session.process_frame(&frame, &mut DiscardCaptures)));
    });
}

criterion_group!(benches, bench_engine, bench_session);
criterion_main!(benches);
