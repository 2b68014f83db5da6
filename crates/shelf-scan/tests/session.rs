use std::sync::mpsc;

use nalgebra::Point3;
use shelf_scan::core::{
    CameraFrame, CameraIntrinsics, DepthMap, EulerAngles, Frame, FrameImage, Pose,
};
use shelf_scan::coverage::CoverageOutcome;
use shelf_scan::origin::CalibrationStatus;
use shelf_scan::{CameraSettings, CaptureEvent, DiscardCaptures, ScanConfig, ScanSession, ScanWorker};

/// Portrait camera at `position`, looking at a shelf 1.2 m in front of the
/// world origin. Depth reports the shelf distance at the image center.
fn frame(k: usize, position: Point3<f32>) -> Frame {
    let r = EulerAngles::new(0.0, 0.0, -90f32.to_radians()).to_rotation();
    let camera = CameraFrame {
        pose: Pose::from_parts(&r, &position),
        intrinsics: CameraIntrinsics {
            fx: 1400.0,
            fy: 1400.0,
            cx: 960.0,
            cy: 720.0,
            width: 1920,
            height: 1440,
        },
    };
    let mut f = Frame::new(k as f64 / 32.0, camera);
    f.depth = Some(DepthMap::uniform(256, 192, 1.2 + position.z));
    f.image = FrameImage::new(8, 4, vec![128; 8 * 4 * 3]);
    f
}

fn config() -> ScanConfig {
    ScanConfig {
        camera: CameraSettings {
            lower_save_resolution: false,
            ..CameraSettings::default()
        },
        ..ScanConfig::default()
    }
}

fn calibrated_session() -> ScanSession {
    let mut session = ScanSession::new(config(), true).expect("session");
    for k in 0..30 {
        session.process_frame(&frame(k, Point3::origin()), &mut DiscardCaptures);
    }
    assert!(session.plane().is_some());
    session
}

#[test]
fn calibrates_then_captures_new_coverage() {
    let mut session = ScanSession::new(config(), true).expect("session");
    session.start_scanning();
    let mut captures: Vec<CaptureEvent> = Vec::new();

    for k in 0..29 {
        let report = session.process_frame(&frame(k, Point3::origin()), &mut captures);
        assert_eq!(report.calibration, Some(CalibrationStatus::InProgress), "frame {k}");
        assert_eq!(report.hint(), Some("hold still"));
    }
    let report = session.process_frame(&frame(29, Point3::origin()), &mut captures);
    let plane = report
        .calibration
        .as_ref()
        .and_then(CalibrationStatus::plane)
        .expect("calibrated on frame 29");
    approx::assert_relative_eq!(plane.origin().z, -1.2, epsilon = 1e-4);
    assert!(report.coverage.is_none());
    assert!(captures.is_empty());

    let report = session.process_frame(&frame(30, Point3::origin()), &mut captures);
    assert!(report.captured());
    assert_eq!(captures.len(), 1);
    let event = &captures[0];
    assert_eq!(event.frame_number, 30);
    assert_eq!(event.image_count, 1);
    assert_eq!(event.cells.len(), 15);
    assert_eq!(event.metadata.frame_number, 30);
    assert_eq!(event.metadata.img_count, 1);
    assert_eq!(event.metadata.origin_capture_transform, event.metadata.origin_done_transform);
    assert!(event.image.is_some());
    assert_eq!(event.metadata.image_width * event.metadata.image_height, 32);

    let report = session.process_frame(&frame(31, Point3::origin()), &mut captures);
    assert_eq!(
        report.coverage,
        Some(CoverageOutcome::Insufficient {
            qualifying: 15,
            new: 0
        })
    );
    assert_eq!(captures.len(), 1);
    assert_eq!(session.image_count(), 1);
    assert_eq!(session.frame_number(), 32);
}

#[test]
fn coverage_waits_for_start_scanning() {
    let mut session = calibrated_session();
    let mut captures: Vec<CaptureEvent> = Vec::new();

    let report = session.process_frame(&frame(30, Point3::origin()), &mut captures);
    assert!(report.calibration.is_none());
    assert!(report.coverage.is_none());

    session.start_scanning();
    assert!(session
        .process_frame(&frame(31, Point3::origin()), &mut captures)
        .captured());

    session.stop_scanning();
    let step = session.coverage().expect("engine").lattice().spacing();
    let report = session.process_frame(&frame(32, Point3::new(step, 0.0, 0.0)), &mut captures);
    assert!(report.coverage.is_none());
    assert_eq!(captures.len(), 1);
}

#[test]
fn rejected_frame_reports_operator_hint() {
    let mut session = calibrated_session();
    session.start_scanning();
    let report = session.process_frame(&frame(30, Point3::new(0.0, 0.0, -1.0)), &mut DiscardCaptures);
    assert_eq!(
        report.coverage.as_ref().and_then(CoverageOutcome::rejection),
        Some(shelf_scan::coverage::GateRejection::TooClose)
    );
    assert!(report.hint().is_some());
}

#[test]
fn reset_requires_recalibration() {
    let mut session = calibrated_session();
    session.start_scanning();
    session.process_frame(&frame(30, Point3::origin()), &mut DiscardCaptures);
    assert_eq!(session.coverage().map(|c| c.covered().len()), Some(15));

    session.reset();
    assert!(session.plane().is_none());
    assert!(session.coverage().is_none());
    let report = session.process_frame(&frame(31, Point3::origin()), &mut DiscardCaptures);
    assert_eq!(report.calibration, Some(CalibrationStatus::InProgress));
    assert_eq!(session.frame_number(), 32);
}

#[test]
fn worker_processes_frames_in_order() {
    let session = ScanSession::new(config(), true).expect("session");
    let (capture_tx, capture_rx) = mpsc::channel();
    let worker = ScanWorker::spawn(session, capture_tx).expect("spawn");

    worker.start_scanning().expect("send");
    for k in 0..32 {
        worker.submit(frame(k, Point3::origin())).expect("send");
    }

    let numbers: Vec<u64> = (0..32)
        .map(|_| worker.reports().recv().expect("report").frame_number)
        .collect();
    assert_eq!(numbers, (0..32).collect::<Vec<u64>>());

    let session = worker.finish().expect("worker thread");
    assert_eq!(session.frame_number(), 32);
    assert_eq!(session.image_count(), 1);

    let captures: Vec<CaptureEvent> = capture_rx.try_iter().collect();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].frame_number, 30);
}
