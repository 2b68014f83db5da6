//! Per-frame driver tying calibration, motion, frame rate and coverage
//! together.

use shelf_scan_core::{Frame, OriginPlane};
use shelf_scan_coverage::{CoverageEngine, CoverageOutcome, GridCell};
use shelf_scan_motion::{FpsCounter, LowFpsWarning, MotionState, MotionTracker};
use shelf_scan_origin::{CalibrationStatus, Calibrator};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::capture::{prepare_image, CaptureEvent, CaptureSink, ImageOptions};
use crate::metadata::{CaptureContext, ImageMetadata};
use crate::{ConfigError, ScanConfig};

/// What happened to one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame_number: u64,
    /// Set while the session is still calibrating.
    pub calibration: Option<CalibrationStatus>,
    /// Set once calibrated and scanning.
    pub coverage: Option<CoverageOutcome>,
    pub low_fps: Option<LowFpsWarning>,
}

impl FrameReport {
    #[inline]
    pub fn captured(&self) -> bool {
        self.coverage.as_ref().is_some_and(CoverageOutcome::is_capture)
    }

    /// Operator hint for this frame, if any.
    pub fn hint(&self) -> Option<&'static str> {
        if let Some(status) = &self.calibration {
            return Some(status.hint());
        }
        self.coverage
            .as_ref()
            .and_then(CoverageOutcome::rejection)
            .map(|r| r.hint())
    }
}

/// One scanning session: calibrate once, then track coverage.
///
/// Frames must be delivered in order from a single thread of control; see
/// [`crate::ScanWorker`] for a queued variant.
#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    calibrator: Calibrator,
    motion: MotionTracker,
    fps: FpsCounter,
    coverage: Option<CoverageEngine>,
    scanning: bool,
    frame_number: u64,
    image_count: u64,
}

impl ScanSession {
    /// `depth_supported` resolves an `auto` origin strategy.
    pub fn new(config: ScanConfig, depth_supported: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = config
            .origin
            .strategy
            .build(&config.origin_params(), depth_supported);
        Ok(Self {
            calibrator: Calibrator::new(config.calibration_params(), origin),
            motion: MotionTracker::new(),
            fps: FpsCounter::new(config.fps_params()),
            coverage: None,
            scanning: false,
            frame_number: 0,
            image_count: 0,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[inline]
    pub fn plane(&self) -> Option<&OriginPlane> {
        self.coverage.as_ref().map(CoverageEngine::plane)
    }

    #[inline]
    pub fn coverage(&self) -> Option<&CoverageEngine> {
        self.coverage.as_ref()
    }

    #[inline]
    pub fn motion(&self) -> &MotionState {
        self.motion.state()
    }

    #[inline]
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    #[inline]
    pub fn image_count(&self) -> u64 {
        self.image_count
    }

    #[inline]
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Enable coverage tracking; takes effect once calibrated.
    pub fn start_scanning(&mut self) {
        self.scanning = true;
    }

    pub fn stop_scanning(&mut self) {
        self.scanning = false;
    }

    /// Process one frame. Captures are handed to `sink` as they happen.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(frame = self.frame_number)))]
    pub fn process_frame(&mut self, frame: &Frame, sink: &mut dyn CaptureSink) -> FrameReport {
        let low_fps = self.fps.update(frame.timestamp);
        let motion = *self.motion.update(frame.pose(), frame.imu.as_ref());
        let frame_number = self.frame_number;
        self.frame_number += 1;

        let mut report = FrameReport {
            frame_number,
            calibration: None,
            coverage: None,
            low_fps,
        };

        let Some(engine) = self.coverage.as_mut() else {
            let status = self.calibrator.calibrate(frame);
            if let CalibrationStatus::Calibrated(plane) = status {
                log::info!("origin calibrated at frame {frame_number}");
                self.coverage = Some(CoverageEngine::new(plane, self.config.coverage_params()));
            }
            report.calibration = Some(status);
            return report;
        };
        if !self.scanning {
            return report;
        }

        let outcome = engine.process(&frame.camera, &motion);
        let plane = *engine.plane();
        if let CoverageOutcome::Capture { cells, .. } = &outcome {
            self.image_count += 1;
            let event = self.capture_event(frame, &plane, frame_number, cells.clone(), motion);
            sink.on_capture(event);
        }
        report.coverage = Some(outcome);
        report
    }

    fn capture_event(
        &self,
        frame: &Frame,
        plane: &OriginPlane,
        frame_number: u64,
        cells: Vec<GridCell>,
        motion: MotionState,
    ) -> CaptureEvent {
        let cam = &self.config.camera;
        let image = frame.image.as_ref().and_then(|img| {
            prepare_image(
                img,
                ImageOptions {
                    lower_resolution: cam.lower_save_resolution,
                    target_width: cam.save_resolution_width,
                },
            )
        });
        let image_size = image.as_ref().map_or((0, 0), |i| (i.width, i.height));

        let metadata = ImageMetadata::build(
            frame,
            &CaptureContext {
                plane,
                frame_number,
                image_count: self.image_count,
                image_size,
                fps: self.fps.stats(),
                motion,
            },
        );

        CaptureEvent {
            frame_number,
            image_count: self.image_count,
            timestamp: frame.timestamp,
            cells,
            image,
            metadata,
        }
    }

    /// Drop calibration, origin smoothing, the plane and all coverage.
    ///
    /// Frame and image counters keep running.
    pub fn reset(&mut self) {
        log::info!("session reset at frame {}", self.frame_number);
        self.calibrator.reset();
        self.calibrator.reset_origin_estimate();
        self.motion.reset();
        self.coverage = None;
    }
}
