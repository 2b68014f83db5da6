//! Multi-frame calibration of the shelf origin plane.

use shelf_scan_core::{normalized_pitch_deg, normalized_roll_deg, EulerAngles, Frame, OriginPlane};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{CalibrationParams, OriginCalculator};

/// Result of feeding one frame to the [`Calibrator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalibrationStatus {
    InvalidPitch,
    InvalidRoll,
    CannotComputeOrigin,
    TooClose,
    InProgress,
    Calibrated(OriginPlane),
}

impl CalibrationStatus {
    /// Operator hint key for a UI layer.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::InvalidPitch => "invalid pitch",
            Self::InvalidRoll => "invalid roll",
            Self::CannotComputeOrigin => "point at shelf",
            Self::TooClose => "move further",
            Self::InProgress => "hold still",
            Self::Calibrated(_) => "calibrated",
        }
    }

    pub fn plane(&self) -> Option<&OriginPlane> {
        match self {
            Self::Calibrated(plane) => Some(plane),
            _ => None,
        }
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated(_))
    }
}

/// Commits to an origin plane after enough consecutive qualifying frames.
///
/// A frame qualifies when the camera is level enough, the origin calculator
/// yields a point and that point is far enough from the camera. A pitch or
/// roll violation restarts the count; the other failures only skip the frame.
pub struct Calibrator {
    params: CalibrationParams,
    origin: Box<dyn OriginCalculator + Send>,
    stable_frames: u32,
    plane: Option<OriginPlane>,
}

impl std::fmt::Debug for Calibrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calibrator")
            .field("params", &self.params)
            .field("stable_frames", &self.stable_frames)
            .field("plane", &self.plane)
            .finish_non_exhaustive()
    }
}

impl Calibrator {
    pub fn new(params: CalibrationParams, origin: Box<dyn OriginCalculator + Send>) -> Self {
        Self {
            params,
            origin,
            stable_frames: 0,
            plane: None,
        }
    }

    #[inline]
    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    #[inline]
    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    /// The committed plane, once calibrated.
    #[inline]
    pub fn plane(&self) -> Option<&OriginPlane> {
        self.plane.as_ref()
    }

    /// Advance the state machine with one frame.
    ///
    /// After the plane has been committed every call returns the same
    /// `Calibrated` status without touching the frame.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(ts = frame.timestamp, stable = self.stable_frames)))]
    pub fn calibrate(&mut self, frame: &Frame) -> CalibrationStatus {
        if let Some(plane) = self.plane {
            return CalibrationStatus::Calibrated(plane);
        }

        let pose = frame.pose();
        let euler = EulerAngles::from_pose(pose);
        let pitch = normalized_pitch_deg(euler.pitch);
        let roll = normalized_roll_deg(euler.roll);
        log::debug!("calibration pose pitch {pitch:.1}° roll {roll:.1}°");

        if pitch.abs() > self.params.max_pitch_deg {
            self.stable_frames = 0;
            return CalibrationStatus::InvalidPitch;
        }
        if roll.abs() > self.params.max_roll_deg {
            self.stable_frames = 0;
            return CalibrationStatus::InvalidRoll;
        }

        let Some(point) = self.origin.compute(frame) else {
            return CalibrationStatus::CannotComputeOrigin;
        };
        let Some(plane) = OriginPlane::upright_facing(&point, &pose.z_axis()) else {
            log::debug!("camera axis is vertical, no upright plane");
            return CalibrationStatus::CannotComputeOrigin;
        };

        let distance = nalgebra::distance(&pose.position(), &point);
        if distance < self.params.min_starting_distance {
            return CalibrationStatus::TooClose;
        }

        self.stable_frames += 1;
        if self.stable_frames < self.params.required_stable_frames {
            return CalibrationStatus::InProgress;
        }

        log::info!(
            "calibrated after {} stable frames, origin at ({:.3}, {:.3}, {:.3}), {distance:.3} m away",
            self.stable_frames,
            point.x,
            point.y,
            point.z
        );
        self.plane = Some(plane);
        CalibrationStatus::Calibrated(plane)
    }

    /// Zero the stable-frame count and drop any committed plane.
    pub fn reset(&mut self) {
        self.stable_frames = 0;
        self.plane = None;
    }

    /// Forget the origin calculator's smoothed state.
    pub fn reset_origin_estimate(&mut self) {
        self.origin.reset();
    }
}
