use serde::{Deserialize, Serialize};

/// Cells are spaced a little wider than their nominal size.
pub const DEFAULT_OVERLAP_FACTOR: f32 = 1.1;

/// Per-frame pose, motion and distance limits for coverage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GateParams {
    /// Max camera angles relative to the plane, degrees.
    pub max_pitch_deg: f32,
    pub max_yaw_deg: f32,
    pub max_roll_deg: f32,
    /// Perpendicular camera-to-plane distance limits, meters.
    pub min_starting_distance: f32,
    pub min_detection_distance: f32,
    pub max_detection_distance: f32,
    pub check_too_close: bool,
    pub check_too_far: bool,
    /// Motion limits (IMU acceleration magnitude, rotation-rate magnitude).
    pub check_motion: bool,
    pub max_acceleration: f64,
    pub max_angular_acceleration: f64,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            max_pitch_deg: 35.0,
            max_yaw_deg: 35.0,
            max_roll_deg: 20.0,
            min_starting_distance: 0.3,
            min_detection_distance: 0.3,
            max_detection_distance: 2.0,
            check_too_close: true,
            check_too_far: true,
            check_motion: true,
            max_acceleration: 0.2,
            max_angular_acceleration: 4.0,
        }
    }
}

/// Coverage grid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageParams {
    /// Nominal cell edge, meters.
    pub cell_size: f32,
    pub overlap_factor: f32,
    /// Share of qualifying cells that must be new to trigger a capture.
    pub min_ratio: f64,
    pub gate: GateParams,
}

impl Default for CoverageParams {
    fn default() -> Self {
        Self {
            cell_size: 0.25,
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
            min_ratio: 0.25,
            gate: GateParams::default(),
        }
    }
}

impl CoverageParams {
    /// Lattice spacing, `cell_size * overlap_factor`.
    #[inline]
    pub fn spacing(&self) -> f32 {
        self.cell_size * self.overlap_factor
    }
}
