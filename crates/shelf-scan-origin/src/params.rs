use serde::{Deserialize, Serialize};

use crate::OriginStrategy;

/// Depth-map sampling parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthParams {
    /// Physical radius of the sampled disk around the image center, meters.
    pub sample_radius: f32,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            sample_radius: 0.03,
        }
    }
}

/// Feature-point ray sampling and smoothing parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRayParams {
    /// Max perpendicular distance of a point from the view ray, meters.
    pub ray_radius: f32,
    /// Length of the view-ray segment points are matched against, meters.
    pub ray_length: f32,
    /// Fewer nearby points than this yields no new sample.
    pub min_nearby_points: usize,
    /// Fraction of nearby points skipped, and then averaged, by depth order.
    pub slice_fraction: f64,
    /// Lower clamp of the blend weight.
    pub min_blend: f32,
    /// New samples closer to the camera than either distance are ignored.
    pub min_starting_distance: f32,
    pub min_detection_distance: f32,
}

impl Default for FeatureRayParams {
    fn default() -> Self {
        Self {
            ray_radius: 0.2,
            ray_length: 2.5,
            min_nearby_points: 10,
            slice_fraction: 0.05,
            min_blend: 0.01,
            min_starting_distance: 0.3,
            min_detection_distance: 0.3,
        }
    }
}

/// Origin estimation configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginParams {
    pub strategy: OriginStrategy,
    pub depth: DepthParams,
    pub feature: FeatureRayParams,
}

/// Calibration gate configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Max absolute camera pitch, degrees.
    pub max_pitch_deg: f32,
    /// Max absolute camera roll (portrait-normalized), degrees.
    pub max_roll_deg: f32,
    /// Candidates closer to the camera than this are rejected, meters.
    pub min_starting_distance: f32,
    /// Consecutive qualifying frames needed to commit a plane.
    pub required_stable_frames: u32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            max_pitch_deg: 35.0,
            max_roll_deg: 20.0,
            min_starting_distance: 0.3,
            required_stable_frames: 30,
        }
    }
}
