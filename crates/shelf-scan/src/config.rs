//! Settings snapshot for a scanning session.
//!
//! Key names follow the settings payload served to devices (camelCase). A
//! settings document may be partial: every section it names replaces only
//! the keys it lists, everything else keeps its default.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_scan_coverage::{CoverageParams, GateParams, DEFAULT_OVERLAP_FACTOR};
use shelf_scan_motion::FpsParams;
use shelf_scan_origin::{
    CalibrationParams, DepthParams, FeatureRayParams, OriginParams, OriginStrategy,
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Capture gating and image settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraSettings {
    /// Degrees.
    pub capture_angle_pitch: f64,
    pub capture_angle_yaw: f64,
    pub capture_angle_roll: f64,
    /// Meters.
    pub shelf_coverage_cells_size: f64,
    pub shelf_coverage_min_ratio: f64,
    pub lower_save_resolution: bool,
    pub save_resolution_width: u32,
    pub too_close_to_shelf_warning: bool,
    pub too_far_to_shelf_warning: bool,
    pub motion_speed_warning: bool,
    pub max_motion_acceleration_speed: f64,
    pub max_motion_angular_acceleration_speed: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            capture_angle_pitch: 35.0,
            capture_angle_yaw: 35.0,
            capture_angle_roll: 20.0,
            shelf_coverage_cells_size: 0.25,
            shelf_coverage_min_ratio: 0.25,
            lower_save_resolution: true,
            save_resolution_width: 720,
            too_close_to_shelf_warning: true,
            too_far_to_shelf_warning: true,
            motion_speed_warning: true,
            max_motion_acceleration_speed: 0.2,
            max_motion_angular_acceleration_speed: 4.0,
        }
    }
}

/// Shelf distance bounds, meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisionSettings {
    pub min_starting_distance: f64,
    pub min_detection_distance: f64,
    pub max_detection_distance: f64,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            min_starting_distance: 0.3,
            min_detection_distance: 0.3,
            max_detection_distance: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FpsSettings {
    pub frame_range: usize,
    pub max_acceptable_fps: i32,
}

impl Default for FpsSettings {
    fn default() -> Self {
        let p = FpsParams::default();
        Self {
            frame_range: p.window,
            max_acceptable_fps: p.low_fps_threshold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OriginSettings {
    pub strategy: OriginStrategy,
    pub required_stable_frames: u32,
    /// Meters.
    pub depth_sample_radius: f32,
    pub feature_ray_radius: f32,
    pub feature_ray_length: f32,
}

impl Default for OriginSettings {
    fn default() -> Self {
        let depth = DepthParams::default();
        let feature = FeatureRayParams::default();
        Self {
            strategy: OriginStrategy::Auto,
            required_stable_frames: CalibrationParams::default().required_stable_frames,
            depth_sample_radius: depth.sample_radius,
            feature_ray_radius: feature.ray_radius,
            feature_ray_length: feature.ray_length,
        }
    }
}

/// Immutable settings for one scanning session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanConfig {
    pub camera: CameraSettings,
    pub vision: VisionSettings,
    pub fps: FpsSettings,
    pub origin: OriginSettings,
}

impl ScanConfig {
    /// Parse a possibly partial settings document over the defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let overrides: Value = serde_json::from_str(raw)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge_sections(&mut merged, overrides)?;
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a settings document from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write the full settings as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine treats as programming errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        for (key, v) in [
            ("captureAnglePitch", c.capture_angle_pitch),
            ("captureAngleYaw", c.capture_angle_yaw),
            ("captureAngleRoll", c.capture_angle_roll),
        ] {
            if !(0.0..=180.0).contains(&v) {
                return Err(ConfigError::invalid(key, format!("{v} is not in [0, 180]")));
            }
        }
        if !(c.shelf_coverage_cells_size.is_finite() && c.shelf_coverage_cells_size > 0.0) {
            return Err(ConfigError::invalid(
                "shelfCoverageCellsSize",
                format!("{} must be positive", c.shelf_coverage_cells_size),
            ));
        }
        if !(0.0..=1.0).contains(&c.shelf_coverage_min_ratio) {
            return Err(ConfigError::invalid(
                "shelfCoverageMinRatio",
                format!("{} is not in [0, 1]", c.shelf_coverage_min_ratio),
            ));
        }
        if c.save_resolution_width == 0 {
            return Err(ConfigError::invalid("saveResolutionWidth", "must be positive"));
        }

        let v = &self.vision;
        for (key, d) in [
            ("minStartingDistance", v.min_starting_distance),
            ("minDetectionDistance", v.min_detection_distance),
            ("maxDetectionDistance", v.max_detection_distance),
        ] {
            if !(d.is_finite() && d >= 0.0) {
                return Err(ConfigError::invalid(key, format!("{d} must be non-negative")));
            }
        }
        if v.max_detection_distance < v.min_detection_distance {
            return Err(ConfigError::invalid(
                "maxDetectionDistance",
                "must not be below minDetectionDistance",
            ));
        }

        if self.fps.frame_range == 0 {
            return Err(ConfigError::invalid("frameRange", "must be positive"));
        }
        let o = &self.origin;
        for (key, r) in [
            ("depthSampleRadius", o.depth_sample_radius),
            ("featureRayRadius", o.feature_ray_radius),
            ("featureRayLength", o.feature_ray_length),
        ] {
            if !(r.is_finite() && r > 0.0) {
                return Err(ConfigError::invalid(key, format!("{r} must be positive")));
            }
        }
        if o.required_stable_frames == 0 {
            return Err(ConfigError::invalid("requiredStableFrames", "must be positive"));
        }
        Ok(())
    }

    pub fn calibration_params(&self) -> CalibrationParams {
        CalibrationParams {
            max_pitch_deg: self.camera.capture_angle_pitch as f32,
            max_roll_deg: self.camera.capture_angle_roll as f32,
            min_starting_distance: self.vision.min_starting_distance as f32,
            required_stable_frames: self.origin.required_stable_frames,
        }
    }

    pub fn origin_params(&self) -> OriginParams {
        OriginParams {
            strategy: self.origin.strategy,
            depth: DepthParams {
                sample_radius: self.origin.depth_sample_radius,
            },
            feature: FeatureRayParams {
                ray_radius: self.origin.feature_ray_radius,
                ray_length: self.origin.feature_ray_length,
                min_starting_distance: self.vision.min_starting_distance as f32,
                min_detection_distance: self.vision.min_detection_distance as f32,
                ..FeatureRayParams::default()
            },
        }
    }

    pub fn coverage_params(&self) -> CoverageParams {
        let c = &self.camera;
        let v = &self.vision;
        CoverageParams {
            cell_size: c.shelf_coverage_cells_size as f32,
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
            min_ratio: c.shelf_coverage_min_ratio,
            gate: GateParams {
                max_pitch_deg: c.capture_angle_pitch as f32,
                max_yaw_deg: c.capture_angle_yaw as f32,
                max_roll_deg: c.capture_angle_roll as f32,
                min_starting_distance: v.min_starting_distance as f32,
                min_detection_distance: v.min_detection_distance as f32,
                max_detection_distance: v.max_detection_distance as f32,
                check_too_close: c.too_close_to_shelf_warning,
                check_too_far: c.too_far_to_shelf_warning,
                check_motion: c.motion_speed_warning,
                max_acceleration: c.max_motion_acceleration_speed,
                max_angular_acceleration: c.max_motion_angular_acceleration_speed,
            },
        }
    }

    pub fn fps_params(&self) -> FpsParams {
        FpsParams {
            window: self.fps.frame_range,
            low_fps_threshold: self.fps.max_acceptable_fps,
        }
    }
}

/// Merge `overrides` into `base`, descending one level into sections.
fn merge_sections(base: &mut Value, overrides: Value) -> Result<(), ConfigError> {
    let Value::Object(overrides) = overrides else {
        return Err(ConfigError::invalid(
            "settings",
            "document must be a JSON object",
        ));
    };
    let Value::Object(base) = base else {
        return Ok(());
    };
    for (key, value) in overrides {
        if let (Some(Value::Object(section)), Value::Object(fields)) = (base.get_mut(&key), &value) {
            section.extend(fields.clone());
            continue;
        }
        base.insert(key, value);
    }
    Ok(())
}
