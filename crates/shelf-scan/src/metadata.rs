//! Metadata stored alongside every captured image.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use shelf_scan_core::{CameraIntrinsics, Frame, OriginPlane};
use shelf_scan_motion::{FpsStats, MotionState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: u32,
    pub y: u32,
}

/// Camera calibration attached to a capture, in portrait orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    pub focal_length: Vec2,
    pub principal_point: Vec2,
    /// Portrait resolution: `x` is the sensor height, `y` the sensor width.
    pub resolution: Resolution,
}

impl From<&CameraIntrinsics> for CameraInfo {
    fn from(k: &CameraIntrinsics) -> Self {
        Self {
            focal_length: Vec2 {
                x: k.fx as f64,
                y: k.fy as f64,
            },
            principal_point: Vec2 {
                x: k.cx as f64,
                y: k.cy as f64,
            },
            resolution: Resolution {
                x: k.height,
                y: k.width,
            },
        }
    }
}

/// Per-capture record in the upload payload layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// [`CameraInfo`] serialized as a JSON string.
    pub camera_info: String,
    pub camera_transform_before: String,
    pub camera_transform_before_original: String,
    pub camera_transform_after: String,
    pub origin_capture_transform: String,
    pub origin_done_transform: String,
    /// Frame timestamp, seconds, as text.
    pub timestamp: String,
    /// Wall-clock capture time, unix seconds.
    pub time: f64,
    pub frame_number: u64,
    pub img_count: u64,
    pub save_button_used: bool,
    pub image_width: u32,
    pub image_height: u32,
    pub average_fps: f64,
    pub min_fps: f64,
    pub velocity: f64,
    pub angular_velocity: f64,
    pub acceleration: f64,
    pub angular_acceleration: f64,
    pub frame_results: Vec<serde_json::Value>,
    /// Feature points inside the image, `"x y z"` each.
    pub point_cloud: Vec<String>,
}

/// Inputs for [`ImageMetadata::build`] beyond the frame itself.
#[derive(Clone, Copy, Debug)]
pub struct CaptureContext<'a> {
    pub plane: &'a OriginPlane,
    pub frame_number: u64,
    pub image_count: u64,
    pub image_size: (u32, u32),
    pub fps: FpsStats,
    pub motion: MotionState,
}

impl ImageMetadata {
    pub fn build(frame: &Frame, ctx: &CaptureContext<'_>) -> Self {
        let camera_info = serde_json::to_string(&CameraInfo::from(&frame.camera.intrinsics))
            .unwrap_or_default();
        let camera = frame.pose().to_pose_string();
        let origin = ctx.plane.pose().to_pose_string();
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        Self {
            camera_info,
            camera_transform_before: camera.clone(),
            camera_transform_before_original: camera,
            camera_transform_after: String::new(),
            origin_capture_transform: origin.clone(),
            origin_done_transform: origin,
            timestamp: frame.timestamp.to_string(),
            time,
            frame_number: ctx.frame_number,
            img_count: ctx.image_count,
            save_button_used: false,
            image_width: ctx.image_size.0,
            image_height: ctx.image_size.1,
            average_fps: ctx.fps.average as f64,
            min_fps: ctx.fps.lowest as f64,
            velocity: ctx.motion.velocity as f64,
            angular_velocity: ctx.motion.angular_velocity as f64,
            acceleration: ctx.motion.acceleration,
            angular_acceleration: ctx.motion.angular_acceleration,
            frame_results: Vec::new(),
            point_cloud: frame
                .points_in_viewport()
                .iter()
                .map(|p| format!("{} {} {}", p.x, p.y, p.z))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use shelf_scan_core::{CameraFrame, Pose};

    #[test]
    fn payload_uses_upload_key_names() {
        let intrinsics = CameraIntrinsics {
            fx: 1400.0,
            fy: 1400.0,
            cx: 960.0,
            cy: 720.0,
            width: 1920,
            height: 1440,
        };
        let mut frame = Frame::new(
            12.5,
            CameraFrame {
                pose: Pose::identity(),
                intrinsics,
            },
        );
        frame.feature_points = Some(vec![Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0)]);
        let plane = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, -1.0), &Vector3::z())
            .expect("plane");
        let ctx = CaptureContext {
            plane: &plane,
            frame_number: 42,
            image_count: 3,
            image_size: (720, 960),
            fps: FpsStats {
                average: 30,
                highest: 31,
                lowest: 28,
            },
            motion: MotionState::default(),
        };

        let meta = ImageMetadata::build(&frame, &ctx);
        assert_eq!(meta.point_cloud, vec!["0 0 -1".to_string()]);
        assert_eq!(meta.camera_transform_before, "0.000000,0.000000,0.000000^0.000000,0.000000,0.000000,1.000000");
        assert_eq!(meta.origin_capture_transform, meta.origin_done_transform);
        assert!(meta.origin_capture_transform.starts_with("0.000000,0.000000,-1.000000^"));

        let json = serde_json::to_value(&meta).expect("json");
        for key in ["cameraInfo", "imgCount", "saveButtonUsed", "minFps", "pointCloud", "frameResults"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["frameNumber"], 42);
        assert_eq!(json["timestamp"], "12.5");

        let info: CameraInfo = serde_json::from_str(&meta.camera_info).expect("camera info");
        assert_eq!(info.resolution, Resolution { x: 1440, y: 1920 });
    }
}
