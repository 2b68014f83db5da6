//! Per-frame sensor bundle delivered by the AR tracking layer.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{FrameImage, Pose};

/// Pinhole intrinsics in pixels, for an image of `width × height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub width: u32,
    pub height: u32,
}

/// Full field-of-view angles in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
    /// Along the image x axis (camera local x).
    pub horizontal: f32,
    /// Along the image y axis (camera local y).
    pub vertical: f32,
}

impl CameraIntrinsics {
    /// `fov = 2·atan(size / (2·f))` per axis.
    pub fn fov(&self) -> FieldOfView {
        FieldOfView {
            horizontal: 2.0 * (self.width as f32 / (2.0 * self.fx)).atan(),
            vertical: 2.0 * (self.height as f32 / (2.0 * self.fy)).atan(),
        }
    }

    /// Pixel coordinates of a camera-space point, or `None` behind the camera.
    ///
    /// Camera space looks along `-z` with `+y` up; pixel `v` grows downwards.
    pub fn project(&self, p_cam: &Point3<f32>) -> Option<(f32, f32)> {
        let depth = -p_cam.z;
        if depth <= 0.0 {
            return None;
        }
        let u = self.fx * p_cam.x / depth + self.cx;
        let v = self.fy * -p_cam.y / depth + self.cy;
        Some((u, v))
    }

    #[inline]
    pub fn contains_pixel(&self, u: f32, v: f32) -> bool {
        u >= 0.0 && u < self.width as f32 && v >= 0.0 && v < self.height as f32
    }
}

/// Tracked camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub pose: Pose,
    pub intrinsics: CameraIntrinsics,
}

impl CameraFrame {
    #[inline]
    pub fn fov(&self) -> FieldOfView {
        self.intrinsics.fov()
    }
}

/// Dense metric depth, row-major `f32` meters. Missing samples are NaN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthMap {
    /// A constant-depth map, mostly useful for tests and replays.
    pub fn uniform(width: usize, height: usize, depth: f32) -> Self {
        Self {
            width,
            height,
            data: vec![depth; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Raw device-motion sample (gravity removed).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// User acceleration in g.
    pub user_acceleration: Vector3<f64>,
    /// Rotation rate in rad/s.
    pub rotation_rate: Vector3<f64>,
}

/// Everything the scanning core sees of one tracked frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds, monotonically increasing.
    pub timestamp: f64,
    pub camera: CameraFrame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_points: Option<Vec<Point3<f32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imu: Option<ImuSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FrameImage>,
}

impl Frame {
    /// A frame carrying only a timestamp and camera state.
    pub fn new(timestamp: f64, camera: CameraFrame) -> Self {
        Self {
            timestamp,
            camera,
            depth: None,
            feature_points: None,
            imu: None,
            image: None,
        }
    }

    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.camera.pose
    }

    /// Feature points that project inside the camera image.
    pub fn points_in_viewport(&self) -> Vec<Point3<f32>> {
        let Some(points) = self.feature_points.as_ref() else {
            return Vec::new();
        };
        let Some(world_to_camera) = self.camera.pose.inverse() else {
            return Vec::new();
        };
        let k = &self.camera.intrinsics;
        points
            .iter()
            .filter(|p| {
                k.project(&world_to_camera.transform_point(p))
                    .is_some_and(|(u, v)| k.contains_pixel(u, v))
            })
            .copied()
            .collect()
    }
}
