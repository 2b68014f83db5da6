use nalgebra::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use shelf_scan_core::{ImuSample, Pose};

/// Interval the velocity estimates are normalized by, regardless of the
/// actual frame spacing.
pub const NOMINAL_UPDATE_INTERVAL: f32 = 1.0 / 60.0;

/// Instantaneous kinematics of the handheld camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Magnitude of the IMU user acceleration.
    pub acceleration: f64,
    /// Magnitude of the IMU rotation rate.
    pub angular_acceleration: f64,
    /// Tracked position delta over [`NOMINAL_UPDATE_INTERVAL`], m/s.
    pub velocity: f32,
    /// Tracked orientation delta over [`NOMINAL_UPDATE_INTERVAL`], rad/s.
    pub angular_velocity: f32,
}

/// Rolling kinematic state from consecutive poses and IMU samples.
#[derive(Clone, Debug, Default)]
pub struct MotionTracker {
    last_position: Option<Point3<f32>>,
    last_rotation: Option<UnitQuaternion<f32>>,
    state: MotionState,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Advance with the current frame's pose and device-motion sample.
    ///
    /// Without an IMU sample the tracker resets and restarts from this pose.
    pub fn update(&mut self, pose: &Pose, imu: Option<&ImuSample>) -> &MotionState {
        let position = pose.position();
        let rotation = pose.quaternion();

        match imu {
            None => {
                log::debug!("no device motion sample, resetting motion state");
                self.reset();
            }
            Some(imu) => {
                self.state.acceleration = imu.user_acceleration.norm();
                self.state.angular_acceleration = imu.rotation_rate.norm();

                if let Some(last) = self.last_position {
                    self.state.velocity =
                        nalgebra::distance(&last, &position) / NOMINAL_UPDATE_INTERVAL;
                }
                if let Some(last) = self.last_rotation {
                    self.state.angular_velocity =
                        quaternion_angle(&last, &rotation) / NOMINAL_UPDATE_INTERVAL;
                }
            }
        }

        self.last_position = Some(position);
        self.last_rotation = Some(rotation);
        &self.state
    }

    /// Drop the previous pose and zero all signals.
    pub fn reset(&mut self) {
        self.last_position = None;
        self.last_rotation = None;
        self.state = MotionState::default();
    }
}

/// `2·acos(|a·b|)`, the rotation angle between two orientations.
fn quaternion_angle(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
    let dot = a.coords.dot(&b.coords).abs().clamp(-1.0, 1.0);
    2.0 * dot.acos()
}
