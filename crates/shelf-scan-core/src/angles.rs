//! Angle extraction for pose-validity checks.
//!
//! Camera orientation is decomposed in the AR tracking convention
//! `R = Ry(yaw) · Rx(pitch) · Rz(roll)`. The capture device is held in
//! portrait while the sensor frame is landscape, so a level handheld camera
//! reports a raw roll of -90°; [`normalized_roll_deg`] maps that to 0°.

use nalgebra::{Matrix3, Rotation3, Vector3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::{OriginPlane, Pose};

/// Euler angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Decompose a rotation matrix as `Ry(yaw) · Rx(pitch) · Rz(roll)`.
    pub fn from_rotation(r: &Matrix3<f32>) -> Self {
        let pitch = (-r[(1, 2)]).clamp(-1.0, 1.0).asin();
        let yaw = r[(0, 2)].atan2(r[(2, 2)]);
        let roll = r[(1, 0)].atan2(r[(1, 1)]);
        Self { pitch, yaw, roll }
    }

    pub fn from_pose(pose: &Pose) -> Self {
        Self::from_rotation(&pose.rotation_matrix())
    }

    /// Inverse of [`EulerAngles::from_rotation`].
    pub fn to_rotation(&self) -> Matrix3<f32> {
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), self.roll);
        (ry * rx * rz).into_inner()
    }
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let w = a.rem_euclid(TAU);
    if w > PI {
        w - TAU
    } else {
        w
    }
}

/// Signed pitch in degrees, shifted by half a turn past `π/2`.
#[inline]
pub fn normalized_pitch_deg(pitch: f32) -> f32 {
    let p = if pitch > FRAC_PI_2 { pitch - PI } else { pitch };
    p.to_degrees()
}

/// Signed roll in degrees for a portrait-held device, folded into `[-90°, 90°]`.
///
/// Upside-down portrait folds onto upright portrait.
#[inline]
pub fn normalized_roll_deg(roll: f32) -> f32 {
    let r = wrap_angle(roll + FRAC_PI_2);
    let r = if r > FRAC_PI_2 {
        r - PI
    } else if r < -FRAC_PI_2 {
        r + PI
    } else {
        r
    };
    r.to_degrees()
}

/// Absolute camera angles relative to a plane, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneAngles {
    /// Tilt of the view ray along the plane's vertical axis.
    pub pitch_deg: f32,
    /// Tilt of the view ray along the plane's horizontal axis.
    pub yaw_deg: f32,
    /// Rotation about the view ray against the plane's up axis.
    pub roll_deg: f32,
}

/// Orientation of `camera` relative to `plane`.
///
/// Pitch and yaw are measured between the camera's view ray and the plane
/// normal, roll between the camera's image-up and the plane's up axis (with
/// the portrait normalization of [`normalized_roll_deg`]). A camera squarely
/// facing the plane reads `(0, 0, 0)` regardless of which side of the plane
/// the normal points to.
pub fn camera_angles_to_plane(plane: &OriginPlane, camera: &Pose) -> PlaneAngles {
    let v = plane.to_local_vector(&camera.forward());
    let v = v.try_normalize(1e-9).unwrap_or(v);
    let pitch_deg = v.y.clamp(-1.0, 1.0).asin().to_degrees().abs();
    let yaw_deg = v.x.atan2(v.z.abs()).to_degrees().abs();

    let up_in_camera = camera.rotation_matrix().transpose() * plane.pose().y_axis();
    let roll_deg = normalized_roll_deg(up_in_camera.x.atan2(up_in_camera.y)).abs();

    PlaneAngles {
        pitch_deg,
        yaw_deg,
        roll_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn portrait(pitch_deg: f32, yaw_deg: f32, roll_deg: f32) -> Pose {
        let r = EulerAngles::new(
            pitch_deg.to_radians(),
            yaw_deg.to_radians(),
            (roll_deg - 90.0).to_radians(),
        )
        .to_rotation();
        Pose::from_parts(&r, &Point3::origin())
    }

    #[test]
    fn euler_round_trip() {
        let e = EulerAngles::new(0.3, -0.7, 1.1);
        let back = EulerAngles::from_rotation(&e.to_rotation());
        assert_relative_eq!(back.pitch, e.pitch, epsilon = 1e-5);
        assert_relative_eq!(back.yaw, e.yaw, epsilon = 1e-5);
        assert_relative_eq!(back.roll, e.roll, epsilon = 1e-5);
    }

    #[test]
    fn wrap_angle_half_open_interval() {
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn portrait_roll_is_level() {
        assert_relative_eq!(normalized_roll_deg(-FRAC_PI_2), 0.0, epsilon = 1e-4);
        // Landscape sensor orientation is a quarter turn off.
        assert_relative_eq!(normalized_roll_deg(0.0).abs(), 90.0, epsilon = 1e-4);
        // Upside-down portrait folds onto upright.
        assert_relative_eq!(normalized_roll_deg(FRAC_PI_2), 0.0, epsilon = 1e-4);
        assert_relative_eq!(normalized_roll_deg((-70.0f32).to_radians()), 20.0, epsilon = 1e-3);
    }

    #[test]
    fn pitch_past_quarter_turn_is_shifted() {
        assert_relative_eq!(normalized_pitch_deg(0.2), 0.2f32.to_degrees());
        assert_relative_eq!(normalized_pitch_deg(PI - 0.1), -0.1f32.to_degrees(), epsilon = 1e-4);
    }

    #[test]
    fn squarely_facing_camera_reads_zero() {
        let camera = portrait(0.0, 0.0, 0.0);
        let plane = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, -1.0), &camera.z_axis())
            .expect("plane");
        let a = camera_angles_to_plane(&plane, &camera);
        assert_relative_eq!(a.pitch_deg, 0.0, epsilon = 1e-3);
        assert_relative_eq!(a.yaw_deg, 0.0, epsilon = 1e-3);
        assert_relative_eq!(a.roll_deg, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn tilted_camera_angles_are_recovered() {
        let level = portrait(0.0, 0.0, 0.0);
        let plane = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, -1.0), &level.z_axis())
            .expect("plane");

        let pitched = camera_angles_to_plane(&plane, &portrait(25.0, 0.0, 0.0));
        assert_relative_eq!(pitched.pitch_deg, 25.0, epsilon = 1e-3);
        assert_relative_eq!(pitched.yaw_deg, 0.0, epsilon = 1e-3);

        let yawed = camera_angles_to_plane(&plane, &portrait(0.0, 40.0, 0.0));
        assert_relative_eq!(yawed.yaw_deg, 40.0, epsilon = 1e-3);
        assert_relative_eq!(yawed.pitch_deg, 0.0, epsilon = 1e-3);

        let rolled = camera_angles_to_plane(&plane, &portrait(0.0, 0.0, 15.0));
        assert_relative_eq!(rolled.roll_deg, 15.0, epsilon = 1e-3);
    }
}
