//! Per-frame admission checks for coverage.

use shelf_scan_core::PlaneAngles;
use shelf_scan_motion::MotionState;

use crate::GateParams;

/// Why a frame was not evaluated for coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRejection {
    MovingTooFast,
    RotatingTooFast,
    Pitch,
    Yaw,
    Roll,
    /// The view ray does not hit the plane in front of the camera.
    NoPlaneIntersection,
    TooClose,
    TooFar,
    /// The footprint spans more lattice cells than one frame may sweep.
    FootprintTooLarge,
}

impl GateRejection {
    /// Operator hint key for a UI layer.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::MovingTooFast => "move slower",
            Self::RotatingTooFast => "rotate slower",
            Self::Pitch => "pitch to shelf",
            Self::Yaw => "yaw to shelf",
            Self::Roll => "roll to shelf",
            Self::NoPlaneIntersection => "point at shelf",
            Self::TooClose => "too close to shelf",
            Self::TooFar => "too far to shelf",
            Self::FootprintTooLarge => "move closer",
        }
    }
}

pub(crate) fn check_motion(p: &GateParams, motion: &MotionState) -> Result<(), GateRejection> {
    if !p.check_motion {
        return Ok(());
    }
    if motion.acceleration > p.max_acceleration {
        return Err(GateRejection::MovingTooFast);
    }
    if motion.angular_acceleration > p.max_angular_acceleration {
        return Err(GateRejection::RotatingTooFast);
    }
    Ok(())
}

pub(crate) fn check_angles(p: &GateParams, a: &PlaneAngles) -> Result<(), GateRejection> {
    if a.pitch_deg > p.max_pitch_deg {
        return Err(GateRejection::Pitch);
    }
    if a.yaw_deg > p.max_yaw_deg {
        return Err(GateRejection::Yaw);
    }
    if a.roll_deg > p.max_roll_deg {
        return Err(GateRejection::Roll);
    }
    Ok(())
}

/// `distance` is the perpendicular camera-to-plane distance.
pub(crate) fn check_distance(p: &GateParams, distance: f32) -> Result<(), GateRejection> {
    let too_close = distance < p.min_detection_distance || distance < p.min_starting_distance;
    if p.check_too_close && too_close {
        return Err(GateRejection::TooClose);
    }
    if p.check_too_far && distance > p.max_detection_distance {
        return Err(GateRejection::TooFar);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_toggles_are_independent() {
        let mut p = GateParams::default();
        assert_eq!(check_distance(&p, 0.1), Err(GateRejection::TooClose));
        assert_eq!(check_distance(&p, 2.5), Err(GateRejection::TooFar));
        assert_eq!(check_distance(&p, 1.0), Ok(()));

        p.check_too_close = false;
        assert_eq!(check_distance(&p, 0.1), Ok(()));
        assert_eq!(check_distance(&p, 2.5), Err(GateRejection::TooFar));

        p.check_too_far = false;
        assert_eq!(check_distance(&p, 2.5), Ok(()));
    }

    #[test]
    fn stricter_of_the_two_minimums_applies() {
        let p = GateParams {
            min_starting_distance: 0.5,
            min_detection_distance: 0.3,
            ..GateParams::default()
        };
        assert_eq!(check_distance(&p, 0.4), Err(GateRejection::TooClose));
    }

    #[test]
    fn motion_limits() {
        let mut p = GateParams::default();
        let fast = MotionState {
            acceleration: 0.5,
            ..MotionState::default()
        };
        let spinning = MotionState {
            angular_acceleration: 5.0,
            ..MotionState::default()
        };
        assert_eq!(check_motion(&p, &fast), Err(GateRejection::MovingTooFast));
        assert_eq!(check_motion(&p, &spinning), Err(GateRejection::RotatingTooFast));
        p.check_motion = false;
        assert_eq!(check_motion(&p, &fast), Ok(()));
    }

    #[test]
    fn angle_limits_in_order() {
        let p = GateParams::default();
        let a = PlaneAngles {
            pitch_deg: 40.0,
            yaw_deg: 40.0,
            roll_deg: 0.0,
        };
        assert_eq!(check_angles(&p, &a), Err(GateRejection::Pitch));
        let a = PlaneAngles {
            pitch_deg: 10.0,
            ..a
        };
        assert_eq!(check_angles(&p, &a), Err(GateRejection::Yaw));
        assert_eq!(GateRejection::Yaw.hint(), "yaw to shelf");
    }
}
