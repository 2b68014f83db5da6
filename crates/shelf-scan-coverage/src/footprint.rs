use nalgebra::{Point2, Point3};
use shelf_scan_core::{CameraFrame, OriginPlane};

/// Camera view footprint on the plane for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    /// Distance along the view ray to the plane.
    pub ray_distance: f32,
    /// Where the view ray meets the plane.
    pub center: Point3<f32>,
    /// Frustum cross-section corners at `ray_distance`, in image terms:
    /// bottom-left, top-left, top-right, bottom-right.
    pub corners_world: [Point3<f32>; 4],
    /// `corners_world` in plane-local 2D coordinates.
    pub corners_plane: [Point2<f32>; 4],
}

impl Footprint {
    /// Axis-aligned bounds of the projected corners.
    pub fn bounds(&self) -> (Point2<f32>, Point2<f32>) {
        let mut min = self.corners_plane[0];
        let mut max = min;
        for c in &self.corners_plane[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }
}

/// Intersect the view ray with the plane and project the frustum
/// cross-section at that distance onto it.
///
/// Horizontal field of view spans the camera's local x axis, vertical its
/// local y axis. Returns `None` when the ray is parallel to the plane or
/// hits it behind the camera.
pub fn footprint(plane: &OriginPlane, camera: &CameraFrame) -> Option<Footprint> {
    let pose = &camera.pose;
    let position = pose.position();
    let forward = pose.forward();

    let cam_local = plane.to_local(&position);
    let fwd_local = plane.to_local_vector(&forward);
    let t = -cam_local.z / fwd_local.z;
    if !t.is_finite() || t <= 0.0 {
        return None;
    }

    let fov = camera.fov();
    let half_w = t * (fov.horizontal * 0.5).tan();
    let half_h = t * (fov.vertical * 0.5).tan();
    let right = pose.x_axis().normalize() * half_w;
    let up = pose.y_axis().normalize() * half_h;
    let center = position + forward * t;

    let corners_world = [
        center - right - up,
        center - right + up,
        center + right + up,
        center + right - up,
    ];
    let corners_plane = corners_world.map(|c| plane.project(&c));

    Some(Footprint {
        ray_distance: t,
        center,
        corners_world,
        corners_plane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use shelf_scan_core::{CameraIntrinsics, Pose};

    fn camera(pose: Pose) -> CameraFrame {
        CameraFrame {
            pose,
            intrinsics: CameraIntrinsics {
                fx: 500.0,
                fy: 500.0,
                cx: 500.0,
                cy: 250.0,
                width: 1000,
                height: 500,
            },
        }
    }

    #[test]
    fn square_view_footprint_matches_fov() {
        let plane = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, -2.0), &Vector3::z())
            .expect("plane");
        let fp = footprint(&plane, &camera(Pose::identity())).expect("footprint");
        assert_relative_eq!(fp.ray_distance, 2.0, epsilon = 1e-6);

        let (min, max) = fp.bounds();
        // tan(hfov/2) = 1, tan(vfov/2) = 0.5
        assert_relative_eq!(max.x - min.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(max.y - min.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(min.x + max.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn looking_away_has_no_footprint() {
        let plane = OriginPlane::upright_facing(&Point3::new(0.0, 0.0, 2.0), &Vector3::z())
            .expect("plane");
        assert!(footprint(&plane, &camera(Pose::identity())).is_none());
    }
}
