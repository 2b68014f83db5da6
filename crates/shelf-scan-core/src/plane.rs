use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::{Pose, WORLD_UP};

/// Calibrated reference plane of the shelf.
///
/// The plane passes through `pose.position()`. Local `x`/`y` span the shelf
/// surface and are the 2D frame used for gridding; local `z` is the normal.
/// The world-to-local transform is cached because every coverage step maps
/// many points into plane space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OriginPlane {
    pose: Pose,
    world_to_local: Matrix4<f32>,
}

impl OriginPlane {
    /// Wrap an arbitrary plane placement. Returns `None` for a singular basis.
    pub fn new(pose: Pose) -> Option<Self> {
        let world_to_local = pose.matrix.try_inverse()?;
        Some(Self {
            pose,
            world_to_local,
        })
    }

    /// Upright plane through `position`, oriented from a camera's local z axis.
    ///
    /// ```text
    /// right   = -normalize(up × camera_z)
    /// up      = world up
    /// normal  =  normalize(up × right)
    /// ```
    ///
    /// The basis only depends on the horizontal heading of the camera, so the
    /// plane frame is unaffected by camera roll. `(right, up, normal)` is
    /// left-handed. Returns `None` when the camera looks straight up or down.
    pub fn upright_facing(position: &Point3<f32>, camera_z: &Vector3<f32>) -> Option<Self> {
        let up = WORLD_UP;
        let right = -up.cross(camera_z).try_normalize(1e-6)?;
        let normal = up.cross(&right).try_normalize(1e-6)?;
        Self::new(Pose::from_axes(&right, &up, &normal, position))
    }

    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[inline]
    pub fn origin(&self) -> Point3<f32> {
        self.pose.position()
    }

    /// Plane normal in world coordinates.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.pose.z_axis()
    }

    /// World point expressed in plane-local coordinates.
    #[inline]
    pub fn to_local(&self, p: &Point3<f32>) -> Point3<f32> {
        let v = self.world_to_local * p.to_homogeneous();
        Point3::new(v.x, v.y, v.z)
    }

    /// World direction expressed in plane-local coordinates.
    #[inline]
    pub fn to_local_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        let r = self.world_to_local * v.to_homogeneous();
        Vector3::new(r.x, r.y, r.z)
    }

    /// Orthographic projection of a world point onto the plane's 2D frame.
    #[inline]
    pub fn project(&self, p: &Point3<f32>) -> Point2<f32> {
        let local = self.to_local(p);
        Point2::new(local.x, local.y)
    }

    /// Plane-local 2D point lifted back into world space.
    #[inline]
    pub fn to_world(&self, p: &Point2<f32>) -> Point3<f32> {
        self.pose.position() + self.pose.x_axis() * p.x + self.pose.y_axis() * p.y
    }

    /// Pose of a plane-local point: the plane orientation moved to `p`.
    pub fn pose_at(&self, p: &Point2<f32>) -> Pose {
        let mut pose = self.pose;
        let w = self.to_world(p);
        pose.matrix[(0, 3)] = w.x;
        pose.matrix[(1, 3)] = w.y;
        pose.matrix[(2, 3)] = w.z;
        pose
    }
}
