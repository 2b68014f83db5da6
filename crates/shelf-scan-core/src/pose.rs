use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Placement of a camera or plane in the fixed world frame.
///
/// Stored as a column-major homogeneous matrix: columns 0..3 are the local
/// x/y/z axes expressed in world coordinates, column 3 is the position.
/// The basis is not required to be right-handed; origin planes produced by
/// calibration use a mirrored basis (see [`crate::OriginPlane`]).
///
/// Camera poses follow the usual AR convention: the camera looks along its
/// local `-z` axis with `+y` up in the sensor image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose {
    pub matrix: Matrix4<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }

    pub fn identity() -> Self {
        Self::new(Matrix4::identity())
    }

    /// Build from a rigid isometry (rotation + translation).
    pub fn from_isometry(iso: &Isometry3<f32>) -> Self {
        Self::new(iso.to_homogeneous())
    }

    /// Build from a rotation matrix and a position.
    pub fn from_parts(rotation: &Matrix3<f32>, position: &Point3<f32>) -> Self {
        Self::from_axes(
            &rotation.column(0).into_owned(),
            &rotation.column(1).into_owned(),
            &rotation.column(2).into_owned(),
            position,
        )
    }

    /// Build from explicit basis columns and a position.
    pub fn from_axes(
        x: &Vector3<f32>,
        y: &Vector3<f32>,
        z: &Vector3<f32>,
        position: &Point3<f32>,
    ) -> Self {
        Self::new(Matrix4::from_columns(&[
            Vector4::new(x.x, x.y, x.z, 0.0),
            Vector4::new(y.x, y.y, y.z, 0.0),
            Vector4::new(z.x, z.y, z.z, 0.0),
            Vector4::new(position.x, position.y, position.z, 1.0),
        ]))
    }

    #[inline]
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Local axis `i` (0 = x, 1 = y, 2 = z) in world coordinates.
    #[inline]
    pub fn axis(&self, i: usize) -> Vector3<f32> {
        debug_assert!(i < 3);
        Vector3::new(self.matrix[(0, i)], self.matrix[(1, i)], self.matrix[(2, i)])
    }

    #[inline]
    pub fn x_axis(&self) -> Vector3<f32> {
        self.axis(0)
    }

    #[inline]
    pub fn y_axis(&self) -> Vector3<f32> {
        self.axis(1)
    }

    #[inline]
    pub fn z_axis(&self) -> Vector3<f32> {
        self.axis(2)
    }

    /// Unit viewing direction of a camera pose (local `-z`).
    #[inline]
    pub fn forward(&self) -> Vector3<f32> {
        -self.z_axis().normalize()
    }

    /// Upper-left 3×3 block.
    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// True when the basis is left-handed.
    pub fn is_mirrored(&self) -> bool {
        self.rotation_matrix().determinant() < 0.0
    }

    /// Orientation as a unit quaternion.
    ///
    /// For a mirrored basis the z column is flipped first, so the result is
    /// the rotation carrying the world frame onto `(x, y, -z)`.
    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        let mut r = self.rotation_matrix();
        if r.determinant() < 0.0 {
            let flipped = -r.column(2);
            r.set_column(2, &flipped);
        }
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r))
    }

    pub fn inverse(&self) -> Option<Pose> {
        self.matrix.try_inverse().map(Pose::new)
    }

    #[inline]
    pub fn transform_point(&self, p: &Point3<f32>) -> Point3<f32> {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    #[inline]
    pub fn transform_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vector3::new(r.x, r.y, r.z)
    }

    /// Euclidean distance between the two positions.
    pub fn distance_to(&self, other: &Pose) -> f32 {
        nalgebra::distance(&self.position(), &other.position())
    }

    /// `position^quaternion` formatted as `px,py,pz^qx,qy,qz,qw` with six decimals.
    pub fn to_pose_string(&self) -> String {
        let p = self.position();
        let q = self.quaternion();
        format!(
            "{:.6},{:.6},{:.6}^{:.6},{:.6},{:.6},{:.6}",
            p.x, p.y, p.z, q.i, q.j, q.k, q.w
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let pose = Pose::identity();
        assert_relative_eq!(pose.forward(), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(pose.position(), Point3::origin());
    }

    #[test]
    fn inverse_round_trips_points() {
        let iso = Isometry3::new(Vector3::new(0.3, -1.0, 2.0), Vector3::new(0.1, 0.7, -0.2));
        let pose = Pose::from_isometry(&iso);
        let inv = pose.inverse().expect("invertible");
        let p = Point3::new(1.5, 0.25, -3.0);
        let back = inv.transform_point(&pose.transform_point(&p));
        assert_relative_eq!(back, p, epsilon = 1e-5);
    }

    #[test]
    fn quaternion_of_mirrored_basis_flips_z() {
        let pose = Pose::from_axes(
            &Vector3::new(-1.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
            &Vector3::new(0.0, 0.0, 1.0),
            &Point3::new(0.0, 0.0, -1.0),
        );
        assert!(pose.is_mirrored());
        // (x, y, -z) = (-1,0,0),(0,1,0),(0,0,-1) is a half turn about y.
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI);
        assert_relative_eq!(pose.quaternion().angle_to(&expected), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn pose_string_has_fixed_precision() {
        let iso = Isometry3::new(Vector3::new(1.0, 2.0, 3.0), Vector3::z() * FRAC_PI_2);
        let s = Pose::from_isometry(&iso).to_pose_string();
        let (pos, rot) = s.split_once('^').expect("separator");
        assert_eq!(pos, "1.000000,2.000000,3.000000");
        assert_eq!(rot.split(',').count(), 4);
    }
}
