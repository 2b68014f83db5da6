//! Core geometry and frame types for guided shelf scanning.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about calibration state, coverage bookkeeping or where frames come from;
//! it only provides the math those layers share:
//! - [`Pose`]: a 4×4 placement in the world frame (camera or plane),
//! - [`OriginPlane`]: the calibrated shelf plane and its local 2D frame,
//! - Euler/angle extraction used by every pose-validity check,
//! - point-in-triangle / point-in-quad containment,
//! - field of view from pinhole intrinsics,
//! - the per-frame sensor bundle ([`Frame`]).

mod angles;
mod frame;
mod image;
mod logger;
mod plane;
mod polygon;
mod pose;

pub use angles::{
    camera_angles_to_plane, normalized_pitch_deg, normalized_roll_deg, wrap_angle, EulerAngles,
    PlaneAngles,
};
pub use frame::{CameraFrame, CameraIntrinsics, DepthMap, FieldOfView, Frame, ImuSample};
pub use image::FrameImage;
pub use plane::OriginPlane;
pub use polygon::{point_in_quad, point_in_triangle};
pub use pose::Pose;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, level_from_env};

/// World "up" direction of the gravity-aligned tracking frame.
pub const WORLD_UP: nalgebra::Vector3<f32> = nalgebra::Vector3::new(0.0, 1.0, 0.0);
