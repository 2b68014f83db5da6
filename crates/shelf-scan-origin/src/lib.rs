//! Shelf origin estimation and calibration.
//!
//! An [`OriginCalculator`] turns one frame into a candidate point on the
//! shelf along the camera's view ray. The [`Calibrator`] checks the camera
//! pose on every frame, builds an upright plane through each candidate and
//! commits to it once enough consecutive frames qualify.
//!
//! Two strategies are provided:
//! - [`DepthOrigin`]: averages a small disk of the dense depth map around
//!   the image center,
//! - [`FeaturePointOrigin`]: picks sparse feature points near the view ray
//!   and smooths the estimate across frames.

mod calibrator;
mod depth;
mod feature_points;
mod params;
mod strategy;

pub use calibrator::{CalibrationStatus, Calibrator};
pub use depth::DepthOrigin;
pub use feature_points::{depth_slice_bounds, FeaturePointOrigin};
pub use params::{CalibrationParams, DepthParams, FeatureRayParams, OriginParams};
pub use strategy::{OriginCalculator, OriginStrategy};
