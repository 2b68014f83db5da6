use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use shelf_scan_core::Frame;

use crate::{DepthOrigin, FeaturePointOrigin, OriginParams};

/// Estimates a point on the shelf along the camera's forward ray.
pub trait OriginCalculator {
    /// Candidate shelf point for this frame, or `None` when the frame carries
    /// too little data to say.
    fn compute(&mut self, frame: &Frame) -> Option<Point3<f32>>;

    /// Forget any state carried across frames.
    fn reset(&mut self) {}
}

/// Which [`OriginCalculator`] a session uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OriginStrategy {
    /// Depth map when the device provides one, feature points otherwise.
    #[default]
    Auto,
    DepthMap,
    FeaturePoints,
}

impl OriginStrategy {
    /// Resolve `Auto` against the device's depth capability.
    pub fn resolve(self, depth_supported: bool) -> Self {
        match self {
            Self::Auto if depth_supported => Self::DepthMap,
            Self::Auto => Self::FeaturePoints,
            other => other,
        }
    }

    /// Instantiate the calculator for this strategy.
    pub fn build(
        self,
        params: &OriginParams,
        depth_supported: bool,
    ) -> Box<dyn OriginCalculator + Send> {
        let resolved = self.resolve(depth_supported);
        log::debug!("origin strategy {self:?} resolved to {resolved:?}");
        match resolved {
            Self::DepthMap => Box::new(DepthOrigin::new(params.depth.clone())),
            _ => Box::new(FeaturePointOrigin::new(params.feature.clone())),
        }
    }
}
