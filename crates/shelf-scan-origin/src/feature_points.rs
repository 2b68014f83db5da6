use std::ops::Range;

use nalgebra::{Point3, Vector3};
use shelf_scan_core::Frame;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{FeatureRayParams, OriginCalculator};

/// Origin from sparse feature points gathered around the camera's view ray.
///
/// Each frame contributes the mean of a thin depth-ordered slice of the
/// points near the ray. Accepted samples are blended into a running estimate
/// with weight `sample / accumulated`, so later frames correct it less.
#[derive(Clone, Debug, Default)]
pub struct FeaturePointOrigin {
    params: FeatureRayParams,
    estimate: Option<Point3<f32>>,
    accumulated: usize,
}

impl FeaturePointOrigin {
    pub fn new(params: FeatureRayParams) -> Self {
        Self {
            params,
            estimate: None,
            accumulated: 0,
        }
    }

    /// Current smoothed estimate.
    #[inline]
    pub fn estimate(&self) -> Option<Point3<f32>> {
        self.estimate
    }

    /// Total number of slice points folded into the estimate so far.
    #[inline]
    pub fn accumulated(&self) -> usize {
        self.accumulated
    }

    /// Mean of the depth slice of points near the ray, and the slice length.
    fn sample_along_ray(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        points: &[Point3<f32>],
    ) -> Option<(Point3<f32>, usize)> {
        let end = origin + direction * self.params.ray_length;
        let max_d2 = self.params.ray_radius * self.params.ray_radius;

        let mut nearby: Vec<(f32, Point3<f32>)> = points
            .iter()
            .filter(|p| squared_distance_to_segment(p, origin, &end) < max_d2)
            .map(|p| ((p - origin).norm_squared(), *p))
            .collect();

        if nearby.len() < self.params.min_nearby_points {
            log::debug!(
                "{} feature points near the view ray, need {}",
                nearby.len(),
                self.params.min_nearby_points
            );
            return None;
        }

        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
        let slice = slice_bounds(nearby.len(), self.params.slice_fraction)?;
        let len = slice.len();
        let sum = nearby[slice]
            .iter()
            .fold(Vector3::zeros(), |acc, (_, p)| acc + p.coords);
        Some((Point3::from(sum / len as f32), len))
    }
}

impl OriginCalculator for FeaturePointOrigin {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(ts = frame.timestamp)))]
    fn compute(&mut self, frame: &Frame) -> Option<Point3<f32>> {
        let Some(points) = frame.feature_points.as_deref() else {
            return self.estimate;
        };
        let pose = frame.pose();
        let camera = pose.position();
        let forward = pose.forward();

        let Some((sample, count)) = self.sample_along_ray(&camera, &forward, points) else {
            return self.estimate;
        };

        let distance = nalgebra::distance(&camera, &sample);
        if distance < self.params.min_starting_distance
            || distance < self.params.min_detection_distance
        {
            log::debug!("feature sample {distance:.3} m from camera, keeping previous estimate");
            return self.estimate;
        }

        self.accumulated += count;
        let weight = (count as f32 / self.accumulated as f32).clamp(self.params.min_blend, 1.0);
        self.estimate = Some(match self.estimate {
            None => sample,
            Some(prev) => Point3::from(prev.coords.lerp(&sample.coords, weight)),
        });
        self.estimate
    }

    fn reset(&mut self) {
        self.estimate = None;
        self.accumulated = 0;
    }
}

/// Index range of the averaged depth slice for `n` sorted points.
///
/// Skips the nearest `ceil(5%)` and takes the next `ceil(5%)`.
pub fn depth_slice_bounds(n: usize) -> Option<Range<usize>> {
    slice_bounds(n, FeatureRayParams::default().slice_fraction)
}

fn slice_bounds(n: usize, fraction: f64) -> Option<Range<usize>> {
    let step = (n as f64 * fraction).ceil() as usize;
    let (start, end) = (step, step + step);
    (step > 0 && end <= n).then_some(start..end)
}

/// Squared distance from `p` to the segment `a..b`.
fn squared_distance_to_segment(p: &Point3<f32>, a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.norm_squared();
    if len2 <= 0.0 {
        return ap.norm_squared();
    }
    let t = (ap.dot(&ab) / len2).clamp(0.0, 1.0);
    (ap - ab * t).norm_squared()
}
