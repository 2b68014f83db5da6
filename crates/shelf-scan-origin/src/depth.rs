use nalgebra::Point3;
use shelf_scan_core::{DepthMap, Frame};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DepthParams, OriginCalculator};

/// Origin from the dense depth map: the mean depth of a small disk around the
/// image center, pushed out along the camera's forward axis.
#[derive(Clone, Debug, Default)]
pub struct DepthOrigin {
    params: DepthParams,
}

impl DepthOrigin {
    pub fn new(params: DepthParams) -> Self {
        Self { params }
    }
}

impl OriginCalculator for DepthOrigin {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(ts = frame.timestamp)))]
    fn compute(&mut self, frame: &Frame) -> Option<Point3<f32>> {
        let depth = frame.depth.as_ref()?;
        let hfov = frame.camera.fov().horizontal;
        let mean = disk_mean_depth(depth, hfov, self.params.sample_radius)?;

        let pose = frame.pose();
        Some(pose.position() + pose.forward() * mean)
    }
}

/// Mean of the valid samples within `radius` meters of the center pixel.
///
/// The pixel radius is derived from the center depth and the horizontal field
/// of view of the map.
fn disk_mean_depth(depth: &DepthMap, hfov: f32, radius: f32) -> Option<f32> {
    let (cx, cy) = (depth.width / 2, depth.height / 2);
    let center = depth.get(cx, cy)?;
    if !center.is_finite() || center <= 0.0 {
        log::debug!("depth map center sample unusable ({center})");
        return None;
    }

    let meters_per_pixel = 2.0 * (hfov * 0.5).tan() * center / depth.width as f32;
    let r = (radius / meters_per_pixel).floor();
    if !r.is_finite() || r < 0.0 {
        return None;
    }
    let r = r as usize;
    let r2 = r * r;

    let (mut sum, mut count) = (0.0f64, 0usize);
    for y in cy.saturating_sub(r)..=(cy + r).min(depth.height - 1) {
        for x in cx.saturating_sub(r)..=(cx + r).min(depth.width - 1) {
            let (dx, dy) = (x.abs_diff(cx), y.abs_diff(cy));
            if dx * dx + dy * dy > r2 {
                continue;
            }
            match depth.get(x, y) {
                Some(d) if d.is_finite() => {
                    sum += d as f64;
                    count += 1;
                }
                _ => {}
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some((sum / count as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use shelf_scan_core::{CameraFrame, CameraIntrinsics, Pose};

    fn frame(depth: Option<DepthMap>) -> Frame {
        let camera = CameraFrame {
            pose: Pose::identity(),
            intrinsics: CameraIntrinsics {
                fx: 500.0,
                fy: 500.0,
                cx: 320.0,
                cy: 240.0,
                width: 640,
                height: 480,
            },
        };
        let mut f = Frame::new(0.0, camera);
        f.depth = depth;
        f
    }

    #[test]
    fn uniform_depth_lands_on_forward_axis() {
        let mut origin = DepthOrigin::default();
        let p = origin
            .compute(&frame(Some(DepthMap::uniform(256, 192, 1.2))))
            .expect("origin");
        assert_relative_eq!(p.coords, Vector3::new(0.0, 0.0, -1.2), epsilon = 1e-5);
    }

    #[test]
    fn missing_samples_are_skipped_not_fatal() {
        let mut map = DepthMap::uniform(64, 48, 1.0);
        // Knock out a row right next to the center.
        for x in 0..64 {
            map.data[25 * 64 + x] = f32::NAN;
        }
        // And raise the rest of the disk so a short-circuit would show up.
        for y in 26..48 {
            for x in 0..64 {
                map.data[y * 64 + x] = 2.0;
            }
        }
        let r = disk_mean_depth(&map, std::f32::consts::FRAC_PI_2, 0.1).expect("mean");
        assert!(r > 1.0 && r < 2.0, "mean {r}");
    }

    #[test]
    fn missing_depth_or_center_fails() {
        let mut origin = DepthOrigin::default();
        assert!(origin.compute(&frame(None)).is_none());

        let mut map = DepthMap::uniform(64, 48, 1.0);
        map.data[24 * 64 + 32] = f32::NAN;
        assert!(origin.compute(&frame(Some(map))).is_none());
    }
}
