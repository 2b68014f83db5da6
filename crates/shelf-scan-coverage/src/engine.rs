//! Per-frame coverage evaluation against a calibrated plane.

use shelf_scan_core::{camera_angles_to_plane, point_in_quad, CameraFrame, OriginPlane};
use shelf_scan_motion::MotionState;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::footprint::{footprint, Footprint};
use crate::gate::{check_angles, check_distance, check_motion};
use crate::{CoverageParams, CoveredSet, GateRejection, GridCell, GridLattice};

/// What one frame did to coverage.
#[derive(Clone, Debug, PartialEq)]
pub enum CoverageOutcome {
    /// The frame failed the gate and was not evaluated.
    Rejected(GateRejection),
    /// Too little new ground; nothing was recorded.
    Insufficient { qualifying: usize, new: usize },
    /// Capture triggered; `cells` are now covered.
    Capture {
        qualifying: usize,
        cells: Vec<GridCell>,
    },
}

impl CoverageOutcome {
    #[inline]
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Capture { .. })
    }

    pub fn rejection(&self) -> Option<GateRejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

/// Upper bound on cells swept per frame. Beyond it the frame is rejected
/// rather than tested cell by cell.
pub const MAX_SWEEP_CELLS: u64 = 1 << 16;

/// Strict ratio test: `new > qualifying * ratio`.
#[inline]
pub fn should_capture(new: usize, qualifying: usize, ratio: f64) -> bool {
    new as f64 > qualifying as f64 * ratio
}

/// Coverage bookkeeping for one calibrated plane.
///
/// Built only from a calibrated plane, so coverage before calibration cannot
/// be expressed.
#[derive(Clone, Debug)]
pub struct CoverageEngine {
    plane: OriginPlane,
    params: CoverageParams,
    lattice: GridLattice,
    covered: CoveredSet,
}

impl CoverageEngine {
    /// Panics on a non-positive cell spacing or a ratio outside `[0, 1]`.
    pub fn new(plane: OriginPlane, params: CoverageParams) -> Self {
        assert!(
            (0.0..=1.0).contains(&params.min_ratio),
            "coverage ratio must be in [0, 1], got {}",
            params.min_ratio
        );
        let lattice = GridLattice::new(params.spacing());
        Self {
            plane,
            params,
            lattice,
            covered: CoveredSet::new(),
        }
    }

    #[inline]
    pub fn plane(&self) -> &OriginPlane {
        &self.plane
    }

    #[inline]
    pub fn params(&self) -> &CoverageParams {
        &self.params
    }

    #[inline]
    pub fn lattice(&self) -> &GridLattice {
        &self.lattice
    }

    #[inline]
    pub fn covered(&self) -> &CoveredSet {
        &self.covered
    }

    /// Run the gate, then evaluate and possibly commit this frame's coverage.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(covered = self.covered.len())))]
    pub fn process(&mut self, camera: &CameraFrame, motion: &MotionState) -> CoverageOutcome {
        let fp = match self.admit(camera, motion) {
            Ok(fp) => fp,
            Err(rejection) => {
                log::debug!("frame rejected: {rejection:?}");
                return CoverageOutcome::Rejected(rejection);
            }
        };

        let qualifying = self.qualifying_cells(&fp);
        let new = self.new_cells(&qualifying, camera);

        if !should_capture(new.len(), qualifying.len(), self.params.min_ratio) {
            log::debug!(
                "{} new of {} qualifying cells, below ratio {}",
                new.len(),
                qualifying.len(),
                self.params.min_ratio
            );
            return CoverageOutcome::Insufficient {
                qualifying: qualifying.len(),
                new: new.len(),
            };
        }

        self.mark_covered(&new);
        log::info!(
            "capture: {} new of {} qualifying cells, {} covered",
            new.len(),
            qualifying.len(),
            self.covered.len()
        );
        CoverageOutcome::Capture {
            qualifying: qualifying.len(),
            cells: new,
        }
    }

    /// Motion, angle and distance checks; the footprint on success, as long as
    /// its lattice sweep stays under [`MAX_SWEEP_CELLS`].
    fn admit(&self, camera: &CameraFrame, motion: &MotionState) -> Result<Footprint, GateRejection> {
        let gate = &self.params.gate;
        check_motion(gate, motion)?;
        check_angles(gate, &camera_angles_to_plane(&self.plane, &camera.pose))?;

        let perpendicular = self.plane.to_local(&camera.pose.position()).z.abs();
        check_distance(gate, perpendicular)?;

        let fp = footprint(&self.plane, camera).ok_or(GateRejection::NoPlaneIntersection)?;
        let (min, max) = fp.bounds();
        let sweep = self.lattice.sweep_len(&min, &max);
        if sweep > MAX_SWEEP_CELLS {
            log::debug!("footprint sweeps {sweep} cells, over {MAX_SWEEP_CELLS}");
            return Err(GateRejection::FootprintTooLarge);
        }
        Ok(fp)
    }

    /// Cells whose whole square lies inside the footprint quad.
    pub fn qualifying_cells(&self, fp: &Footprint) -> Vec<GridCell> {
        let (min, max) = fp.bounds();
        self.lattice
            .cells_around(&min, &max)
            .filter(|&cell| {
                self.lattice
                    .corners(cell)
                    .iter()
                    .all(|c| point_in_quad(c, &fp.corners_plane))
            })
            .collect()
    }

    /// Qualifying cells not yet covered whose centers are inside the
    /// camera's field of view.
    pub fn new_cells(&self, qualifying: &[GridCell], camera: &CameraFrame) -> Vec<GridCell> {
        let pose = &camera.pose;
        let position = pose.position();
        let forward = pose.forward();
        let right = pose.x_axis().normalize();
        let up = pose.y_axis().normalize();
        let fov = camera.fov();
        let (half_h, half_v) = (fov.horizontal * 0.5, fov.vertical * 0.5);

        qualifying
            .iter()
            .filter(|cell| !self.covered.contains(cell))
            .filter(|&&cell| {
                let world = self.plane.to_world(&self.lattice.center(cell));
                let to_cell = world - position;
                let depth = to_cell.dot(&forward);
                to_cell.dot(&right).atan2(depth).abs() <= half_h
                    && to_cell.dot(&up).atan2(depth).abs() <= half_v
            })
            .copied()
            .collect()
    }

    /// Add cells to the covered set; returns how many were newly added.
    pub fn mark_covered(&mut self, cells: &[GridCell]) -> usize {
        self.covered.extend(cells)
    }

    /// Forget all covered cells.
    pub fn reset(&mut self) {
        self.covered.clear();
    }
}
