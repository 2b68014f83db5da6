//! Coverage grid for guided shelf scanning.
//!
//! Once a shelf plane is calibrated, every frame that passes the pose and
//! motion gate has its view footprint projected onto the plane. Grid cells
//! fully inside the footprint *qualify*; qualifying cells not yet covered are
//! *new*. A capture fires when the new cells exceed a fixed share of the
//! qualifying ones, and only then are they added to the covered set.
//!
//! ```text
//! gate -> ray/plane distance -> footprint quad -> lattice sweep
//!      -> new-cell FOV check -> ratio test -> mark covered
//! ```

mod cell;
mod covered;
mod engine;
mod footprint;
mod gate;
mod params;

pub use cell::{GridCell, GridLattice};
pub use covered::CoveredSet;
pub use engine::{should_capture, CoverageEngine, CoverageOutcome, MAX_SWEEP_CELLS};
pub use footprint::{footprint, Footprint};
pub use gate::GateRejection;
pub use params::{CoverageParams, GateParams, DEFAULT_OVERLAP_FACTOR};
