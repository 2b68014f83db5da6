//! Motion and frame-rate signals used to gate captures.
//!
//! Both trackers keep only a bounded amount of history: [`MotionTracker`]
//! the previous pose, [`FpsCounter`] a fixed ring of per-frame rates.

mod fps;
mod motion;

pub use fps::{FpsCounter, FpsParams, FpsStats, LowFpsWarning};
pub use motion::{MotionState, MotionTracker, NOMINAL_UPDATE_INTERVAL};
