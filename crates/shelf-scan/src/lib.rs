//! High-level facade for the `shelf-scan-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying geometry, origin, coverage and motion crates,
//! - [`ScanConfig`]: the settings snapshot a session runs with,
//! - [`ScanSession`]: the per-frame driver (calibrate once, then track coverage
//!   and decide captures),
//! - [`ScanWorker`]: the same session behind a queue on its own thread,
//! - JSON-lines frame replay used by the `shelf-scan` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use shelf_scan::{CaptureEvent, ScanConfig, ScanSession};
//! use shelf_scan::core::Frame;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let frames: Vec<Frame> = Vec::new();
//! let mut session = ScanSession::new(ScanConfig::default(), true)?;
//! session.start_scanning();
//!
//! let mut captures: Vec<CaptureEvent> = Vec::new();
//! for frame in &frames {
//!     let report = session.process_frame(frame, &mut captures);
//!     if let Some(hint) = report.hint() {
//!         println!("{hint}");
//!     }
//! }
//! println!("captured {} images", captures.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `shelf_scan::core`: poses, the origin plane, angles, frames.
//! - `shelf_scan::origin`: origin strategies and the calibrator.
//! - `shelf_scan::coverage`: the cell lattice, pose gate and capture decision.
//! - `shelf_scan::motion`: motion tracking and the frame-rate counter.

pub use shelf_scan_core as core;
pub use shelf_scan_coverage as coverage;
pub use shelf_scan_motion as motion;
pub use shelf_scan_origin as origin;

mod capture;
mod config;
mod metadata;
pub mod replay;
mod session;
mod worker;

pub use capture::{prepare_image, CaptureEvent, CaptureSink, DiscardCaptures, ImageOptions};
pub use config::{
    CameraSettings, ConfigError, FpsSettings, OriginSettings, ScanConfig, VisionSettings,
};
pub use metadata::{CameraInfo, CaptureContext, ImageMetadata, Resolution, Vec2};
pub use session::{FrameReport, ScanSession};
pub use worker::{ScanWorker, WorkerError, REPORT_BACKLOG};
