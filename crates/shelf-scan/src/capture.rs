//! Capture events and where they go.

use std::sync::mpsc::Sender;

use shelf_scan_core::FrameImage;
use shelf_scan_coverage::GridCell;

use crate::ImageMetadata;

/// A frame that earned a capture.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureEvent {
    pub frame_number: u64,
    /// 1-based capture counter for the session.
    pub image_count: u64,
    pub timestamp: f64,
    /// Cells this capture added to coverage.
    pub cells: Vec<GridCell>,
    /// Portrait image ready for upload, when the frame carried one.
    pub image: Option<FrameImage>,
    pub metadata: ImageMetadata,
}

/// Receiver of capture events. Delivery is fire-and-forget: the session
/// never waits on or retries a sink.
pub trait CaptureSink {
    fn on_capture(&mut self, event: CaptureEvent);
}

impl CaptureSink for Vec<CaptureEvent> {
    fn on_capture(&mut self, event: CaptureEvent) {
        self.push(event);
    }
}

impl CaptureSink for Sender<CaptureEvent> {
    fn on_capture(&mut self, event: CaptureEvent) {
        if self.send(event).is_err() {
            log::warn!("capture receiver dropped, discarding capture");
        }
    }
}

/// Discards every capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardCaptures;

impl CaptureSink for DiscardCaptures {
    fn on_capture(&mut self, _event: CaptureEvent) {}
}

/// Upload image settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageOptions {
    pub lower_resolution: bool,
    pub target_width: u32,
}

/// Rotate a sensor image a quarter turn clockwise into portrait and, when
/// `lower_resolution` is set, scale it uniformly to `target_width`.
#[cfg(feature = "image")]
pub fn prepare_image(src: &FrameImage, opts: ImageOptions) -> Option<FrameImage> {
    use image::imageops::{self, FilterType};
    use image::RgbImage;

    let rgb = RgbImage::from_raw(src.width, src.height, src.data.clone())?;
    let mut portrait = imageops::rotate90(&rgb);

    if opts.lower_resolution && opts.target_width > 0 && portrait.width() != opts.target_width {
        let scale = opts.target_width as f64 / portrait.width() as f64;
        let height = ((portrait.height() as f64 * scale).round() as u32).max(1);
        portrait = imageops::resize(&portrait, opts.target_width, height, FilterType::Triangle);
    }

    let (width, height) = portrait.dimensions();
    FrameImage::new(width, height, portrait.into_raw())
}

/// Without image support the sensor image is passed through unchanged.
#[cfg(not(feature = "image"))]
pub fn prepare_image(src: &FrameImage, _opts: ImageOptions) -> Option<FrameImage> {
    Some(src.clone())
}
