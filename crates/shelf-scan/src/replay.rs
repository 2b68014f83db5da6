//! Offline replay of recorded sessions.
//!
//! A recording is a JSON-lines file with one serialized
//! [`Frame`](shelf_scan_core::Frame) per line. Blank lines are skipped.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use shelf_scan_core::Frame;

use crate::{CaptureEvent, CaptureSink, ConfigError, FrameReport, ScanConfig, ScanSession};

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to serialize capture metadata: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Read every frame of a JSON-lines recording.
pub fn read_frames(path: impl AsRef<Path>) -> Result<Vec<Frame>, ReplayError> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line).map_err(|source| ReplayError::Json {
            line: idx + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

#[derive(Clone, Debug, Default)]
pub struct ReplayOptions {
    /// Where capture metadata (and images) are written, if anywhere.
    pub out_dir: Option<PathBuf>,
    /// Stop after calibration; no coverage tracking.
    pub calibrate_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Frames actually processed.
    pub frames: usize,
    /// Frame number on which calibration completed.
    pub calibrated_at: Option<u64>,
    pub captures: u64,
    pub covered_cells: usize,
}

/// Writes `capture_NNNN.json` (and `capture_NNNN.png` with the `image`
/// feature) per capture into a directory.
///
/// Write failures are logged and skipped.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_metadata(&self, event: &CaptureEvent) -> Result<(), ReplayError> {
        let path = self
            .dir
            .join(format!("capture_{:04}.json", event.image_count));
        let json = serde_json::to_string_pretty(&event.metadata).map_err(ReplayError::Serialize)?;
        fs::write(path, json)?;
        Ok(())
    }

    #[cfg(feature = "image")]
    fn write_image(&self, event: &CaptureEvent) {
        let Some(img) = &event.image else {
            return;
        };
        let path = self.dir.join(format!("capture_{:04}.png", event.image_count));
        match image::RgbImage::from_raw(img.width, img.height, img.data.clone()) {
            Some(buf) => {
                if let Err(err) = buf.save(&path) {
                    log::warn!("failed to write {}: {err}", path.display());
                }
            }
            None => log::warn!("capture {} has a malformed image buffer", event.image_count),
        }
    }
}

impl CaptureSink for DirectorySink {
    fn on_capture(&mut self, event: CaptureEvent) {
        if let Err(err) = self.write_metadata(&event) {
            log::warn!("failed to write capture {}: {err}", event.image_count);
        }
        #[cfg(feature = "image")]
        self.write_image(&event);
    }
}

/// Replay `frames` through a fresh session.
///
/// `on_frame` sees every report together with the captures that frame
/// produced. The origin strategy's `auto` setting resolves against whether
/// the first frame carries depth.
pub fn replay(
    frames: &[Frame],
    config: ScanConfig,
    options: &ReplayOptions,
    mut on_frame: impl FnMut(&FrameReport, &[CaptureEvent]),
) -> Result<ReplaySummary, ReplayError> {
    let depth_supported = frames.first().is_some_and(|f| f.depth.is_some());
    let mut session = ScanSession::new(config, depth_supported)?;
    if !options.calibrate_only {
        session.start_scanning();
    }
    let mut out = options.out_dir.as_ref().map(DirectorySink::new).transpose()?;

    let mut summary = ReplaySummary::default();
    let mut captures: Vec<CaptureEvent> = Vec::new();
    for frame in frames {
        captures.clear();
        let report = session.process_frame(frame, &mut captures);
        if report
            .calibration
            .as_ref()
            .is_some_and(|s| s.is_calibrated())
        {
            summary.calibrated_at = Some(report.frame_number);
        }
        on_frame(&report, &captures);
        if let Some(sink) = out.as_mut() {
            for event in &captures {
                sink.on_capture(event.clone());
            }
        }
        if options.calibrate_only && summary.calibrated_at.is_some() {
            break;
        }
    }

    summary.frames = session.frame_number() as usize;
    summary.captures = session.image_count();
    summary.covered_cells = session.coverage().map_or(0, |c| c.covered().len());
    log::info!(
        "replayed {} frames: {} captures, {} cells covered",
        summary.frames,
        summary.captures,
        summary.covered_cells
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reports_line_of_bad_frame() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(file).expect("write");
        writeln!(file, "{{\"timestamp\": 1.0}}").expect("write");
        let err = read_frames(file.path()).expect_err("missing camera");
        assert!(matches!(err, ReplayError::Json { line: 2, .. }), "{err}");
    }

    #[test]
    fn empty_recording_replays_to_empty_summary() {
        let summary = replay(&[], ScanConfig::default(), &ReplayOptions::default(), |_, _| {})
            .expect("replay");
        assert_eq!(summary, ReplaySummary::default());
    }
}
