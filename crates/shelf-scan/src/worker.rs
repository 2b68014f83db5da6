//! A [`ScanSession`] running on its own thread.
//!
//! Frames are queued and processed strictly in submission order; the
//! caller never blocks on geometry. Reports and captures come back over
//! channels. The report channel holds at most [`REPORT_BACKLOG`] entries;
//! reports beyond that are dropped until the caller drains it.
//!
//! ```text
//!  caller ──submit(frame)──▶ [queue] ──▶ worker: session.process_frame
//!    ▲                                        │            │
//!    └──────────── reports ◀──────────────────┘            ▼
//!                                                   captures (Sender)
//! ```

use std::sync::mpsc::{self, Receiver, Sender, TrySendError};
use std::thread::{self, JoinHandle};

use shelf_scan_core::Frame;

use crate::{CaptureEvent, FrameReport, ScanSession};

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("failed to spawn scan worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("scan worker has stopped")]
    Disconnected,
}

/// Undrained reports kept before new ones are dropped.
pub const REPORT_BACKLOG: usize = 256;

enum WorkerMessage {
    Frame(Box<Frame>),
    StartScanning,
    StopScanning,
    Reset,
}

/// Handle to a session processing frames on a background thread.
pub struct ScanWorker {
    commands: Sender<WorkerMessage>,
    reports: Receiver<FrameReport>,
    handle: JoinHandle<ScanSession>,
}

impl ScanWorker {
    /// Move `session` onto a new thread. Captures are sent to `captures`.
    pub fn spawn(mut session: ScanSession, captures: Sender<CaptureEvent>) -> Result<Self, WorkerError> {
        let (commands, queue) = mpsc::channel::<WorkerMessage>();
        let (report_tx, reports) = mpsc::sync_channel(REPORT_BACKLOG);

        let handle = thread::Builder::new()
            .name("shelf-scan-worker".into())
            .spawn(move || {
                let mut sink = captures;
                while let Ok(message) = queue.recv() {
                    match message {
                        WorkerMessage::Frame(frame) => {
                            let report = session.process_frame(&frame, &mut sink);
                            if let Err(TrySendError::Full(report)) = report_tx.try_send(report) {
                                log::trace!("report backlog full, dropping frame {}", report.frame_number);
                            }
                        }
                        WorkerMessage::StartScanning => session.start_scanning(),
                        WorkerMessage::StopScanning => session.stop_scanning(),
                        WorkerMessage::Reset => session.reset(),
                    }
                }
                log::debug!("scan worker queue closed after {} frames", session.frame_number());
                session
            })?;

        Ok(Self {
            commands,
            reports,
            handle,
        })
    }

    fn send(&self, message: WorkerMessage) -> Result<(), WorkerError> {
        self.commands
            .send(message)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Queue a frame for processing.
    pub fn submit(&self, frame: Frame) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Frame(Box::new(frame)))
    }

    pub fn start_scanning(&self) -> Result<(), WorkerError> {
        self.send(WorkerMessage::StartScanning)
    }

    pub fn stop_scanning(&self) -> Result<(), WorkerError> {
        self.send(WorkerMessage::StopScanning)
    }

    /// Queue a session reset; frames submitted before it are processed first.
    pub fn reset(&self) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Reset)
    }

    /// Reports in frame order. Frames processed while the backlog was full
    /// have no report.
    #[inline]
    pub fn reports(&self) -> &Receiver<FrameReport> {
        &self.reports
    }

    /// Drain the queue, stop the thread and hand the session back.
    ///
    /// Returns `None` if the worker thread panicked.
    pub fn finish(self) -> Option<ScanSession> {
        let Self {
            commands, handle, ..
        } = self;
        drop(commands);
        handle.join().ok()
    }
}

impl std::fmt::Debug for ScanWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanWorker")
            .field("finished", &self.handle.is_finished())
            .finish_non_exhaustive()
    }
}
