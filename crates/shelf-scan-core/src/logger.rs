//! Stderr logging for scanning sessions.
//!
//! Lines look like `[elapsed LEVEL target] message`. The elapsed column lines
//! log output up against frame timestamps. Records from the `shelf_scan*`
//! crates are shown at the requested level; everything else (image codecs,
//! thread plumbing) only at `warn` and above so per-frame debug output stays
//! readable.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGET_PREFIX: &str = "shelf_scan";

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

impl FrameLogger {
    fn level_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET_PREFIX) {
            self.level
        } else {
            self.level.min(LevelFilter::Warn)
        }
    }
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{elapsed:8.3}s {:>5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
        if record.level() == Level::Error {
            let _ = stderr.flush();
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs anything; later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| FrameLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Level named by `var` (`off`, `error`..`trace`), `info` when unset or
/// unparsable.
pub fn level_from_env(var: &str) -> LevelFilter {
    std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the stderr logger at the level named by `var`.
pub fn init_from_env(var: &str) -> Result<LevelFilter, log::SetLoggerError> {
    let level = level_from_env(var);
    init_with_level(level)?;
    Ok(level)
}

/// Install a `tracing` subscriber with span timings.
///
/// The filter comes from `var` using `EnvFilter` directives; unset means
/// `warn,shelf_scan=info`. `log` records are bridged into the subscriber.
#[cfg(feature = "tracing")]
pub fn init_tracing(var: &str, json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_env(var)
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{OWN_TARGET_PREFIX}=info")));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    }
}
