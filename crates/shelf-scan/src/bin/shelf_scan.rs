//! Replay recorded scanning sessions and inspect settings.

use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use shelf_scan::replay::{read_frames, replay, ReplayOptions};
use shelf_scan::ScanConfig;

#[derive(Debug, Parser)]
#[command(name = "shelf-scan", author, version, about = "Guided shelf scanning tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON-lines frame recording through a scanning session
    Replay {
        /// Recording with one JSON frame per line.
        frames: PathBuf,

        /// Settings JSON; omitted keys keep their defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for capture metadata and images.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Stop once the origin is calibrated.
        #[arg(long)]
        calibrate_only: bool,
    },
    /// Print the default settings JSON
    DefaultConfig,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    match Cli::parse().command {
        Commands::Replay {
            frames,
            config,
            out,
            calibrate_only,
        } => run_replay(frames, config, out, calibrate_only),
        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&ScanConfig::default())?);
            Ok(())
        }
    }
}

const LOG_ENV: &str = "SHELF_SCAN_LOG";

#[cfg(feature = "tracing")]
fn init_logging() -> Result<(), Box<dyn Error>> {
    shelf_scan::core::init_tracing(LOG_ENV, false)?;
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging() -> Result<(), Box<dyn Error>> {
    shelf_scan::core::init_from_env(LOG_ENV)?;
    Ok(())
}

fn run_replay(
    frames_path: PathBuf,
    config_path: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    calibrate_only: bool,
) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => ScanConfig::load_json(path)?,
        None => ScanConfig::default(),
    };
    let frames = read_frames(&frames_path)?;
    log::info!("loaded {} frames from {}", frames.len(), frames_path.display());

    let options = ReplayOptions {
        out_dir,
        calibrate_only,
    };
    let mut last_hint = None;
    let summary = replay(&frames, config, &options, |report, captures| {
        let hint = report.hint();
        if hint != last_hint {
            if let Some(h) = hint {
                println!("frame {:>5}: {h}", report.frame_number);
            }
            last_hint = hint;
        }
        if let Some(w) = report.low_fps {
            println!(
                "frame {:>5}: low frame rate ({} < {})",
                report.frame_number, w.lowest, w.threshold
            );
        }
        for event in captures {
            println!(
                "frame {:>5}: capture #{} (+{} cells)",
                event.frame_number,
                event.image_count,
                event.cells.len()
            );
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
