mod app;
mod args;
mod capture;
mod display;
mod keys;
mod snapshot;
mod tui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use args::Args;
use capture::{CaptureError, FrameSource};
use clap::Parser;
use live_filters_common::config::{Config, FilterConfig, LoggingConfig};
use live_filters_processor::{FilterError, ImageProcessor};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("filter setup failed: {0}")]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("display error: {0}")]
    OpenCv(#[from] opencv::Error),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

fn main() {
    let args = Args::parse();

    if args.flags_table {
        print!("{}", args::flags_table());
        return;
    }

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    args.apply_to(&mut config);

    if args.list {
        let listing = FilterConfig {
            start_index: 0,
            ..config.filters.clone()
        };
        match ImageProcessor::with_default_filters(&listing) {
            Ok(processor) => {
                for line in processor.algorithm_names() {
                    println!("{line}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = init_logging(&config.logging) {
        eprintln!(
            "Failed to open log file {}: {e}",
            config.logging.file.display()
        );
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        error!(error = %e, "live-filters stopped");
        if matches!(e, AppError::Capture(CaptureError::Open(_))) {
            eprintln!("Cannot open video stream.");
        } else {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    let processor = ImageProcessor::with_default_filters(&config.filters)?;
    info!(
        start_index = processor.selected_idx(),
        start_filter = processor.selected_name(),
        filters = processor.len(),
        hide_original = config.display.hide_original,
        snapshot_dir = %config.snapshot.dir.display(),
        "starting live-filters"
    );

    let source = FrameSource::open(&config.capture)?;
    app::run(config, processor, source)
}

/// Log to a file: the terminal is owned by the text UI while the loop runs.
fn init_logging(config: &LoggingConfig) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.level.parse().unwrap_or_default()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
