use std::io;

use live_filters_common::config::{Config, DisplayConfig};
use live_filters_common::frame::FramePair;
use live_filters_processor::ImageProcessor;
use opencv::core::Mat;
use tracing::{info, warn};

use crate::capture::{Frames, ReadOutcome};
use crate::display::Windows;
use crate::keys::UiCommand;
use crate::snapshot;
use crate::tui::TerminalUi;
use crate::AppError;

/// What the loop does after a command has been handled.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Snapshot,
    Quit,
}

fn handle_command(processor: &mut ImageProcessor, command: UiCommand) -> Flow {
    match command {
        UiCommand::NextFilter => processor.next_algorithm(),
        UiCommand::PrevFilter => processor.prev_algorithm(),
        UiCommand::Reset => processor.reset(),
        UiCommand::Snapshot => return Flow::Snapshot,
        UiCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// The user-facing side of the loop: the selector listing, the two stream
/// windows and the keys pressed in either.
pub trait Frontend {
    fn render(&mut self, items: &[String], selected: usize, status: &str, frames: u64)
        -> io::Result<()>;
    fn show(&mut self, raw: &Mat, processed: &Mat) -> opencv::Result<()>;
    /// Give the GUI `wait_ms` to handle events, then collect pending commands.
    fn poll(&mut self, wait_ms: i32) -> Result<Vec<UiCommand>, AppError>;
}

/// OpenCV windows plus the terminal selector.
pub struct Console {
    // Dropped first so the terminal is restored before the windows close.
    ui: TerminalUi,
    windows: Windows,
}

impl Console {
    pub fn open(config: &DisplayConfig) -> Result<Self, AppError> {
        let windows = Windows::open(config)?;
        let ui = TerminalUi::enter()?;
        Ok(Self { ui, windows })
    }
}

impl Frontend for Console {
    fn render(
        &mut self,
        items: &[String],
        selected: usize,
        status: &str,
        frames: u64,
    ) -> io::Result<()> {
        self.ui.render(items, selected, status, frames)
    }

    fn show(&mut self, raw: &Mat, processed: &Mat) -> opencv::Result<()> {
        self.windows.show(raw, processed)
    }

    fn poll(&mut self, wait_ms: i32) -> Result<Vec<UiCommand>, AppError> {
        let window_key = self.windows.pump(wait_ms)?;
        let mut commands = self.ui.poll_commands()?;
        commands.extend(window_key.and_then(UiCommand::from_window_key));
        Ok(commands)
    }
}

/// Capture, process, display and poll keys until the user quits or the stream ends.
pub fn run<S: Frames>(config: &Config, processor: ImageProcessor, source: S) -> Result<(), AppError> {
    let mut console = Console::open(&config.display)?;
    drive(config, processor, source, &mut console)
}

fn drive<S: Frames, F: Frontend>(
    config: &Config,
    mut processor: ImageProcessor,
    mut source: S,
    frontend: &mut F,
) -> Result<(), AppError> {
    let items = processor.algorithm_names();
    let mut status = String::new();

    let mut prev = match source.read()? {
        ReadOutcome::Frame(frame) | ReadOutcome::Rewound(frame) => frame,
        ReadOutcome::Ended => {
            warn!(source = %source.kind(), "stream produced no frames");
            return Ok(());
        }
    };
    let mut filter_failing = false;

    loop {
        frontend.render(&items, processor.selected_idx(), &status, prev.seq)?;

        let curr = match source.read()? {
            ReadOutcome::Frame(frame) => frame,
            ReadOutcome::Rewound(frame) => {
                info!(source = %source.kind(), "video restarted from the beginning");
                processor.reset();
                // Nothing carries over the seam: the first frame pairs with itself.
                prev = frame.try_clone()?;
                frame
            }
            ReadOutcome::Ended => break,
        };

        // Snapshots are named after the filter that produced `processed`,
        // even if a selection key arrives in the same batch.
        let filter_name = processor.selected_name().to_string();
        let processed = match processor.process(&FramePair::new(&prev.mat, &curr.mat)) {
            Ok(mat) => {
                filter_failing = false;
                mat
            }
            Err(e) => {
                if !filter_failing {
                    warn!(
                        error = %e,
                        filter = filter_name.as_str(),
                        seq = curr.seq,
                        "filter failed, showing the raw frame"
                    );
                    filter_failing = true;
                }
                curr.mat.try_clone()?
            }
        };

        frontend.show(&curr.mat, &processed)?;

        for command in frontend.poll(config.display.wait_key_ms)? {
            match handle_command(&mut processor, command) {
                Flow::Continue => {}
                Flow::Quit => {
                    info!(frames = curr.seq, "quit requested");
                    return Ok(());
                }
                Flow::Snapshot => {
                    status =
                        match snapshot::save(&config.snapshot.dir, &curr, &filter_name, &processed)
                        {
                            Ok(path) => format!("saved {}", path.display()),
                            Err(e) => {
                                warn!(error = %e, "snapshot failed");
                                format!("snapshot failed: {e}")
                            }
                        };
                }
            }
        }

        prev = curr;
    }

    info!(source = %source.kind(), "stream ended");
    Ok(())
}
