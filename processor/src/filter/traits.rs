use live_filters_common::frame::FramePair;
use opencv::core::Mat;

use crate::error::FilterError;

/// A named frame transformation selectable from the text UI.
///
/// Implementations receive the previous and current frame and return the
/// frame to display. Any scratch state carried between calls lives in the
/// implementation and is dropped by `reset`.
pub trait FrameFilter {
    /// Human-readable name shown in the listing.
    fn name(&self) -> &str;

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError>;

    /// Discard state accumulated across frames. Stateless filters keep the default.
    fn reset(&mut self) {}
}
