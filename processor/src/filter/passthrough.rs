use live_filters_common::frame::FramePair;
use opencv::core::Mat;
use opencv::prelude::*;

use super::{to_gray, FrameFilter};
use crate::error::FilterError;

/// Shows the current frame unchanged.
pub struct Original;

impl FrameFilter for Original {
    fn name(&self) -> &str {
        "original"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        if frames.curr.empty() {
            return Err(FilterError::EmptyFrame);
        }
        Ok(frames.curr.try_clone()?)
    }
}

pub struct Grayscale;

impl FrameFilter for Grayscale {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        to_gray(frames.curr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_frames;

    #[test]
    fn original_returns_current_frame() {
        let prev = test_frames::uniform(8, 8, 10.0);
        let curr = test_frames::split(8, 8);
        let out = Original.apply(&FramePair::new(&prev, &curr)).unwrap();
        assert!(test_frames::same_pixels(&out, &curr));
    }

    #[test]
    fn grayscale_is_single_channel() {
        let curr = test_frames::split(8, 12);
        let out = Grayscale.apply(&FramePair::new(&curr, &curr)).unwrap();
        assert_eq!(out.channels(), 1);
        assert_eq!(out.rows(), 8);
        assert_eq!(out.cols(), 12);
    }

    #[test]
    fn original_rejects_empty_frame() {
        let empty = Mat::default();
        assert!(Original.apply(&FramePair::new(&empty, &empty)).is_err());
    }
}
