use live_filters_common::config::ThresholdParams;
use live_filters_common::frame::FramePair;
use opencv::core::Mat;
use opencv::imgproc;

use super::{blurred_gray, FrameFilter};
use crate::error::FilterError;

const MAX_VALUE: f64 = 255.0;

/// Blurred gray image cut at one fixed level.
pub struct GlobalThreshold {
    params: ThresholdParams,
}

impl GlobalThreshold {
    pub fn new(params: ThresholdParams) -> Self {
        Self { params }
    }
}

impl FrameFilter for GlobalThreshold {
    fn name(&self) -> &str {
        "binarization (global threshold)"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let blurred = blurred_gray(frames.curr, self.params.blur_kernel)?;
        let mut binary = Mat::default();
        imgproc::threshold(
            &blurred,
            &mut binary,
            self.params.global_threshold,
            MAX_VALUE,
            imgproc::THRESH_BINARY,
        )?;
        Ok(binary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveMethod {
    Mean,
    Gaussian,
}

impl AdaptiveMethod {
    fn cv_flag(self) -> i32 {
        match self {
            AdaptiveMethod::Mean => imgproc::ADAPTIVE_THRESH_MEAN_C,
            AdaptiveMethod::Gaussian => imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
        }
    }
}

/// Per-pixel threshold from the (mean or Gaussian-weighted) neighborhood minus a constant.
pub struct AdaptiveThreshold {
    method: AdaptiveMethod,
    params: ThresholdParams,
}

impl AdaptiveThreshold {
    pub fn new(method: AdaptiveMethod, params: ThresholdParams) -> Self {
        Self { method, params }
    }
}

impl FrameFilter for AdaptiveThreshold {
    fn name(&self) -> &str {
        match self.method {
            AdaptiveMethod::Mean => "binarization (adaptive mean threshold)",
            AdaptiveMethod::Gaussian => "binarization (adaptive gauss threshold)",
        }
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let blurred = blurred_gray(frames.curr, self.params.blur_kernel)?;
        let mut binary = Mat::default();
        imgproc::adaptive_threshold(
            &blurred,
            &mut binary,
            MAX_VALUE,
            self.method.cv_flag(),
            imgproc::THRESH_BINARY,
            self.params.adaptive_block_size,
            self.params.adaptive_c,
        )?;
        Ok(binary)
    }
}
