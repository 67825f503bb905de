use live_filters_common::config::HarrisParams;
use live_filters_common::frame::FramePair;
use opencv::core::{self, Mat, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use super::{to_gray, FrameFilter};
use crate::error::FilterError;

/// Pure red in BGR order.
fn mark_color() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Harris corner response; pixels above `response_ratio` of the strongest
/// response are painted red on a color copy of the frame.
pub struct HarrisCorners {
    params: HarrisParams,
}

impl HarrisCorners {
    pub fn new(params: HarrisParams) -> Self {
        Self { params }
    }

    fn response(&self, gray: &Mat) -> Result<Mat, FilterError> {
        let mut response = Mat::default();
        imgproc::corner_harris(
            gray,
            &mut response,
            self.params.block_size,
            self.params.ksize,
            self.params.k,
            core::BORDER_DEFAULT,
        )?;
        // Thicken the marks so single-pixel corners stay visible.
        let mut dilated = Mat::default();
        imgproc::dilate_def(&response, &mut dilated, &Mat::default())?;
        Ok(dilated)
    }
}

impl FrameFilter for HarrisCorners {
    fn name(&self) -> &str {
        "corner detection (harris)"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let gray = to_gray(frames.curr)?;
        let response = self.response(&gray)?;

        let mut max_response = 0.0;
        core::min_max_loc(
            &response,
            None,
            Some(&mut max_response),
            None,
            None,
            &core::no_array(),
        )?;

        let mut out = if frames.curr.channels() == 1 {
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(frames.curr, &mut bgr, imgproc::COLOR_GRAY2BGR)?;
            bgr
        } else {
            frames.curr.try_clone()?
        };
        if max_response <= 0.0 {
            return Ok(out);
        }

        let mut above = Mat::default();
        imgproc::threshold(
            &response,
            &mut above,
            max_response * self.params.response_ratio,
            255.0,
            imgproc::THRESH_BINARY,
        )?;
        let mut mask = Mat::default();
        above.convert_to(&mut mask, core::CV_8U, 1.0, 0.0)?;
        out.set_to(&mark_color(), &mask)?;
        Ok(out)
    }
}
