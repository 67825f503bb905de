use std::fmt;

use live_filters_common::config::EdgeParams;
use live_filters_common::frame::FramePair;
use opencv::core::{self, Mat};
use opencv::imgproc;

use super::{blurred_gray, FrameFilter};
use crate::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SobelDirection {
    X,
    Y,
    XY,
}

impl SobelDirection {
    /// Derivative orders `(dx, dy)` passed to `Sobel`.
    fn orders(self) -> (i32, i32) {
        match self {
            SobelDirection::X => (1, 0),
            SobelDirection::Y => (0, 1),
            SobelDirection::XY => (1, 1),
        }
    }
}

impl fmt::Display for SobelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SobelDirection::X => write!(f, "x"),
            SobelDirection::Y => write!(f, "y"),
            SobelDirection::XY => write!(f, "xy"),
        }
    }
}

/// Sobel derivative of the blurred gray frame, saturated to 8 bits.
///
/// Negative gradients clamp to zero, so only dark-to-bright transitions
/// along the chosen axis show up.
pub struct Sobel {
    direction: SobelDirection,
    params: EdgeParams,
    name: String,
}

impl Sobel {
    pub fn new(direction: SobelDirection, params: EdgeParams) -> Self {
        Self {
            direction,
            params,
            name: format!("edge detection (sobel {direction}-direction)"),
        }
    }
}

impl FrameFilter for Sobel {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let blurred = blurred_gray(frames.curr, self.params.blur_kernel)?;
        let (dx, dy) = self.direction.orders();
        let mut edges = Mat::default();
        imgproc::sobel(
            &blurred,
            &mut edges,
            core::CV_8U,
            dx,
            dy,
            self.params.sobel_kernel,
            1.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;
        Ok(edges)
    }
}

pub struct Canny {
    params: EdgeParams,
}

impl Canny {
    pub fn new(params: EdgeParams) -> Self {
        Self { params }
    }
}

impl FrameFilter for Canny {
    fn name(&self) -> &str {
        "edge detection (canny)"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let blurred = blurred_gray(frames.curr, self.params.blur_kernel)?;
        let mut edges = Mat::default();
        imgproc::canny_def(
            &blurred,
            &mut edges,
            self.params.canny_low,
            self.params.canny_high,
        )?;
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_frames;
    use opencv::prelude::*;

    fn sobel(direction: SobelDirection, frame: &Mat) -> Mat {
        Sobel::new(direction, EdgeParams::default())
            .apply(&FramePair::new(frame, frame))
            .unwrap()
    }

    #[test]
    fn names_follow_direction() {
        let params = EdgeParams::default();
        assert_eq!(
            Sobel::new(SobelDirection::X, params.clone()).name(),
            "edge detection (sobel x-direction)"
        );
        assert_eq!(
            Sobel::new(SobelDirection::XY, params).name(),
            "edge detection (sobel xy-direction)"
        );
    }

    #[test]
    fn vertical_edge_shows_in_x_only() {
        let frame = test_frames::split(32, 64);
        let x = sobel(SobelDirection::X, &frame);
        let y = sobel(SobelDirection::Y, &frame);
        assert_eq!(x.typ(), core::CV_8UC1);
        assert!(core::count_non_zero(&x).unwrap() > 0);
        assert_eq!(core::count_non_zero(&y).unwrap(), 0);
    }

    #[test]
    fn mixed_derivative_fires_at_corners() {
        let frame = test_frames::square(64, 64, 20, 20, 24);
        let xy = sobel(SobelDirection::XY, &frame);
        assert!(core::count_non_zero(&xy).unwrap() > 0);
        // Straight edge alone has no mixed derivative.
        let split = test_frames::split(32, 64);
        assert_eq!(core::count_non_zero(&sobel(SobelDirection::XY, &split)).unwrap(), 0);
    }

    #[test]
    fn canny_finds_edge_and_ignores_flat_frame() {
        let mut canny = Canny::new(EdgeParams::default());
        let edge = test_frames::split(32, 64);
        let out = canny.apply(&FramePair::new(&edge, &edge)).unwrap();
        assert!(test_frames::is_binary(&out));
        assert!(core::count_non_zero(&out).unwrap() > 0);

        let flat = test_frames::uniform(32, 64, 128.0);
        let out = canny.apply(&FramePair::new(&flat, &flat)).unwrap();
        assert_eq!(core::count_non_zero(&out).unwrap(), 0);
    }
}
