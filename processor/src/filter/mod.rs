pub mod binarization;
pub mod edges;
pub mod harris;
pub mod optical_flow;
pub mod passthrough;
pub mod traits;

pub use traits::FrameFilter;

use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::FilterError;

/// Convert a BGR frame to single-channel gray. Gray input is copied as is.
pub(crate) fn to_gray(frame: &Mat) -> Result<Mat, FilterError> {
    if frame.empty() {
        return Err(FilterError::EmptyFrame);
    }
    if frame.channels() == 1 {
        return Ok(frame.try_clone()?);
    }
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Gray conversion followed by a square Gaussian blur with sigma derived from the kernel.
pub(crate) fn blurred_gray(frame: &Mat, kernel: i32) -> Result<Mat, FilterError> {
    let gray = to_gray(frame)?;
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(&gray, &mut blurred, Size::new(kernel, kernel), 0.0)?;
    Ok(blurred)
}


#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core;

    #[test]
    fn gray_of_split_frame() {
        let frame = test_frames::split(16, 16);
        let gray = to_gray(&frame).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(*gray.at_2d::<u8>(0, 0).unwrap(), 0);
        assert_eq!(*gray.at_2d::<u8>(0, 15).unwrap(), 255);
    }

    #[test]
    fn gray_input_passes_through() {
        let gray =
            Mat::new_rows_cols_with_default(4, 4, core::CV_8UC1, core::Scalar::all(42.0)).unwrap();
        let out = to_gray(&gray).unwrap();
        assert!(test_frames::same_pixels(&gray, &out));
    }

    #[test]
    fn empty_frame_rejected() {
        assert!(matches!(to_gray(&Mat::default()), Err(FilterError::EmptyFrame)));
    }
}
