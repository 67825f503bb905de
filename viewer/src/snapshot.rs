use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};
use live_filters_common::frame::CapturedFrame;
use opencv::core::{self, Mat};
use opencv::prelude::*;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported frame layout: {channels} channels, depth {depth}")]
    Unsupported { channels: i32, depth: i32 },
    #[error("frame buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("failed to access frame: {0}")]
    OpenCv(#[from] opencv::Error),
    #[error("failed to create snapshot directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),
}

/// Copy an 8-bit gray or BGR `Mat` into an `image` buffer (BGR becomes RGB).
pub fn mat_to_image(mat: &Mat) -> Result<DynamicImage, SnapshotError> {
    let channels = mat.channels();
    let depth = mat.depth();
    if mat.empty() || depth != core::CV_8U || !matches!(channels, 1 | 3) {
        return Err(SnapshotError::Unsupported { channels, depth });
    }

    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let continuous;
    let data = if mat.is_continuous() {
        mat.data_bytes()?
    } else {
        continuous = mat.try_clone()?;
        continuous.data_bytes()?
    };

    let image = if channels == 1 {
        GrayImage::from_raw(width, height, data.to_vec()).map(DynamicImage::ImageLuma8)
    } else {
        let rgb = data
            .chunks_exact(3)
            .flat_map(|bgr| [bgr[2], bgr[1], bgr[0]])
            .collect();
        RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
    };
    image.ok_or(SnapshotError::Buffer { width, height })
}

/// Write `processed` as PNG under `dir`, named after the source frame and filter.
pub fn save(
    dir: &Path,
    frame: &CapturedFrame,
    filter_name: &str,
    processed: &Mat,
) -> Result<PathBuf, SnapshotError> {
    let image = mat_to_image(processed)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(frame.snapshot_name(filter_name));
    image.save(&path)?;
    info!(
        path = %path.display(),
        seq = frame.seq,
        filter = filter_name,
        "saved snapshot"
    );
    Ok(path)
}
