use opencv::core::Mat;
use opencv::prelude::*;

/// A camera or video frame with capture metadata.
///
/// `mat` is 8-bit BGR as delivered by `VideoCapture::read`.
#[derive(Debug)]
pub struct CapturedFrame {
    pub mat: Mat,
    pub captured_at_ms: i64,
    pub seq: u64,
}

impl CapturedFrame {
    pub fn new(mat: Mat, captured_at_ms: i64, seq: u64) -> Self {
        Self {
            mat,
            captured_at_ms,
            seq,
        }
    }

    /// Wrap a frame stamped with the current wall-clock time.
    pub fn now(mat: Mat, seq: u64) -> Self {
        Self::new(mat, chrono::Utc::now().timestamp_millis(), seq)
    }

    /// Deep copy, pixels included.
    pub fn try_clone(&self) -> opencv::Result<Self> {
        Ok(Self::new(self.mat.try_clone()?, self.captured_at_ms, self.seq))
    }

    /// File name for a snapshot of this frame processed by `filter_name`.
    pub fn snapshot_name(&self, filter_name: &str) -> String {
        let dt = chrono::DateTime::from_timestamp_millis(self.captured_at_ms)
            .unwrap_or_else(chrono::Utc::now);
        let ts = dt.format("%Y%m%dT%H%M%S%3fZ");
        format!(
            "{ts}_{seq:06}_{slug}.png",
            seq = self.seq,
            slug = slugify(filter_name)
        )
    }
}

/// The previous and current frame handed to a filter on each tick.
#[derive(Debug, Clone, Copy)]
pub struct FramePair<'a> {
    pub prev: &'a Mat,
    pub curr: &'a Mat,
}

impl<'a> FramePair<'a> {
    pub fn new(prev: &'a Mat, curr: &'a Mat) -> Self {
        Self { prev, curr }
    }
}

/// Lowercase ASCII alphanumerics separated by single dashes.
/// e.g. "edge detection (sobel x-direction)" -> "edge-detection-sobel-x-direction"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
