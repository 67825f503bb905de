use std::fmt;
use std::path::PathBuf;

use live_filters_common::config::CaptureConfig;
use live_filters_common::frame::CapturedFrame;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("cannot open video stream ({0})")]
    Open(SourceKind),
    #[error("capture failed: {0}")]
    OpenCv(#[from] opencv::Error),
}

/// Where frames come from. A configured file takes precedence over the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Camera(i32),
    File(PathBuf),
}

impl SourceKind {
    pub fn from_config(config: &CaptureConfig) -> Self {
        match &config.file {
            Some(path) => SourceKind::File(path.clone()),
            None => SourceKind::Camera(config.device),
        }
    }

    fn open(&self) -> Result<VideoCapture, CaptureError> {
        let capture = match self {
            SourceKind::Camera(device) => VideoCapture::new(*device, videoio::CAP_ANY)?,
            SourceKind::File(path) => {
                VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?
            }
        };
        if !capture.is_opened()? {
            return Err(CaptureError::Open(self.clone()));
        }
        Ok(capture)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Camera(device) => write!(f, "camera {device}"),
            SourceKind::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[derive(Debug)]
pub enum ReadOutcome {
    Frame(CapturedFrame),
    /// The video file ended and was reopened; this is its first frame again.
    Rewound(CapturedFrame),
    Ended,
}

/// Anything the main loop can pull frames from.
pub trait Frames {
    fn kind(&self) -> &SourceKind;
    fn read(&mut self) -> Result<ReadOutcome, CaptureError>;
}

pub struct FrameSource {
    capture: VideoCapture,
    kind: SourceKind,
    loop_video: bool,
    seq: u64,
}

impl FrameSource {
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let kind = SourceKind::from_config(config);
        let capture = kind.open()?;
        info!(source = %kind, "opened video stream");
        Ok(Self {
            capture,
            kind,
            loop_video: config.loop_video,
            seq: 0,
        })
    }

    fn grab(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }
        self.seq += 1;
        Ok(Some(CapturedFrame::now(mat, self.seq)))
    }
}

impl Frames for FrameSource {
    fn kind(&self) -> &SourceKind {
        &self.kind
    }

    fn read(&mut self) -> Result<ReadOutcome, CaptureError> {
        if let Some(frame) = self.grab()? {
            return Ok(ReadOutcome::Frame(frame));
        }
        if !matches!(self.kind, SourceKind::File(_)) || !self.loop_video {
            info!(source = %self.kind, frames = self.seq, "end of stream");
            return Ok(ReadOutcome::Ended);
        }

        debug!(source = %self.kind, frames = self.seq, "end of video, reopening");
        self.capture = self.kind.open()?;
        match self.grab()? {
            Some(frame) => Ok(ReadOutcome::Rewound(frame)),
            // Reopened file yields nothing: it has no decodable frames at all.
            None => Ok(ReadOutcome::Ended),
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{self, Scalar, Size};
    use opencv::videoio::VideoWriter;
    use std::path::Path;

    /// Write an MJPEG clip of `frames` uniformly gray frames.
    fn write_clip(dir: &Path, frames: usize) -> PathBuf {
        let path = dir.join("clip.avi");
        let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G').unwrap();
        let mut writer =
            VideoWriter::new(&path.to_string_lossy(), fourcc, 10.0, Size::new(32, 24), true)
                .unwrap();
        assert!(writer.is_opened().unwrap());
        for i in 0..frames {
            let value = 40.0 * (i + 1) as f64;
            let mat = Mat::new_rows_cols_with_default(24, 32, core::CV_8UC3, Scalar::all(value))
                .unwrap();
            writer.write(&mat).unwrap();
        }
        writer.release().unwrap();
        path
    }

    fn clip_config(path: PathBuf, loop_video: bool) -> CaptureConfig {
        let mut config = CaptureConfig::default();
        config.file = Some(path);
        config.loop_video = loop_video;
        config
    }

    fn label(outcome: &ReadOutcome) -> (&'static str, u64) {
        match outcome {
            ReadOutcome::Frame(f) => ("frame", f.seq),
            ReadOutcome::Rewound(f) => ("rewound", f.seq),
            ReadOutcome::Ended => ("ended", 0),
        }
    }

    #[test]
    fn file_takes_precedence() {
        let mut config = CaptureConfig::default();
        config.device = 3;
        assert_eq!(SourceKind::from_config(&config), SourceKind::Camera(3));

        config.file = Some(PathBuf::from("clip.mp4"));
        assert_eq!(
            SourceKind::from_config(&config),
            SourceKind::File(PathBuf::from("clip.mp4"))
        );
    }

    #[test]
    fn display_names_source() {
        assert_eq!(SourceKind::Camera(1).to_string(), "camera 1");
        assert_eq!(
            SourceKind::File(PathBuf::from("a/b.mp4")).to_string(),
            "file a/b.mp4"
        );
    }

    #[test]
    fn missing_file_fails_to_open() {
        let mut config = CaptureConfig::default();
        config.file = Some(PathBuf::from("/nonexistent/live-filters-test.mp4"));
        assert!(FrameSource::open(&config).is_err());
    }

    #[test]
    fn looping_file_rewinds_and_keeps_counting() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_clip(dir.path(), 3);
        let mut source = FrameSource::open(&clip_config(path, true)).unwrap();

        let outcomes: Vec<_> = (0..5).map(|_| label(&source.read().unwrap())).collect();
        assert_eq!(
            outcomes,
            [
                ("frame", 1),
                ("frame", 2),
                ("frame", 3),
                ("rewound", 4),
                ("frame", 5)
            ]
        );
    }

    #[test]
    fn file_without_loop_ends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_clip(dir.path(), 2);
        let mut source = FrameSource::open(&clip_config(path, false)).unwrap();

        let outcomes: Vec<_> = (0..3).map(|_| label(&source.read().unwrap())).collect();
        assert_eq!(outcomes, [("frame", 1), ("frame", 2), ("ended", 0)]);
    }

    #[test]
    fn single_frame_file_rewinds_every_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_clip(dir.path(), 1);
        let mut source = FrameSource::open(&clip_config(path, true)).unwrap();

        let outcomes: Vec<_> = (0..3).map(|_| label(&source.read().unwrap())).collect();
        assert_eq!(outcomes, [("frame", 1), ("rewound", 2), ("rewound", 3)]);
    }
}
