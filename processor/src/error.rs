#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("opencv call failed: {0}")]
    OpenCv(#[from] opencv::Error),
    #[error("filter index {index} out of range, {len} filters available")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("input frame is empty")]
    EmptyFrame,
}
