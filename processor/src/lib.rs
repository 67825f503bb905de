pub mod dispatcher;
pub mod error;
pub mod filter;

pub use dispatcher::ImageProcessor;
pub use error::FilterError;
pub use filter::FrameFilter;
