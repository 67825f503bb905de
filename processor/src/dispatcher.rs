use live_filters_common::config::FilterConfig;
use live_filters_common::frame::FramePair;
use opencv::core::Mat;
use tracing::{debug, info};

use crate::error::FilterError;
use crate::filter::binarization::{AdaptiveMethod, AdaptiveThreshold, GlobalThreshold};
use crate::filter::edges::{Canny, Sobel, SobelDirection};
use crate::filter::harris::HarrisCorners;
use crate::filter::optical_flow::OpticalFlow;
use crate::filter::passthrough::{Grayscale, Original};
use crate::filter::FrameFilter;

/// Ordered list of filters plus the index of the one applied to each frame.
///
/// Changing the selection resets the newly selected filter, so a filter
/// never resumes with state left over from an earlier visit.
pub struct ImageProcessor {
    filters: Vec<Box<dyn FrameFilter>>,
    selected: usize,
}

impl ImageProcessor {
    /// Build a dispatcher over `filters`, starting at index 0.
    ///
    /// Returns `IndexOutOfRange` for an empty list since nothing could be selected.
    pub fn new(filters: Vec<Box<dyn FrameFilter>>) -> Result<Self, FilterError> {
        if filters.is_empty() {
            return Err(FilterError::IndexOutOfRange { index: 0, len: 0 });
        }
        Ok(Self {
            filters,
            selected: 0,
        })
    }

    /// The fixed registry shown in the text UI, in display order.
    pub fn with_default_filters(config: &FilterConfig) -> Result<Self, FilterError> {
        let filters: Vec<Box<dyn FrameFilter>> = vec![
            Box::new(Original),
            Box::new(Grayscale),
            Box::new(GlobalThreshold::new(config.threshold.clone())),
            Box::new(AdaptiveThreshold::new(
                AdaptiveMethod::Mean,
                config.threshold.clone(),
            )),
            Box::new(AdaptiveThreshold::new(
                AdaptiveMethod::Gaussian,
                config.threshold.clone(),
            )),
            Box::new(Sobel::new(SobelDirection::X, config.edges.clone())),
            Box::new(Sobel::new(SobelDirection::Y, config.edges.clone())),
            Box::new(Sobel::new(SobelDirection::XY, config.edges.clone())),
            Box::new(Canny::new(config.edges.clone())),
            Box::new(OpticalFlow::new(config.optical_flow.clone())),
            Box::new(HarrisCorners::new(config.harris.clone())),
        ];
        let mut processor = Self::new(filters)?;
        processor.select(config.start_index)?;
        Ok(processor)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn selected_idx(&self) -> usize {
        self.selected
    }

    pub fn selected_name(&self) -> &str {
        self.filters[self.selected].name()
    }

    /// One line per filter: zero-padded index and name.
    pub fn algorithm_names(&self) -> Vec<String> {
        self.filters
            .iter()
            .enumerate()
            .map(|(idx, filter)| format!("{idx:03} {}", filter.name()))
            .collect()
    }

    /// Run the selected filter on one frame pair.
    pub fn process(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        self.filters[self.selected].apply(frames)
    }

    pub fn select(&mut self, index: usize) -> Result<(), FilterError> {
        if index >= self.filters.len() {
            return Err(FilterError::IndexOutOfRange {
                index,
                len: self.filters.len(),
            });
        }
        self.switch_to(index);
        Ok(())
    }

    pub fn next_algorithm(&mut self) {
        self.switch_to((self.selected + 1) % self.filters.len());
    }

    pub fn prev_algorithm(&mut self) {
        let len = self.filters.len();
        self.switch_to((self.selected + len - 1) % len);
    }

    /// Drop the selected filter's accumulated state so it starts over on the next frame.
    pub fn reset(&mut self) {
        debug!(filter = self.selected_name(), "resetting filter state");
        self.filters[self.selected].reset();
    }

    fn switch_to(&mut self, index: usize) {
        self.selected = index;
        self.filters[index].reset();
        info!(index, filter = self.filters[index].name(), "selected filter");
    }
}
