use live_filters_common::config::DisplayConfig;
use opencv::core::Mat;
use opencv::highgui;
use tracing::debug;

/// The raw and processed stream windows. Destroyed on drop.
pub struct Windows {
    original: Option<String>,
    processed: String,
}

impl Windows {
    pub fn open(config: &DisplayConfig) -> opencv::Result<Self> {
        let original = if config.hide_original {
            None
        } else {
            highgui::named_window(&config.original_window, highgui::WINDOW_AUTOSIZE)?;
            Some(config.original_window.clone())
        };
        highgui::named_window(&config.processed_window, highgui::WINDOW_AUTOSIZE)?;
        debug!(
            original = original.is_some(),
            processed = config.processed_window,
            "created windows"
        );
        Ok(Self {
            original,
            processed: config.processed_window.clone(),
        })
    }

    pub fn show(&self, raw: &Mat, processed: &Mat) -> opencv::Result<()> {
        if let Some(name) = &self.original {
            highgui::imshow(name, raw)?;
        }
        highgui::imshow(&self.processed, processed)
    }

    /// Let the GUI process events for `wait_ms`; returns a key pressed in any window.
    pub fn pump(&self, wait_ms: i32) -> opencv::Result<Option<i32>> {
        let key = highgui::wait_key_ex(wait_ms)?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for Windows {
    fn drop(&mut self) {
        if let Some(name) = &self.original {
            let _ = highgui::destroy_window(name);
        }
        let _ = highgui::destroy_window(&self.processed);
    }
}
