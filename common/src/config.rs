use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub device: i32,
    /// Video file to play instead of a camera. Takes precedence over `device`.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Rewind video files at end of stream.
    #[serde(default = "default_true")]
    pub loop_video: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub hide_original: bool,
    #[serde(default = "default_original_window")]
    pub original_window: String,
    #[serde(default = "default_processed_window")]
    pub processed_window: String,
    #[serde(default = "default_wait_key_ms")]
    pub wait_key_ms: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub threshold: ThresholdParams,
    #[serde(default)]
    pub edges: EdgeParams,
    #[serde(default)]
    pub optical_flow: OpticalFlowParams,
    #[serde(default)]
    pub harris: HarrisParams,
}

/// Parameters shared by the three binarization filters.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdParams {
    #[serde(default = "default_threshold_blur")]
    pub blur_kernel: i32,
    #[serde(default = "default_global_threshold")]
    pub global_threshold: f64,
    #[serde(default = "default_adaptive_block_size")]
    pub adaptive_block_size: i32,
    #[serde(default = "default_adaptive_c")]
    pub adaptive_c: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeParams {
    #[serde(default = "default_edge_blur")]
    pub blur_kernel: i32,
    #[serde(default = "default_sobel_kernel")]
    pub sobel_kernel: i32,
    #[serde(default = "default_canny_low")]
    pub canny_low: f64,
    #[serde(default = "default_canny_high")]
    pub canny_high: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpticalFlowParams {
    #[serde(default = "default_max_corners")]
    pub max_corners: i32,
    #[serde(default = "default_quality_level")]
    pub quality_level: f64,
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_feature_block_size")]
    pub block_size: i32,
    #[serde(default = "default_win_size")]
    pub win_size: i32,
    #[serde(default = "default_max_level")]
    pub max_level: i32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: i32,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarrisParams {
    #[serde(default = "default_harris_block_size")]
    pub block_size: i32,
    #[serde(default = "default_harris_ksize")]
    pub ksize: i32,
    #[serde(default = "default_harris_k")]
    pub k: f64,
    /// Fraction of the strongest response a pixel must exceed to be marked.
    #[serde(default = "default_harris_ratio")]
    pub response_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// The terminal belongs to the text UI, so logs go to a file.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: 0,
            file: None,
            loop_video: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hide_original: false,
            original_window: default_original_window(),
            processed_window: default_processed_window(),
            wait_key_ms: default_wait_key_ms(),
        }
    }
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            blur_kernel: default_threshold_blur(),
            global_threshold: default_global_threshold(),
            adaptive_block_size: default_adaptive_block_size(),
            adaptive_c: default_adaptive_c(),
        }
    }
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            blur_kernel: default_edge_blur(),
            sobel_kernel: default_sobel_kernel(),
            canny_low: default_canny_low(),
            canny_high: default_canny_high(),
        }
    }
}

impl Default for OpticalFlowParams {
    fn default() -> Self {
        Self {
            max_corners: default_max_corners(),
            quality_level: default_quality_level(),
            min_distance: default_min_distance(),
            block_size: default_feature_block_size(),
            win_size: default_win_size(),
            max_level: default_max_level(),
            max_iterations: default_max_iterations(),
            epsilon: default_epsilon(),
        }
    }
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            block_size: default_harris_block_size(),
            ksize: default_harris_ksize(),
            k: default_harris_k(),
            response_ratio: default_harris_ratio(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter values OpenCV would refuse at the first processed frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.filters.threshold;
        check_odd_kernel("filters.threshold.blur_kernel", t.blur_kernel)?;
        check_odd_kernel("filters.threshold.adaptive_block_size", t.adaptive_block_size)?;
        if t.adaptive_block_size < 3 {
            return Err(ConfigError::Invalid(
                "filters.threshold.adaptive_block_size must be at least 3".into(),
            ));
        }

        let e = &self.filters.edges;
        check_odd_kernel("filters.edges.blur_kernel", e.blur_kernel)?;
        if !matches!(e.sobel_kernel, 1 | 3 | 5 | 7) {
            return Err(ConfigError::Invalid(format!(
                "filters.edges.sobel_kernel must be 1, 3, 5 or 7, got {}",
                e.sobel_kernel
            )));
        }
        if e.canny_low > e.canny_high {
            return Err(ConfigError::Invalid(format!(
                "filters.edges.canny_low ({}) exceeds canny_high ({})",
                e.canny_low, e.canny_high
            )));
        }

        let of = &self.filters.optical_flow;
        if of.max_corners <= 0 || of.win_size <= 0 || of.max_level < 0 {
            return Err(ConfigError::Invalid(
                "filters.optical_flow needs max_corners > 0, win_size > 0 and max_level >= 0"
                    .into(),
            ));
        }
        if !(0.0..=1.0).contains(&of.quality_level) || of.quality_level == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "filters.optical_flow.quality_level must be in (0, 1], got {}",
                of.quality_level
            )));
        }

        if of.max_iterations <= 0 {
            return Err(ConfigError::Invalid(format!(
                "filters.optical_flow.max_iterations must be positive, got {}",
                of.max_iterations
            )));
        }
        if !(of.epsilon > 0.0 && of.epsilon.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "filters.optical_flow.epsilon must be a positive number, got {}",
                of.epsilon
            )));
        }

        let h = &self.filters.harris;
        check_odd_kernel("filters.harris.ksize", h.ksize)?;
        if h.block_size <= 0 {
            return Err(ConfigError::Invalid(
                "filters.harris.block_size must be positive".into(),
            ));
        }
        if !(h.response_ratio > 0.0 && h.response_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "filters.harris.response_ratio must be in (0, 1], got {}",
                h.response_ratio
            )));
        }

        if self.display.wait_key_ms <= 0 {
            return Err(ConfigError::Invalid(
                "display.wait_key_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn check_odd_kernel(field: &str, size: i32) -> Result<(), ConfigError> {
    if size <= 0 || size % 2 == 0 {
        return Err(ConfigError::Invalid(format!(
            "{field} must be a positive odd number, got {size}"
        )));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_original_window() -> String {
    "original camera stream".into()
}
fn default_processed_window() -> String {
    "processed camera stream".into()
}
fn default_wait_key_ms() -> i32 {
    10
}
fn default_threshold_blur() -> i32 {
    5
}
fn default_global_threshold() -> f64 {
    127.0
}
fn default_adaptive_block_size() -> i32 {
    21
}
fn default_adaptive_c() -> f64 {
    8.0
}
fn default_edge_blur() -> i32 {
    3
}
fn default_sobel_kernel() -> i32 {
    5
}
fn default_canny_low() -> f64 {
    100.0
}
fn default_canny_high() -> f64 {
    200.0
}
fn default_max_corners() -> i32 {
    100
}
fn default_quality_level() -> f64 {
    0.3
}
fn default_min_distance() -> f64 {
    7.0
}
fn default_feature_block_size() -> i32 {
    7
}
fn default_win_size() -> i32 {
    15
}
fn default_max_level() -> i32 {
    2
}
fn default_max_iterations() -> i32 {
    10
}
fn default_epsilon() -> f64 {
    0.03
}
fn default_harris_block_size() -> i32 {
    2
}
fn default_harris_ksize() -> i32 {
    3
}
fn default_harris_k() -> f64 {
    0.04
}
fn default_harris_ratio() -> f64 {
    0.01
}
fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("live-filters.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.capture.device, 0);
        assert!(config.capture.file.is_none());
        assert!(config.capture.loop_video);
        assert_eq!(config.display.processed_window, "processed camera stream");
        assert_eq!(config.display.wait_key_ms, 10);
        assert_eq!(config.filters.threshold.adaptive_block_size, 21);
        assert_eq!(config.filters.optical_flow.max_corners, 100);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [capture]
            file = "clip.mp4"

            [filters.edges]
            canny_low = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.file, Some(PathBuf::from("clip.mp4")));
        assert!(config.capture.loop_video);
        assert_eq!(config.filters.edges.canny_low, 50.0);
        assert_eq!(config.filters.edges.canny_high, 200.0);
        assert_eq!(config.filters.edges.sobel_kernel, 5);
    }

    #[test]
    fn even_kernel_rejected() {
        let mut config = Config::default();
        config.filters.threshold.blur_kernel = 4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blur_kernel"));
    }

    #[test]
    fn inverted_canny_thresholds_rejected() {
        let mut config = Config::default();
        config.filters.edges.canny_low = 250.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_sobel_kernel_rejected() {
        let mut config = Config::default();
        config.filters.edges.sobel_kernel = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = Config::default();
        config.filters.optical_flow.win_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn harris_ratio_outside_unit_interval_rejected() {
        for ratio in [-0.5, 0.0, 1.5] {
            let mut config = Config::default();
            config.filters.harris.response_ratio = ratio;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("response_ratio"), "{ratio}: {err}");
        }
    }

    #[test]
    fn lk_termination_must_be_positive() {
        let mut config = Config::default();
        config.filters.optical_flow.max_iterations = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_iterations"));

        let mut config = Config::default();
        config.filters.optical_flow.epsilon = -0.03;
        assert!(config.validate().unwrap_err().to_string().contains("epsilon"));
    }

    #[test]
    fn example_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../../config.example.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.snapshot.dir, PathBuf::from("snapshots"));
        assert_eq!(config.filters.harris.ksize, 3);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load(Path::new("/nonexistent/live-filters.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(..)));
    }
}
