//! Detection and output configuration.
//!
//! Every tunable lives in an explicit, immutable options value that is passed
//! into each call. Nothing is process-wide, so several pipeline runs (for
//! example batch-processing many files) cannot interfere with each other.
//!
//! # Example
//!
//! ```
//! use scenestill::{DetectionOptions, ImageFormat, OutputOptions, PipelineConfig};
//!
//! let config = PipelineConfig::new()
//!     .with_detection(
//!         DetectionOptions::new()
//!             .ratio_threshold(6.0)
//!             .min_interval_seconds(2.0),
//!     )
//!     .with_output(OutputOptions::new().format(ImageFormat::Png));
//!
//! assert_eq!(config.detection().ratio_threshold, 6.0);
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SceneStillError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Default size multiple over the baseline required to flag a candidate.
pub const DEFAULT_RATIO_THRESHOLD: f64 = 9.0;
/// Default minimum spacing between accepted candidates, in seconds.
pub const DEFAULT_MIN_INTERVAL_SECONDS: f64 = 1.0;
/// Default number of prior packets averaged into the baseline.
pub const DEFAULT_ROLLING_WINDOW_SIZE: usize = 5;
/// Default number of packets observed before detection begins.
pub const DEFAULT_MINIMUM_WARMUP_PACKETS: usize = 5;
/// Default number of prior packets used for the frame-type median.
pub const DEFAULT_MEDIAN_WINDOW_SIZE: usize = 20;

/// Settings for the packet-size scene detector.
///
/// The defaults work for typical H.264/HEVC content. Lower
/// [`ratio_threshold`](DetectionOptions::ratio_threshold) to catch softer
/// cuts; raise it to only report hard cuts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionOptions {
    /// Size multiple over the rolling baseline a packet must exceed.
    pub ratio_threshold: f64,
    /// Minimum time between two accepted candidates.
    pub min_interval_seconds: f64,
    /// Number of prior packet sizes averaged into the baseline.
    pub rolling_window_size: usize,
    /// Packets (including the current one) to observe before detecting.
    pub minimum_warmup_packets: usize,
    /// Number of prior packet sizes the frame-type median is taken over.
    pub median_window_size: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
            min_interval_seconds: DEFAULT_MIN_INTERVAL_SECONDS,
            rolling_window_size: DEFAULT_ROLLING_WINDOW_SIZE,
            minimum_warmup_packets: DEFAULT_MINIMUM_WARMUP_PACKETS,
            median_window_size: DEFAULT_MEDIAN_WINDOW_SIZE,
        }
    }
}

impl DetectionOptions {
    /// Create detection options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size-ratio threshold.
    #[must_use]
    pub fn ratio_threshold(mut self, threshold: f64) -> Self {
        self.ratio_threshold = threshold;
        self
    }

    /// Set the minimum interval between candidates.
    #[must_use]
    pub fn min_interval_seconds(mut self, seconds: f64) -> Self {
        self.min_interval_seconds = seconds;
        self
    }

    /// Set the baseline window size.
    #[must_use]
    pub fn rolling_window_size(mut self, size: usize) -> Self {
        self.rolling_window_size = size;
        self
    }

    /// Set the warm-up packet count.
    #[must_use]
    pub fn minimum_warmup_packets(mut self, packets: usize) -> Self {
        self.minimum_warmup_packets = packets;
        self
    }

    /// Set the frame-type median window size.
    #[must_use]
    pub fn median_window_size(mut self, size: usize) -> Self {
        self.median_window_size = size;
        self
    }

    /// Check that every option is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SceneStillError::InvalidConfiguration`] naming the first
    /// offending option.
    pub fn validate(&self) -> Result<(), SceneStillError> {
        if !self.ratio_threshold.is_finite() || self.ratio_threshold <= 0.0 {
            return Err(SceneStillError::InvalidConfiguration(format!(
                "ratio_threshold must be a positive number, got {}",
                self.ratio_threshold
            )));
        }
        if !self.min_interval_seconds.is_finite() || self.min_interval_seconds < 0.0 {
            return Err(SceneStillError::InvalidConfiguration(format!(
                "min_interval_seconds must be zero or positive, got {}",
                self.min_interval_seconds
            )));
        }
        if self.rolling_window_size == 0 {
            return Err(SceneStillError::InvalidConfiguration(
                "rolling_window_size must be at least 1".to_string(),
            ));
        }
        if self.median_window_size == 0 {
            return Err(SceneStillError::InvalidConfiguration(
                "median_window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Image file format used for extracted stills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// JPEG (`.jpg`). This is the default.
    #[default]
    Jpeg,
    /// PNG (`.png`).
    Png,
    /// Windows bitmap (`.bmp`).
    Bmp,
    /// TIFF (`.tiff`).
    Tiff,
}

impl ImageFormat {
    /// File extension written for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = SceneStillError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "bmp" => Ok(ImageFormat::Bmp),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            other => Err(SceneStillError::InvalidConfiguration(format!(
                "unsupported image format: {other}"
            ))),
        }
    }
}

/// Naming and encoding of extracted stills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Image encoding.
    pub format: ImageFormat,
    /// Filename prefix, followed by `_<seconds>s.<ext>`.
    pub filename_prefix: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            filename_prefix: "scene".to_string(),
        }
    }
}

impl OutputOptions {
    /// Create output options with defaults (`scene_<t>s.jpg`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image format.
    #[must_use]
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filename prefix.
    #[must_use]
    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    /// Filename for a still taken at `timestamp` seconds.
    ///
    /// The timestamp is printed with two decimals so names stay unique for
    /// candidates at least `0.01` s apart and sort chronologically.
    ///
    /// ```
    /// use scenestill::OutputOptions;
    ///
    /// assert_eq!(OutputOptions::new().file_name(12.5), "scene_12.50s.jpg");
    /// ```
    pub fn file_name(&self, timestamp: f64) -> String {
        format!(
            "{}_{timestamp:.2}s.{}",
            self.filename_prefix,
            self.format.extension()
        )
    }
}

/// Configuration for a full pipeline run.
///
/// Bundles the detection and output options together with the progress
/// callback. All fields have sensible defaults.
#[derive(Clone)]
pub struct PipelineConfig {
    pub(crate) detection: DetectionOptions,
    pub(crate) output: OutputOptions,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// How often to fire the progress callback (every N items).
    pub(crate) batch_size: u64,
}

impl Debug for PipelineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineConfig")
            .field("detection", &self.detection)
            .field("output", &self.output)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create a configuration with default detection and output options,
    /// no progress callback and a batch size of 1.
    pub fn new() -> Self {
        Self {
            detection: DetectionOptions::default(),
            output: OutputOptions::default(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Replace the detection options.
    #[must_use]
    pub fn with_detection(mut self, detection: DetectionOptions) -> Self {
        self.detection = detection;
        self
    }

    /// Replace the output options.
    #[must_use]
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The detection options.
    pub fn detection(&self) -> &DetectionOptions {
        &self.detection
    }

    /// The output options.
    pub fn output(&self) -> &OutputOptions {
        &self.output
    }

    /// The configured progress batch size.
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }
}
