//! Two-pass orchestration.
//!
//! [`Pipeline`] runs the packet scan, and only if it found candidates, the
//! targeted decode. A run that finds nothing is a normal outcome and reports
//! zero stills rather than failing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::configuration::{DetectionOptions, PipelineConfig};
use crate::detector::Candidate;
use crate::error::SceneStillError;
use crate::extract::{SavedImage, TargetedExtractor};
use crate::media_file::MediaFile;
use crate::scan::{ScanStatistics, ScenePass};
use crate::source::MediaSource;

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Candidates found by the packet scan.
    pub candidates: Vec<Candidate>,
    /// Packet counters from the scan.
    pub scan_statistics: ScanStatistics,
    /// Stills written.
    pub images: Vec<SavedImage>,
    /// Candidates skipped because decoding failed.
    pub decode_failures: usize,
    /// Stills skipped because writing failed.
    pub write_failures: usize,
    /// Candidates whose packet was not found on the second read.
    pub unmatched: usize,
    /// Directory the stills were written to.
    pub output_dir: PathBuf,
}

impl PipelineReport {
    /// Number of stills written.
    pub fn images_written(&self) -> usize {
        self.images.len()
    }
}

/// Scan-then-extract driver.
///
/// # Example
///
/// ```no_run
/// use scenestill::{Pipeline, PipelineConfig, SceneStillError};
///
/// let report = Pipeline::new(PipelineConfig::new()).run("input.mp4", "stills")?;
/// println!(
///     "{} candidate(s), {} still(s) in {}",
///     report.candidates.len(),
///     report.images_written(),
///     report.output_dir.display()
/// );
/// # Ok::<(), SceneStillError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detect scene boundaries in the file at `input` and write one still per
    /// boundary into `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// - [`SceneStillError::InputNotFound`] if `input` does not exist.
    /// - [`SceneStillError::OutputDirectory`] if `output_dir` cannot be created.
    /// - [`SceneStillError::InvalidConfiguration`] for unusable options.
    /// - Container errors from either pass.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output_dir: Q,
    ) -> Result<PipelineReport, SceneStillError> {
        let media = MediaFile::new(input)?;
        self.run_with_source(&media, output_dir)
    }

    /// Like [`run`](Pipeline::run) over any [`MediaSource`].
    pub fn run_with_source<S: MediaSource, Q: AsRef<Path>>(
        &self,
        source: &S,
        output_dir: Q,
    ) -> Result<PipelineReport, SceneStillError> {
        self.config.detection.validate()?;
        let output_dir = prepare_output_dir(output_dir.as_ref())?;

        let scan = ScenePass::new(self.config.detection)
            .with_progress(self.config.progress.clone(), self.config.batch_size)
            .scan(source)?;

        let mut report = PipelineReport {
            scan_statistics: scan.statistics,
            output_dir,
            ..PipelineReport::default()
        };

        if scan.candidates.is_empty() {
            log::info!("No scene changes detected; skipping targeted decode");
            return Ok(report);
        }

        report.candidates = scan.candidates.clone();
        let extraction = TargetedExtractor::new(self.config.output.clone())
            .with_progress(self.config.progress.clone(), 1)
            .run(source, scan.candidates, &report.output_dir)?;

        report.images = extraction.images;
        report.decode_failures = extraction.decode_failures;
        report.write_failures = extraction.write_failures;
        report.unmatched = extraction.unmatched;

        log::info!(
            "Saved {} still(s) to {}",
            report.images.len(),
            report.output_dir.display()
        );

        Ok(report)
    }
}

/// Detect scene boundaries and extract stills with default output options.
///
/// Returns the number of stills written; `0` when no boundary was found.
///
/// # Example
///
/// ```no_run
/// let written = scenestill::detect_and_extract("input.mp4", "stills", 9.0, 1.0)?;
/// println!("{written} still(s)");
/// # Ok::<(), scenestill::SceneStillError>(())
/// ```
pub fn detect_and_extract<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_dir: Q,
    ratio_threshold: f64,
    min_interval_seconds: f64,
) -> Result<usize, SceneStillError> {
    let detection = DetectionOptions::new()
        .ratio_threshold(ratio_threshold)
        .min_interval_seconds(min_interval_seconds);
    let report = Pipeline::new(PipelineConfig::new().with_detection(detection))
        .run(input_path, output_dir)?;
    Ok(report.images_written())
}

fn prepare_output_dir(path: &Path) -> Result<PathBuf, SceneStillError> {
    if path.exists() && !path.is_dir() {
        return Err(SceneStillError::OutputDirectory {
            path: path.to_path_buf(),
            reason: "path exists and is not a directory".to_string(),
        });
    }
    fs::create_dir_all(path).map_err(|error| SceneStillError::OutputDirectory {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    Ok(path.to_path_buf())
}
