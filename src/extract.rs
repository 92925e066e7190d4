//! Pass two: targeted decode.
//!
//! [`TargetedExtractor`] re-reads the container and decodes pixels only for
//! packets whose PTS matches a candidate from pass one. Everything else is
//! demuxed and discarded, and reading stops as soon as the last candidate has
//! been satisfied.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use scenestill::{DetectionOptions, MediaFile, OutputOptions, ScenePass, TargetedExtractor};
//!
//! let media = MediaFile::new("input.mp4")?;
//! let candidates = ScenePass::new(DetectionOptions::new()).run(&media)?;
//! let report = TargetedExtractor::new(OutputOptions::new())
//!     .run(&media, candidates, Path::new("stills"))?;
//! println!("{} still(s) written", report.images.len());
//! # Ok::<(), scenestill::SceneStillError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ColorType, DynamicImage};

use crate::configuration::{ImageFormat, OutputOptions};
use crate::detector::{Candidate, FrameTypeEstimate};
use crate::error::SceneStillError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::source::{MediaSource, PacketReader};

/// A decoded still for one candidate, before it is written.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// The candidate this still belongs to.
    pub candidate: Candidate,
    /// Decoded pixels.
    pub image: DynamicImage,
    /// Where the still is (or would be) written.
    pub path: PathBuf,
}

impl ExtractedImage {
    /// Presentation time of the still, equal to its candidate's timestamp.
    pub fn timestamp(&self) -> f64 {
        self.candidate.timestamp
    }
}

/// A still that has been written to disk. The pixel buffer is released.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedImage {
    /// Presentation time in seconds.
    pub timestamp: f64,
    /// Written file.
    pub path: PathBuf,
    /// Diagnostic frame-type guess from pass one.
    pub frame_type: FrameTypeEstimate,
    /// Size ratio that made the packet a candidate.
    pub ratio: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Counters from [`TargetedExtractor::decode_each`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Candidates decoded into a still.
    pub decoded: usize,
    /// Candidates whose packet was found but produced no frame.
    pub decode_failures: usize,
    /// Candidates whose packet never appeared.
    pub unmatched: usize,
    /// Packets read before the pass ended.
    pub packets_read: u64,
}

/// The result of pass two.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Stills written, in stream order.
    pub images: Vec<SavedImage>,
    /// Candidates skipped because decoding failed.
    pub decode_failures: usize,
    /// Stills skipped because writing failed.
    pub write_failures: usize,
    /// Candidates whose packet never appeared on the second read.
    pub unmatched: usize,
    /// Packets read before the pass ended.
    pub packets_read: u64,
}

/// Decodes and writes one still per candidate.
pub struct TargetedExtractor {
    output: OutputOptions,
    progress: Arc<dyn ProgressCallback>,
    batch_size: u64,
}

impl TargetedExtractor {
    /// Create an extractor naming and encoding stills per `output`.
    pub fn new(output: OutputOptions) -> Self {
        Self {
            output,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Attach a progress callback fired every `batch_size` candidates.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>, batch_size: u64) -> Self {
        self.progress = callback;
        self.batch_size = batch_size.max(1);
        self
    }

    /// Decode `candidates` from `source` and write them into `output_dir`.
    ///
    /// Per-candidate decode and write failures are counted in the report and
    /// never abort the batch.
    ///
    /// # Errors
    ///
    /// Container errors from opening or reading the source.
    pub fn run<S: MediaSource>(
        &self,
        source: &S,
        candidates: Vec<Candidate>,
        output_dir: &Path,
    ) -> Result<ExtractionReport, SceneStillError> {
        let mut report = ExtractionReport::default();
        let mut written: HashMap<PathBuf, usize> = HashMap::new();
        let format = self.output.format;

        let summary = self.decode_each(source, candidates, output_dir, |extracted| {
            match write_image(&extracted, format) {
                Ok(saved) => {
                    log::info!(
                        "Saved {} [{} frame {:.1}x]",
                        saved.path.display(),
                        saved.frame_type,
                        saved.ratio
                    );
                    if let Some(previous) = written.get(&saved.path).copied() {
                        log::warn!(
                            "{} overwrote the still for {:.3}s",
                            saved.path.display(),
                            report.images[previous].timestamp
                        );
                        report.images[previous] = saved;
                    } else {
                        written.insert(saved.path.clone(), report.images.len());
                        report.images.push(saved);
                    }
                }
                Err(error) => {
                    log::warn!("Skipping still at {:.3}s: {error}", extracted.timestamp());
                    report.write_failures += 1;
                }
            }
        })?;

        report.decode_failures = summary.decode_failures;
        report.unmatched = summary.unmatched;
        report.packets_read = summary.packets_read;
        Ok(report)
    }

    /// Decode `candidates` from `source`, handing each still to `on_image`
    /// instead of writing it.
    ///
    /// With an empty candidate list the source is never opened.
    pub fn decode_each<S, F>(
        &self,
        source: &S,
        candidates: Vec<Candidate>,
        output_dir: &Path,
        mut on_image: F,
    ) -> Result<DecodeSummary, SceneStillError>
    where
        S: MediaSource,
        F: FnMut(ExtractedImage),
    {
        let mut summary = DecodeSummary::default();
        if candidates.is_empty() {
            return Ok(summary);
        }

        let total = candidates.len() as u64;
        let mut pending: HashMap<Option<i64>, Candidate> = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            if pending.insert(candidate.pts, candidate).is_some() {
                log::debug!("Duplicate candidate for pts {:?} ignored", candidate.pts);
            }
        }

        log::debug!("Decoding {} candidate packet(s)", pending.len());

        let mut reader = source.open_reader()?;
        let mut progress = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::TargetedDecode,
            Some(total),
            self.batch_size,
        );

        while !pending.is_empty() {
            let Some(packet) = reader.next_packet()? else {
                break;
            };
            summary.packets_read += 1;

            let Some(candidate) = pending.remove(&packet.pts) else {
                continue;
            };
            progress.advance(Some(candidate.timestamp));

            let frame = match reader.decode_current() {
                Ok(frames) => frames.into_iter().next(),
                Err(error) => {
                    log::warn!("Skipping candidate at {:.3}s: {error}", candidate.timestamp);
                    summary.decode_failures += 1;
                    continue;
                }
            };

            let Some(frame) = frame else {
                log::warn!(
                    "Skipping candidate at {:.3}s: packet produced no frame",
                    candidate.timestamp
                );
                summary.decode_failures += 1;
                continue;
            };

            summary.decoded += 1;
            on_image(ExtractedImage {
                candidate,
                image: frame.image,
                path: output_dir.join(self.output.file_name(candidate.timestamp)),
            });
        }

        progress.finish();

        summary.unmatched = pending.len();
        if summary.unmatched > 0 {
            let mut missing: Vec<f64> = pending.values().map(|c| c.timestamp).collect();
            missing.sort_by(f64::total_cmp);
            log::warn!(
                "{} candidate packet(s) not found on second read: {:?}",
                summary.unmatched,
                missing
            );
        }

        log::info!(
            "Targeted decode produced {} still(s) after {} packet(s)",
            summary.decoded,
            summary.packets_read
        );

        Ok(summary)
    }
}

fn write_image(extracted: &ExtractedImage, format: ImageFormat) -> Result<SavedImage, SceneStillError> {
    // JPEG has no alpha channel.
    let converted;
    let image = match (format, extracted.image.color()) {
        (ImageFormat::Jpeg, ColorType::Rgb8 | ColorType::L8) => &extracted.image,
        (ImageFormat::Jpeg, _) => {
            converted = DynamicImage::ImageRgb8(extracted.image.to_rgb8());
            &converted
        }
        _ => &extracted.image,
    };

    image
        .save_with_format(&extracted.path, format.to_image_format())
        .map_err(|error| SceneStillError::ImageWriteError {
            path: extracted.path.clone(),
            reason: error.to_string(),
        })?;

    Ok(SavedImage {
        timestamp: extracted.candidate.timestamp,
        path: extracted.path.clone(),
        frame_type: extracted.candidate.frame_type,
        ratio: extracted.candidate.ratio,
        width: image.width(),
        height: image.height(),
    })
}
