//! # scenestill
//!
//! Find scene boundaries in a video from compressed packet sizes alone, then
//! decode and save still frames only at those boundaries.
//!
//! Decoding every frame of a long video just to pick representative stills
//! is expensive. Encoders, however, already tell us where the cuts are: the
//! first frame of a new shot cannot be predicted from the previous one, so
//! its packet is many times larger than its neighbours. `scenestill` reads
//! the container twice:
//!
//! 1. **Packet scan** ([`ScenePass`]) — every video packet is demuxed but not
//!    decoded. A [`PacketSizeTracker`] keeps a rolling mean of recent sizes
//!    and a [`CandidateDetector`] flags packets far above it.
//! 2. **Targeted decode** ([`TargetedExtractor`]) — the container is read
//!    again and only the flagged packets are decoded and written as images.
//!
//! The two passes communicate through a plain, serializable
//! `Vec<`[`Candidate`]`>`, so either can be run on its own.
//!
//! ## Quick Start
//!
//! ```no_run
//! let written = scenestill::detect_and_extract("input.mp4", "stills", 9.0, 1.0)?;
//! println!("{written} still(s) saved");
//! # Ok::<(), scenestill::SceneStillError>(())
//! ```
//!
//! ### Running the passes separately
//!
//! ```no_run
//! use std::path::Path;
//!
//! use scenestill::{DetectionOptions, MediaFile, OutputOptions, ScenePass, TargetedExtractor};
//!
//! let media = MediaFile::new("input.mp4")?;
//! let candidates = ScenePass::new(DetectionOptions::new().ratio_threshold(6.0)).run(&media)?;
//! std::fs::write("candidates.json", serde_json::to_string(&candidates)?)?;
//!
//! let report = TargetedExtractor::new(OutputOptions::new())
//!     .run(&media, candidates, Path::new("stills"))?;
//! # Ok::<(), scenestill::SceneStillError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod baseline;
pub mod configuration;
mod conversion;
pub mod detector;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod media_file;
pub mod pipeline;
pub mod progress;
pub mod scan;
pub mod source;

pub use baseline::{Baseline, PacketSizeTracker, RollingWindow};
pub use configuration::{DetectionOptions, ImageFormat, OutputOptions, PipelineConfig};
pub use detector::{Candidate, CandidateDetector, FrameTypeEstimate};
pub use error::SceneStillError;
pub use extract::{DecodeSummary, ExtractedImage, ExtractionReport, SavedImage, TargetedExtractor};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use media_file::{FfmpegPacketReader, MediaFile};
pub use pipeline::{Pipeline, PipelineReport, detect_and_extract};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use scan::{ScanStatistics, SceneScan, ScenePass};
pub use source::{DecodedFrame, MediaSource, PacketReader, VideoPacket};
