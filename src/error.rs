//! Error types for the `scenestill` crate.
//!
//! This module defines [`SceneStillError`], the unified error type returned by
//! all fallible operations in the crate. Variants fall into three groups:
//!
//! - **Container errors** ([`InputNotFound`](SceneStillError::InputNotFound),
//!   [`FileOpen`](SceneStillError::FileOpen),
//!   [`NoVideoStream`](SceneStillError::NoVideoStream),
//!   [`FfmpegError`](SceneStillError::FfmpegError)) are fatal and abort a run.
//! - **Decode errors** ([`VideoDecodeError`](SceneStillError::VideoDecodeError))
//!   affect a single candidate and are recovered by skipping it.
//! - **Write errors** ([`ImageWriteError`](SceneStillError::ImageWriteError))
//!   affect a single image and are recovered by skipping it.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `scenestill` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SceneStillError {
    /// The input path does not exist.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::new`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The output directory could not be created.
    #[error("Failed to prepare output directory {path}: {reason}")]
    OutputDirectory {
        /// Requested output directory.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A candidate packet could not be decoded into a frame.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A decoded frame could not be written to disk.
    #[error("Failed to write image {path}: {reason}")]
    ImageWriteError {
        /// Destination path of the image.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A detection or output option is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// A candidate list could not be serialized or parsed.
    #[error("Candidate list serialization error: {0}")]
    Serialization(#[from] JsonError),
}

impl SceneStillError {
    /// Returns `true` for errors that only affect a single candidate and
    /// never abort a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SceneStillError::VideoDecodeError(_) | SceneStillError::ImageWriteError { .. }
        )
    }
}

impl From<FfmpegError> for SceneStillError {
    fn from(error: FfmpegError) -> Self {
        SceneStillError::FfmpegError(error.to_string())
    }
}
