//! FFmpeg-backed packet source.
//!
//! [`MediaFile`] names a video file on disk. Each pass opens it into a fresh
//! [`FfmpegPacketReader`] that owns the demuxer context for that pass only;
//! dropping the reader closes the file.
//!
//! # Example
//!
//! ```no_run
//! use scenestill::{MediaFile, MediaSource, PacketReader, SceneStillError};
//!
//! let media = MediaFile::new("input.mp4")?;
//! let mut reader = media.open_reader()?;
//! while let Some(packet) = reader.next_packet()? {
//!     println!("{:.3}s {} bytes key={}", packet.timestamp, packet.size, packet.is_keyframe);
//! }
//! # Ok::<(), SceneStillError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, codec::context::Context as CodecContext,
    format::context::Input, frame::Video as VideoFrame, media::Type,
};

use crate::{
    conversion::{frame_to_image, pts_to_seconds},
    error::SceneStillError,
    source::{DecodedFrame, MediaSource, PacketReader, VideoPacket},
};

/// A video file read through FFmpeg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
}

impl MediaFile {
    /// Refer to the video file at `path`.
    ///
    /// Nothing is opened yet; each pass opens its own reader.
    ///
    /// # Errors
    ///
    /// Returns [`SceneStillError::InputNotFound`] if `path` does not exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SceneStillError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SceneStillError::InputNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MediaSource for MediaFile {
    type Reader = FfmpegPacketReader;

    fn open_reader(&self) -> Result<Self::Reader, SceneStillError> {
        FfmpegPacketReader::open(&self.path)
    }
}

/// Demuxer over the best video stream of one opened file.
pub struct FfmpegPacketReader {
    input_context: Input,
    video_stream_index: usize,
    time_base: Rational,
    /// Last video packet read; `None` before the first read and after EOF.
    current: Option<Packet>,
}

impl Debug for FfmpegPacketReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegPacketReader")
            .field("video_stream_index", &self.video_stream_index)
            .field("time_base", &self.time_base)
            .field("has_current", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

impl FfmpegPacketReader {
    /// Open `path` and select its best video stream.
    ///
    /// # Errors
    ///
    /// - [`SceneStillError::FileOpen`] if FFmpeg cannot open the file.
    /// - [`SceneStillError::NoVideoStream`] if the file has no video.
    pub fn open(path: &Path) -> Result<Self, SceneStillError> {
        log::debug!("Opening media file: {}", path.display());

        // Safe to call more than once.
        ffmpeg_next::init().map_err(|error| SceneStillError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SceneStillError::FileOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SceneStillError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();

        log::debug!(
            "Video stream {} [{}], time base {}/{}",
            video_stream_index,
            stream.parameters().id().name(),
            time_base.numerator(),
            time_base.denominator(),
        );

        Ok(Self {
            input_context,
            video_stream_index,
            time_base,
            current: None,
        })
    }

    /// Time base of the selected video stream.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }
}

impl PacketReader for FfmpegPacketReader {
    fn next_packet(&mut self) -> Result<Option<VideoPacket>, SceneStillError> {
        loop {
            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }

                    let pts = packet.pts();
                    let video_packet = VideoPacket {
                        pts,
                        dts: packet.dts(),
                        timestamp: pts.map_or(0.0, |pts| pts_to_seconds(pts, self.time_base)),
                        size: packet.size(),
                        is_keyframe: packet.is_key(),
                    };
                    self.current = Some(packet);
                    return Ok(Some(video_packet));
                }
                Err(FfmpegError::Eof) => {
                    self.current = None;
                    return Ok(None);
                }
                Err(error) => {
                    self.current = None;
                    return Err(SceneStillError::from(error));
                }
            }
        }
    }

    fn decode_current(&mut self) -> Result<Vec<DecodedFrame>, SceneStillError> {
        let decode_error = |error: FfmpegError| SceneStillError::VideoDecodeError(error.to_string());

        let packet = self.current.as_ref().ok_or_else(|| {
            SceneStillError::VideoDecodeError("no packet has been read".to_string())
        })?;

        // A fresh decoder per packet, flushed immediately, so codecs with
        // reorder delay still hand back the frame for this packet.
        let codec_parameters = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(SceneStillError::NoVideoStream)?
            .parameters();
        let decoder_context = CodecContext::from_parameters(codec_parameters).map_err(decode_error)?;
        let mut decoder = decoder_context.decoder().video().map_err(decode_error)?;

        decoder.send_packet(packet).map_err(decode_error)?;
        decoder.send_eof().map_err(decode_error)?;

        let mut frames = Vec::new();
        let mut decoded_frame = VideoFrame::empty();
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let timestamp = decoded_frame
                .pts()
                .map(|pts| pts_to_seconds(pts, self.time_base));
            frames.push(DecodedFrame {
                timestamp,
                image: frame_to_image(&decoded_frame)?,
            });
        }

        Ok(frames)
    }
}
