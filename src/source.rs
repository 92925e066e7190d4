//! Packet sources.
//!
//! Both passes read a container through two small traits so that detection
//! and targeted extraction can run against FFmpeg ([`crate::MediaFile`]) or
//! against any other demuxer, including in-memory fakes in tests.
//!
//! A [`MediaSource`] is opened once per pass into a [`PacketReader`]. The
//! reader is owned by that pass and dropped when it ends, which releases the
//! underlying handle on every exit path.

use image::DynamicImage;

use crate::error::SceneStillError;

/// One compressed access unit of the video stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoPacket {
    /// Presentation timestamp in the stream time base. Identifies the packet
    /// when the container is read a second time.
    pub pts: Option<i64>,
    /// Decoding timestamp in the stream time base.
    pub dts: Option<i64>,
    /// Presentation time in seconds (`0.0` when the packet carries no PTS).
    pub timestamp: f64,
    /// Payload size in bytes.
    pub size: usize,
    /// Whether the demuxer flagged this packet as a sync point.
    pub is_keyframe: bool,
}

/// A frame produced by decoding one packet.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Presentation time of the frame in seconds, if the decoder reported one.
    pub timestamp: Option<f64>,
    /// Pixel data.
    pub image: DynamicImage,
}

/// Sequential reader over the video packets of one opened container.
pub trait PacketReader {
    /// Read the next video packet in container order.
    ///
    /// Returns `Ok(None)` at end of stream. Packets of other streams are
    /// skipped.
    fn next_packet(&mut self) -> Result<Option<VideoPacket>, SceneStillError>;

    /// Decode the packet most recently returned by
    /// [`next_packet`](PacketReader::next_packet), and only that packet.
    ///
    /// May return zero frames.
    fn decode_current(&mut self) -> Result<Vec<DecodedFrame>, SceneStillError>;
}

/// A container that can be opened for one pass.
pub trait MediaSource {
    /// The reader produced by [`open_reader`](MediaSource::open_reader).
    type Reader: PacketReader;

    /// Open the container positioned at its first packet.
    ///
    /// # Errors
    ///
    /// Container errors: the source cannot be opened or has no video stream.
    fn open_reader(&self) -> Result<Self::Reader, SceneStillError>;
}

impl<S: MediaSource + ?Sized> MediaSource for &S {
    type Reader = S::Reader;

    fn open_reader(&self) -> Result<Self::Reader, SceneStillError> {
        (**self).open_reader()
    }
}
