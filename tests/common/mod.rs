//! In-memory packet source shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use image::DynamicImage;
use scenestill::{DecodedFrame, MediaSource, PacketReader, SceneStillError, VideoPacket};

/// What decoding a given packet does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeBehavior {
    /// One 8x6 frame.
    Frame,
    /// Decoder accepts the packet but emits nothing.
    NoFrame,
    /// Decoder rejects the packet.
    Fail,
}

#[derive(Debug, Clone, Copy)]
pub struct FakePacket {
    pub packet: VideoPacket,
    pub decode: DecodeBehavior,
}

/// Counters shared between a source and every reader it opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceStats {
    pub opens: usize,
    pub packets_read: usize,
    pub decodes: usize,
}

pub struct FakeSource {
    packets: Vec<FakePacket>,
    stats: Rc<RefCell<SourceStats>>,
    open_error: bool,
}

impl FakeSource {
    pub fn new(packets: Vec<FakePacket>) -> Self {
        Self {
            packets,
            stats: Rc::new(RefCell::new(SourceStats::default())),
            open_error: false,
        }
    }

    /// Packets of the given sizes, `spacing` seconds apart, pts = index.
    pub fn from_sizes(sizes: &[usize], spacing: f64) -> Self {
        Self::new(
            sizes
                .iter()
                .enumerate()
                .map(|(index, &size)| FakePacket {
                    packet: packet(index as i64, index as f64 * spacing, size, index == 0),
                    decode: DecodeBehavior::Frame,
                })
                .collect(),
        )
    }

    /// A source whose open always fails like a file without video.
    pub fn without_video() -> Self {
        Self {
            packets: Vec::new(),
            stats: Rc::new(RefCell::new(SourceStats::default())),
            open_error: true,
        }
    }

    pub fn set_decode(&mut self, pts: i64, decode: DecodeBehavior) {
        for fake in &mut self.packets {
            if fake.packet.pts == Some(pts) {
                fake.decode = decode;
            }
        }
    }

    pub fn stats(&self) -> SourceStats {
        *self.stats.borrow()
    }

    pub fn reset_stats(&self) {
        *self.stats.borrow_mut() = SourceStats::default();
    }
}

pub struct FakeReader {
    packets: Vec<FakePacket>,
    position: usize,
    stats: Rc<RefCell<SourceStats>>,
}

impl MediaSource for FakeSource {
    type Reader = FakeReader;

    fn open_reader(&self) -> Result<FakeReader, SceneStillError> {
        if self.open_error {
            return Err(SceneStillError::NoVideoStream);
        }
        self.stats.borrow_mut().opens += 1;
        Ok(FakeReader {
            packets: self.packets.clone(),
            position: 0,
            stats: Rc::clone(&self.stats),
        })
    }
}

impl PacketReader for FakeReader {
    fn next_packet(&mut self) -> Result<Option<VideoPacket>, SceneStillError> {
        let Some(fake) = self.packets.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        self.stats.borrow_mut().packets_read += 1;
        Ok(Some(fake.packet))
    }

    fn decode_current(&mut self) -> Result<Vec<DecodedFrame>, SceneStillError> {
        self.stats.borrow_mut().decodes += 1;
        let fake = self.packets[self.position - 1];
        match fake.decode {
            DecodeBehavior::Frame => Ok(vec![DecodedFrame {
                timestamp: Some(fake.packet.timestamp),
                image: DynamicImage::new_rgb8(8, 6),
            }]),
            DecodeBehavior::NoFrame => Ok(Vec::new()),
            DecodeBehavior::Fail => Err(SceneStillError::VideoDecodeError(
                "corrupt packet".to_string(),
            )),
        }
    }
}

pub fn packet(pts: i64, timestamp: f64, size: usize, is_keyframe: bool) -> VideoPacket {
    VideoPacket {
        pts: Some(pts),
        dts: Some(pts),
        timestamp,
        size,
        is_keyframe,
    }
}

/// `count` packet sizes of 1000 bytes with spikes of 100 000 bytes at the
/// given indices.
pub fn sizes_with_spikes(count: usize, spikes: &[usize]) -> Vec<usize> {
    (0..count)
        .map(|index| if spikes.contains(&index) { 100_000 } else { 1_000 })
        .collect()
}

/// Deterministic pseudo-random sizes in `low..high`.
pub fn noisy_sizes(count: usize, low: usize, high: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            low + (state >> 33) as usize % (high - low)
        })
        .collect()
}
