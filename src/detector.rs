//! Scene-boundary candidates from packet sizes.
//!
//! Encoders spend far more bits on the first frame after a cut because
//! temporal prediction from the previous shot fails. [`CandidateDetector`]
//! flags a packet whose size exceeds the local rolling baseline by
//! [`ratio_threshold`](crate::DetectionOptions::ratio_threshold), and keeps
//! accepted candidates at least
//! [`min_interval_seconds`](crate::DetectionOptions::min_interval_seconds)
//! apart so one shot with a motion spike is reported once.
//!
//! # Example
//!
//! ```
//! use scenestill::{CandidateDetector, DetectionOptions, PacketSizeTracker, VideoPacket};
//!
//! let options = DetectionOptions::new();
//! let mut tracker = PacketSizeTracker::new(options.rolling_window_size);
//! let mut detector = CandidateDetector::new(&options);
//!
//! let mut candidates = Vec::new();
//! for (index, size) in [1_000, 1_000, 1_000, 1_000, 1_000, 1_000, 40_000].into_iter().enumerate() {
//!     let packet = VideoPacket {
//!         pts: Some(index as i64),
//!         dts: Some(index as i64),
//!         timestamp: index as f64 * 0.5,
//!         size,
//!         is_keyframe: false,
//!     };
//!     let baseline = tracker.observe(size);
//!     candidates.extend(detector.offer(&packet, baseline));
//! }
//!
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(candidates[0].timestamp, 3.0);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::baseline::{Baseline, RollingWindow};
use crate::configuration::DetectionOptions;
use crate::source::VideoPacket;

/// Frame type guessed from packet metadata alone.
///
/// Purely a diagnostic label; it never influences which packets become
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameTypeEstimate {
    /// Keyframe.
    Intra,
    /// Non-keyframe of at least half the recent median size.
    Predicted,
    /// Non-keyframe smaller than half the recent median size.
    Bidirectional,
}

impl Display for FrameTypeEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let label = match self {
            FrameTypeEstimate::Intra => "I",
            FrameTypeEstimate::Predicted => "P",
            FrameTypeEstimate::Bidirectional => "B",
        };
        f.write_str(label)
    }
}

/// A packet flagged as a probable scene boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Presentation timestamp of the packet in the stream time base.
    pub pts: Option<i64>,
    /// Presentation time in seconds.
    pub timestamp: f64,
    /// Packet size in bytes.
    pub size: usize,
    /// Rolling baseline the packet was compared against.
    pub baseline: f64,
    /// `size / baseline`.
    pub ratio: f64,
    /// Diagnostic frame-type guess.
    pub frame_type: FrameTypeEstimate,
}

/// Applies the size-ratio and minimum-interval rules to a packet stream.
#[derive(Debug, Clone)]
pub struct CandidateDetector {
    ratio_threshold: f64,
    min_interval_seconds: f64,
    minimum_warmup_packets: usize,
    /// Prior sizes for the frame-type median.
    recent_sizes: RollingWindow,
    observed: usize,
    last_accepted: Option<f64>,
}

impl CandidateDetector {
    /// Create a detector from `options`.
    ///
    /// Options are not validated here; see
    /// [`DetectionOptions::validate`].
    pub fn new(options: &DetectionOptions) -> Self {
        Self {
            ratio_threshold: options.ratio_threshold,
            min_interval_seconds: options.min_interval_seconds,
            minimum_warmup_packets: options.minimum_warmup_packets,
            recent_sizes: RollingWindow::new(options.median_window_size),
            observed: 0,
            last_accepted: None,
        }
    }

    /// Judge one packet against the baseline of the packets before it.
    ///
    /// Zero-size packets are demux artifacts and are ignored without being
    /// counted.
    pub fn offer(&mut self, packet: &VideoPacket, baseline: Baseline) -> Option<Candidate> {
        if packet.size == 0 {
            return None;
        }

        let frame_type = self.classify(packet);
        self.recent_sizes.push(packet.size);
        self.observed += 1;

        if self.observed < self.minimum_warmup_packets {
            return None;
        }

        let baseline = baseline.value().filter(|&mean| mean > 0.0)?;
        let size = packet.size as f64;
        if size <= baseline * self.ratio_threshold {
            return None;
        }

        if let Some(last) = self.last_accepted {
            let elapsed = packet.timestamp - last;
            if elapsed < self.min_interval_seconds || elapsed <= 0.0 {
                log::debug!(
                    "Suppressed oversized packet at {:.3}s ({:.1}x), {:.3}s after previous candidate",
                    packet.timestamp,
                    size / baseline,
                    elapsed
                );
                return None;
            }
        }

        self.last_accepted = Some(packet.timestamp);

        Some(Candidate {
            pts: packet.pts,
            timestamp: packet.timestamp,
            size: packet.size,
            baseline,
            ratio: size / baseline,
            frame_type,
        })
    }

    /// Number of non-empty packets offered so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    fn classify(&self, packet: &VideoPacket) -> FrameTypeEstimate {
        if packet.is_keyframe {
            return FrameTypeEstimate::Intra;
        }
        match self.recent_sizes.median() {
            Some(median) if packet.size as f64 > median * 0.5 => FrameTypeEstimate::Predicted,
            Some(_) => FrameTypeEstimate::Bidirectional,
            None => FrameTypeEstimate::Predicted,
        }
    }
}
