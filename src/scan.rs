//! Pass one: packet-size scan.
//!
//! [`ScenePass`] reads every packet of the video stream once, in container
//! order, without decoding any pixels, and returns the candidate list.

use std::sync::Arc;

use crate::baseline::PacketSizeTracker;
use crate::configuration::DetectionOptions;
use crate::detector::{Candidate, CandidateDetector};
use crate::error::SceneStillError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::source::{MediaSource, PacketReader};

/// Counters gathered during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    /// Video packets read, including empty ones.
    pub packets_read: u64,
    /// Zero-size packets skipped.
    pub empty_packets: u64,
    /// Packets flagged as keyframes by the demuxer.
    pub keyframes: u64,
}

/// The result of pass one.
#[derive(Debug, Clone, Default)]
pub struct SceneScan {
    /// Accepted candidates, strictly increasing in timestamp.
    pub candidates: Vec<Candidate>,
    /// Packet counters.
    pub statistics: ScanStatistics,
}

/// Single forward pass over a container's compressed packets.
pub struct ScenePass {
    options: DetectionOptions,
    progress: Arc<dyn ProgressCallback>,
    batch_size: u64,
}

impl ScenePass {
    /// Create a pass using `options`.
    pub fn new(options: DetectionOptions) -> Self {
        Self {
            options,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Attach a progress callback fired every `batch_size` packets.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>, batch_size: u64) -> Self {
        self.progress = callback;
        self.batch_size = batch_size.max(1);
        self
    }

    /// Scan `source` and return its candidates in stream order.
    ///
    /// # Errors
    ///
    /// - [`SceneStillError::InvalidConfiguration`] if the options are unusable.
    /// - Container errors from opening or reading the source.
    pub fn run<S: MediaSource>(&self, source: &S) -> Result<Vec<Candidate>, SceneStillError> {
        Ok(self.scan(source)?.candidates)
    }

    /// Like [`run`](ScenePass::run) but also returns packet counters.
    pub fn scan<S: MediaSource>(&self, source: &S) -> Result<SceneScan, SceneStillError> {
        self.options.validate()?;

        log::debug!(
            "Scanning packets (ratio_threshold={}, min_interval={}s, window={}, warmup={})",
            self.options.ratio_threshold,
            self.options.min_interval_seconds,
            self.options.rolling_window_size,
            self.options.minimum_warmup_packets,
        );

        let mut reader = source.open_reader()?;
        let mut tracker = PacketSizeTracker::new(self.options.rolling_window_size);
        let mut detector = CandidateDetector::new(&self.options);
        let mut progress = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::PacketScan,
            None,
            self.batch_size,
        );

        let mut scan = SceneScan::default();

        while let Some(packet) = reader.next_packet()? {
            scan.statistics.packets_read += 1;
            progress.advance(Some(packet.timestamp));

            if packet.is_keyframe {
                scan.statistics.keyframes += 1;
            }
            if packet.size == 0 {
                scan.statistics.empty_packets += 1;
                continue;
            }

            let baseline = tracker.observe(packet.size);
            if let Some(candidate) = detector.offer(&packet, baseline) {
                log::debug!(
                    "Candidate at {:.3}s: {} bytes, baseline {:.0}, {:.1}x [{}]",
                    candidate.timestamp,
                    candidate.size,
                    candidate.baseline,
                    candidate.ratio,
                    candidate.frame_type,
                );
                scan.candidates.push(candidate);
            }
        }

        progress.finish();

        log::info!(
            "Packet scan found {} candidate(s) in {} packet(s)",
            scan.candidates.len(),
            scan.statistics.packets_read
        );

        Ok(scan)
    }
}
