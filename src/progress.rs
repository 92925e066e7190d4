//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring both passes of a
//! pipeline run and [`ProgressInfo`] for detailed progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use scenestill::{Pipeline, PipelineConfig, ProgressCallback, ProgressInfo, SceneStillError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {} done", info.operation, info.current);
//!     }
//! }
//!
//! let config = PipelineConfig::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(500);
//! let report = Pipeline::new(config).run("input.mp4", "stills")?;
//! # Ok::<(), SceneStillError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of work currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Pass one: reading compressed packet sizes.
    PacketScan,
    /// Pass two: decoding candidate packets and writing stills.
    TargetedDecode,
}

/// A snapshot of progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which pass is running.
    pub operation: OperationType,
    /// Items (packets or candidates) processed so far.
    pub current: u64,
    /// Total items expected, if known. Unknown during the packet scan.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the pass started.
    pub elapsed: Duration,
    /// Stream position of the item just processed, in seconds.
    pub current_timestamp: Option<f64>,
}

/// Trait for receiving progress updates.
///
/// Callbacks are infallible: they observe a pass but cannot halt it.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during a pass.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks progress timing for one pass and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one processed item and fire the callback once a batch is full.
    pub(crate) fn advance(&mut self, timestamp: Option<f64>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, timestamp: Option<f64>) {
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_timestamp: timestamp,
        });
    }
}
