//! Rolling packet-size statistics.
//!
//! [`PacketSizeTracker`] keeps the last few compressed packet sizes of a video
//! stream in a [`RollingWindow`] and reports their mean as the local
//! "normal" size against which the next packet is judged.
//!
//! # Example
//!
//! ```
//! use scenestill::{Baseline, PacketSizeTracker};
//!
//! let mut tracker = PacketSizeTracker::new(3);
//! assert_eq!(tracker.observe(100), Baseline::Insufficient);
//! assert_eq!(tracker.observe(200), Baseline::Insufficient);
//! // Two prior sizes are enough for a window of three.
//! assert_eq!(tracker.observe(900), Baseline::Mean(150.0));
//! ```

/// Fixed-capacity FIFO window over `usize` samples with an O(1) mean.
///
/// Storage is allocated once; pushing into a full window overwrites the
/// oldest sample in place.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    slots: Box<[usize]>,
    /// Index of the oldest sample.
    head: usize,
    len: usize,
    sum: u128,
}

impl RollingWindow {
    /// Create an empty window holding at most `capacity` samples.
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
            sum: 0,
        }
    }

    /// Maximum number of samples kept.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no sample has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a sample, returning the evicted one when the window was full.
    pub fn push(&mut self, value: usize) -> Option<usize> {
        let capacity = self.capacity();
        self.sum += value as u128;

        if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = value;
            self.len += 1;
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % capacity;
        self.sum -= evicted as u128;
        Some(evicted)
    }

    /// Arithmetic mean of the held samples, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.sum as f64 / self.len as f64)
    }

    /// Median of the held samples, `None` when empty.
    ///
    /// Even-length windows average the two middle samples.
    pub fn median(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let mut sorted: Vec<usize> = self.iter().collect();
        sorted.sort_unstable();
        let middle = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[middle - 1] as f64 + sorted[middle] as f64) / 2.0)
        } else {
            Some(sorted[middle] as f64)
        }
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |offset| self.slots[(self.head + offset) % capacity])
    }
}

/// Baseline reported by [`PacketSizeTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline {
    /// Not enough history yet to judge the current packet.
    Insufficient,
    /// Mean size of the packets preceding the current one.
    Mean(f64),
}

impl Baseline {
    /// The mean, if available.
    pub fn value(self) -> Option<f64> {
        match self {
            Baseline::Insufficient => None,
            Baseline::Mean(mean) => Some(mean),
        }
    }
}

/// Rolling mean of recent packet sizes for one video stream.
///
/// Not thread-safe; one tracker serves one pass over one stream.
#[derive(Debug, Clone)]
pub struct PacketSizeTracker {
    window: RollingWindow,
}

impl PacketSizeTracker {
    /// Create a tracker averaging the last `window_size` packet sizes.
    pub fn new(window_size: usize) -> Self {
        Self {
            window: RollingWindow::new(window_size),
        }
    }

    /// Record `size` and return the baseline it should be judged against.
    ///
    /// The baseline is the mean of the sizes seen *before* this call. Until
    /// at least `window_size - 1` sizes are held,
    /// [`Baseline::Insufficient`] is returned.
    pub fn observe(&mut self, size: usize) -> Baseline {
        let required = self.window.capacity().saturating_sub(1).max(1);
        let baseline = if self.window.len() >= required {
            self.window.mean().map_or(Baseline::Insufficient, Baseline::Mean)
        } else {
            Baseline::Insufficient
        };

        self.window.push(size);
        baseline
    }

    /// Sizes currently in the window, oldest first.
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }
}
