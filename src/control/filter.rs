//! Moving-average temperature filter.
//!
//! A fixed-size ring buffer over the most recent valid samples. Until the
//! buffer has wrapped once, the mean is taken over the entries written so
//! far, so startup readings track the sensor without a long transient;
//! afterwards it is always the mean of exactly [`FILTER_WINDOW`] samples.

/// Number of samples in the smoothing window.
pub const FILTER_WINDOW: usize = 5;

/// Ring-buffer moving average over raw temperature samples.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    readings: [f32; FILTER_WINDOW],
    cursor: usize,
    warmed_up: bool,
}

impl SampleFilter {
    pub fn new() -> Self {
        Self {
            readings: [0.0; FILTER_WINDOW],
            cursor: 0,
            warmed_up: false,
        }
    }

    /// Accept one valid sample and return the current smoothed estimate.
    ///
    /// Stores the sample at the cursor, advances modulo the window size, and
    /// marks the filter warmed up the first time the cursor wraps back to 0.
    pub fn push(&mut self, sample: f32) -> f32 {
        self.readings[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % FILTER_WINDOW;
        if self.cursor == 0 {
            self.warmed_up = true;
        }

        let count = if self.warmed_up {
            FILTER_WINDOW
        } else {
            self.cursor
        };
        let sum: f32 = self.readings[..count].iter().sum();
        sum / count as f32
    }

    /// True once the window has been filled at least once.
    pub fn is_warmed_up(&self) -> bool {
        self.warmed_up
    }

    /// Number of samples currently contributing to the mean.
    pub fn len(&self) -> usize {
        if self.warmed_up {
            FILTER_WINDOW
        } else {
            self.cursor
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new()
    }
}
