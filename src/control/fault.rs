//! Sensor fault monitor.
//!
//! Counts consecutive acquisition failures and signals the controller when
//! the fail-safe threshold is reached. The monitor never sets fan duty
//! itself; it only reports. Once tripped it keeps signalling on every
//! further failure until a successful acquisition resets the counter.

use log::{error, info};

/// Consecutive-failure counter with a fail-safe threshold.
#[derive(Debug, Clone)]
pub struct FaultMonitor {
    consecutive_failures: u32,
    threshold: u32,
}

impl FaultMonitor {
    /// `threshold` is the number of consecutive failures that engages
    /// fail-safe (validated ≥ 1 by `FanConfig::validate`).
    pub fn new(threshold: u32) -> Self {
        debug_assert!(threshold >= 1, "fault threshold must be at least 1");
        Self {
            consecutive_failures: 0,
            threshold,
        }
    }

    /// Record one acquisition outcome. Returns `true` iff fail-safe should
    /// be engaged (counter at or past the threshold).
    pub fn record(&mut self, success: bool) -> bool {
        if success {
            if self.consecutive_failures > 0 {
                info!(
                    "sensor recovered after {} failed read(s)",
                    self.consecutive_failures
                );
            }
            self.consecutive_failures = 0;
            return false;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        error!(
            "temperature read failed ({}/{} consecutive)",
            self.consecutive_failures, self.threshold
        );
        self.consecutive_failures >= self.threshold
    }

    /// Current run of consecutive failures.
    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// True if the counter is at or past the fail-safe threshold.
    pub fn is_tripped(&self) -> bool {
        self.consecutive_failures >= self.threshold
    }

    /// Update the threshold (runtime config reload). The counter is kept.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_never_signals() {
        let mut m = FaultMonitor::new(5);
        for _ in 0..4 {
            assert!(!m.record(false));
        }
        assert_eq!(m.failures(), 4);
        assert!(!m.is_tripped());
    }

    #[test]
    fn signals_on_exactly_the_threshold_call() {
        let mut m = FaultMonitor::new(5);
        for _ in 0..4 {
            assert!(!m.record(false));
        }
        assert!(m.record(false));
        assert!(m.is_tripped());
    }

    #[test]
    fn keeps_signalling_past_threshold() {
        let mut m = FaultMonitor::new(3);
        for _ in 0..3 {
            m.record(false);
        }
        assert!(m.record(false));
        assert!(m.record(false));
    }

    #[test]
    fn success_resets_the_counter() {
        let mut m = FaultMonitor::new(5);
        for _ in 0..4 {
            m.record(false);
        }
        assert!(!m.record(true));
        assert_eq!(m.failures(), 0);
        // A fresh run of failures starts from zero again.
        for _ in 0..4 {
            assert!(!m.record(false));
        }
    }

    #[test]
    fn threshold_of_one_trips_immediately() {
        let mut m = FaultMonitor::new(1);
        assert!(m.record(false));
    }
}
