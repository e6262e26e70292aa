//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them — log to serial, feed a future
//! telemetry channel, or record them in tests.

use crate::control::FanBand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control service has started (fan driven to its initial duty).
    Started { duty: u8 },

    /// A significant duty change was applied to the fan.
    DutyApplied {
        /// Smoothed temperature that produced the change.
        temperature_c: f32,
        duty: u8,
        band: FanBand,
    },

    /// Consecutive sensor failures crossed the threshold; the fan is pinned
    /// at maximum duty.
    FailSafeEngaged { failures: u32 },

    /// A valid reading arrived after fail-safe; normal mapping resumed.
    ControlRestored { temperature_c: f32, duty: u8 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    /// Last smoothed temperature, `None` before the first valid sample.
    pub temperature_c: Option<f32>,
    pub duty: u8,
    pub fan_on: bool,
    pub band: FanBand,
    pub consecutive_failures: u32,
    pub fail_safe: bool,
    pub tick_count: u64,
}
