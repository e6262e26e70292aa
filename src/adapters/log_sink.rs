//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A future telemetry adapter
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::DutyApplied {
                temperature_c,
                duty,
                band,
            } => {
                info!(
                    "TEMP | {:.1}\u{00b0}C | fan {} | duty {}/255 ({}%)",
                    temperature_c,
                    band.label(),
                    duty,
                    (u16::from(*duty) * 100) / 255,
                );
            }
            AppEvent::FailSafeEngaged { failures } => {
                warn!(
                    "FAULT | {} consecutive sensor failures — fan forced to maximum",
                    failures
                );
            }
            AppEvent::ControlRestored {
                temperature_c,
                duty,
            } => {
                info!(
                    "FAULT | sensor recovered at {:.1}\u{00b0}C, duty {} — normal control resumed",
                    temperature_c, duty
                );
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={} | duty={}/255 | band={} | failures={} | fail_safe={} | tick={}",
                    t.temperature_c
                        .map_or("n/a".into(), |c| format!("{c:.1}\u{00b0}C")),
                    t.duty,
                    t.band.label(),
                    t.consecutive_failures,
                    t.fail_safe,
                    t.tick_count,
                );
            }
            AppEvent::Started { duty } => {
                info!("START | initial duty {}", duty);
            }
        }
    }
}
