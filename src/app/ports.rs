//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (the temperature sensor, the fan PWM output, event sinks)
//! implement these traits. The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::control::TemperatureSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick to obtain a sample.
///
/// Implementations must not block longer than a bounded acquisition timeout
/// and must classify timeouts and out-of-range readings as
/// [`TemperatureSample::Invalid`] rather than blocking or panicking.
pub trait SensorPort {
    fn acquire_temperature(&mut self) -> TemperatureSample;
}

// ───────────────────────────────────────────────────────────────
// Fan port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the fan.
///
/// Invoked only when the controller reports a significant change (or on the
/// fail-safe path), so implementations see a minimal stream of writes.
pub trait FanPort {
    /// Drive the fan at `duty` (8-bit PWM counts, 0 = off).
    fn apply_duty(&mut self, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a future
/// telemetry channel, a test recorder). Purely informational — sinks must
/// not feed back into control decisions.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
