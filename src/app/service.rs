//! Application service — the hexagonal core.
//!
//! [`ControlService`] owns the sample filter, fault monitor, and speed
//! controller, and runs one evaluation cycle per tick. All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        ControlService        │
//!     FanPort ◀── │  Filter · Faults · Speed     │
//!                 └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::FanConfig;
use crate::control::{FaultMonitor, SampleFilter, SpeedController, TemperatureSample};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, FanPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// Orchestrates the full control cycle: acquire → fault-check → smooth →
/// map → gate → drive.
pub struct ControlService {
    config: FanConfig,
    filter: SampleFilter,
    faults: FaultMonitor,
    controller: SpeedController,
    /// True while the fan is pinned at maximum because of sensor failures.
    fail_safe: bool,
    tick_count: u64,
}

impl ControlService {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** touch the fan — call [`start`](Self::start) next.
    pub fn new(config: FanConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "config must be validated");
        let faults = FaultMonitor::new(config.max_sensor_failures);
        let controller = SpeedController::new(&config);

        Self {
            config,
            filter: SampleFilter::new(),
            faults,
            controller,
            fail_safe: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the fan to its initial (off) state and announce startup.
    pub fn start(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        let duty = self.controller.current_duty();
        fan.apply_duty(duty);
        sink.emit(&AppEvent::Started { duty });
        info!("control service started (duty {})", duty);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and [`FanPort`]
    /// — this avoids a double mutable borrow while keeping the port
    /// boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl SensorPort + FanPort), sink: &mut impl EventSink) {
        self.tick_count += 1;

        match hw.acquire_temperature() {
            TemperatureSample::Valid(celsius) => {
                self.faults.record(true);
                self.on_valid_sample(celsius, hw, sink);
            }
            TemperatureSample::Invalid => {
                if self.faults.record(false) {
                    self.engage_fail_safe(hw, sink);
                }
            }
        }
    }

    fn on_valid_sample(
        &mut self,
        celsius: f32,
        fan: &mut impl FanPort,
        sink: &mut impl EventSink,
    ) {
        let was_fail_safe = self.fail_safe;
        self.fail_safe = false;

        let smoothed = self.filter.push(celsius);
        let decision = self.controller.evaluate(smoothed);

        if decision.changed {
            fan.apply_duty(decision.duty);
            sink.emit(&AppEvent::DutyApplied {
                temperature_c: smoothed,
                duty: decision.duty,
                band: decision.band,
            });
        }

        if was_fail_safe {
            sink.emit(&AppEvent::ControlRestored {
                temperature_c: smoothed,
                duty: decision.duty,
            });
        }
    }

    /// Fail-safe path: bypass mapping and deadband, pin the fan at maximum.
    /// The PWM write repeats on every failed tick past the threshold.
    fn engage_fail_safe(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        let decision = self.controller.force_maximum();
        fan.apply_duty(decision.duty);

        if !self.fail_safe {
            warn!(
                "fail-safe engaged after {} consecutive sensor failures — fan at maximum",
                self.faults.failures()
            );
            sink.emit(&AppEvent::FailSafeEngaged {
                failures: self.faults.failures(),
            });
        }
        self.fail_safe = true;
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from serial console, scheduler, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        fan: &mut impl FanPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.controller.apply_config(&new_config);
                    self.faults.set_threshold(new_config.max_sensor_failures);
                    self.config = new_config;
                    info!("configuration updated at runtime");
                }
                Err(e) => {
                    warn!("rejected runtime config update: {e}");
                }
            },
            AppCommand::ForceMaximum => {
                let decision = self.controller.force_maximum();
                fan.apply_duty(decision.duty);
                info!("manual override: fan forced to maximum");
                if decision.changed {
                    sink.emit(&AppEvent::DutyApplied {
                        temperature_c: self.controller.last_temperature().unwrap_or(0.0),
                        duty: decision.duty,
                        band: decision.band,
                    });
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            temperature_c: self.controller.last_temperature(),
            duty: self.controller.current_duty(),
            fan_on: self.controller.is_fan_on(),
            band: self.controller.band(),
            consecutive_failures: self.faults.failures(),
            fail_safe: self.fail_safe,
            tick_count: self.tick_count,
        }
    }

    /// Current fan duty.
    pub fn duty(&self) -> u8 {
        self.controller.current_duty()
    }

    /// True while sensor failures keep the fan pinned at maximum.
    pub fn is_fail_safe(&self) -> bool {
        self.fail_safe
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> FanConfig {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullFan;
    impl FanPort for NullFan {
        fn apply_duty(&mut self, _duty: u8) {}
    }

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    #[test]
    fn telemetry_reflects_initial_state() {
        let app = ControlService::new(FanConfig::default());
        let t = app.build_telemetry();
        assert_eq!(t.duty, 0);
        assert!(!t.fan_on);
        assert!(!t.fail_safe);
        assert!(t.temperature_c.is_none());
        assert_eq!(t.tick_count, 0);
    }

    #[test]
    fn invalid_runtime_config_is_rejected() {
        let mut app = ControlService::new(FanConfig::default());
        let bad = FanConfig {
            temp_min_c: 40.0,
            ..FanConfig::default()
        };
        app.handle_command(AppCommand::UpdateConfig(bad), &mut NullFan, &mut NullSink);
        // Live config is untouched.
        assert!((app.current_config().temp_min_c - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn force_maximum_command_pins_the_fan() {
        let mut app = ControlService::new(FanConfig::default());
        app.handle_command(AppCommand::ForceMaximum, &mut NullFan, &mut NullSink);
        assert_eq!(app.duty(), 255);
    }
}
