//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the temperature sensor and the fan driver, exposing them through
//! [`SensorPort`] and [`FanPort`]. This is the only module in the system
//! that touches actual hardware. On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use crate::app::ports::{FanPort, SensorPort};
use crate::control::TemperatureSample;
use crate::drivers::fan::FanDriver;
use crate::sensors::Ds18b20Sensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor: Ds18b20Sensor,
    fan: FanDriver,
}

impl HardwareAdapter {
    pub fn new(sensor: Ds18b20Sensor, fan: FanDriver) -> Self {
        Self { sensor, fan }
    }

    /// Fan duty currently mirrored in the peripheral (diagnostics).
    pub fn fan_duty(&self) -> u8 {
        self.fan.current_duty()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn acquire_temperature(&mut self) -> TemperatureSample {
        self.sensor.read()
    }
}

// ── FanPort implementation ────────────────────────────────────

impl FanPort for HardwareAdapter {
    fn apply_duty(&mut self, duty: u8) {
        self.fan.set(duty);
    }
}
