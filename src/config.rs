//! System configuration parameters
//!
//! All tunable parameters for the fan controller. Values are serialisable
//! so a future provisioning channel can push them at runtime; the filter
//! window size is a compile-time constant (see `control::filter`).

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core fan-controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanConfig {
    // --- Temperature thresholds ---
    /// Temperature (°C) at which the fan starts running.
    pub temp_min_c: f32,
    /// Temperature limit (°C); the proportional band tops out here.
    pub temp_limit_c: f32,
    /// Hysteresis band (°C) around the limit, prevents fan oscillation.
    pub temp_hysteresis_c: f32,

    // --- Duty cycle ---
    /// Lowest running duty (8-bit PWM counts); below this the fan stalls.
    pub fan_min_duty: u8,
    /// Highest duty (8-bit PWM counts).
    pub fan_max_duty: u8,
    /// Minimum duty change worth writing to the PWM peripheral.
    pub duty_deadband: u8,

    // --- Fault handling ---
    /// Consecutive failed temperature reads before fail-safe engages.
    pub max_sensor_failures: u32,

    // --- Timing ---
    /// Temperature check interval (milliseconds).
    pub check_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            // Temperature thresholds
            temp_min_c: 20.0,
            temp_limit_c: 28.0,
            temp_hysteresis_c: 2.0,

            // Duty cycle
            fan_min_duty: 50,
            fan_max_duty: 255,
            duty_deadband: 5,

            // Fault handling
            max_sensor_failures: 5,

            // Timing
            check_interval_ms: 2000, // 0.5 Hz
            telemetry_interval_secs: 60,
        }
    }
}

impl FanConfig {
    /// Construction-time invariant checks. A config that fails here is a
    /// fatal startup error, never a runtime condition.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.temp_limit_c > self.temp_min_c) {
            return Err(Error::Config("temp_limit_c must be above temp_min_c"));
        }
        if !(self.temp_hysteresis_c > 0.0) {
            return Err(Error::Config("temp_hysteresis_c must be positive"));
        }
        if self.fan_max_duty <= self.fan_min_duty {
            return Err(Error::Config("fan_max_duty must be above fan_min_duty"));
        }
        if self.max_sensor_failures == 0 {
            return Err(Error::Config("max_sensor_failures must be at least 1"));
        }
        if self.check_interval_ms == 0 {
            return Err(Error::Config("check_interval_ms must be non-zero"));
        }
        Ok(())
    }
}
