//! Fan PWM output driver (LEDC channel 0).
//!
//! Drives a 4-pin PWM fan (or a transistor-switched 2-pin fan) at 25 kHz
//! with 8-bit duty resolution. A dumb actuator: all control policy lives in
//! the speed controller; this driver only mirrors the last commanded duty
//! into the peripheral.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    Stopped,
    Running { duty: u8 },
}

pub struct FanDriver {
    state: FanState,
    hw_duty: u8,
}

impl FanDriver {
    pub fn new() -> Self {
        Self {
            state: FanState::Stopped,
            hw_duty: 0,
        }
    }

    /// Drive the fan at `duty` (0 = stop). Duty is written 1:1 — the LEDC
    /// timer runs at 8-bit resolution, matching the controller's range.
    pub fn set(&mut self, duty: u8) {
        hw_init::ledc_set(pins::LEDC_CH_FAN, duty);
        self.hw_duty = duty;
        self.state = if duty == 0 {
            FanState::Stopped
        } else {
            FanState::Running { duty }
        };
    }

    pub fn stop(&mut self) {
        self.set(0);
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, FanState::Stopped)
    }

    pub fn current_duty(&self) -> u8 {
        self.hw_duty
    }
}

impl Default for FanDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_commanded_duty() {
        let mut fan = FanDriver::new();
        assert_eq!(fan.state(), FanState::Stopped);
        assert!(!fan.is_running());

        fan.set(152);
        assert_eq!(fan.state(), FanState::Running { duty: 152 });
        assert_eq!(fan.current_duty(), 152);
        assert!(fan.is_running());

        fan.stop();
        assert_eq!(fan.state(), FanState::Stopped);
        assert_eq!(fan.current_duty(), 0);
    }
}
