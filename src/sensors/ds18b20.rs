#![allow(dead_code)] // One-wire protocol layer is compiled only for the espidf target

//! DS18B20 one-wire temperature sensor driver.
//!
//! Bit-banged one-wire master on a single open-drain GPIO (external
//! 4.7 kΩ pull-up). The probe is addressed with Skip ROM — exactly one
//! device on the bus. Resolution is set to 10 bits (0.25 °C steps) so a
//! conversion completes within ~190 ms, which bounds the worst-case
//! blocking time of one acquisition.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the bus via hw_init GPIO helpers and busy-wait
//! delays. On host/test: reads from injectable statics.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::control::TemperatureSample;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

// ── Host-side simulation hooks ────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_MILLI_C: AtomicI32 = AtomicI32::new(25_000);
#[cfg(not(target_os = "espidf"))]
static SIM_BUS_OK: AtomicBool = AtomicBool::new(true);

/// Inject a simulated temperature (host/test only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature_c(celsius: f32) {
    SIM_TEMP_MILLI_C.store((celsius * 1000.0) as i32, Ordering::Relaxed);
}

/// Simulate bus health (host/test only). `false` makes every read fail.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_bus_ok(ok: bool) {
    SIM_BUS_OK.store(ok, Ordering::Relaxed);
}

// ── Protocol constants ────────────────────────────────────────

const CMD_SKIP_ROM: u8 = 0xCC;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_WRITE_SCRATCHPAD: u8 = 0x4E;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Config register value for 10-bit resolution (0.25 °C, ~187 ms max).
const CONFIG_10_BIT: u8 = 0x3F;
/// Upper bound on conversion polling (ms); 10-bit worst case is 187.5 ms.
const CONVERSION_TIMEOUT_MS: u32 = 250;

const SCRATCHPAD_LEN: usize = 9;

// ── Driver ────────────────────────────────────────────────────

/// Single-drop DS18B20 probe on a dedicated one-wire GPIO.
pub struct Ds18b20Sensor {
    gpio: i32,
}

impl Ds18b20Sensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// Detect the probe and configure 10-bit resolution.
    ///
    /// A missing probe is reported, not fatal — the control loop treats
    /// every subsequent read as a failed acquisition and the fault monitor
    /// takes over.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<(), SensorError> {
        if !self.bus_reset() {
            return Err(SensorError::NoDevice);
        }
        self.write_byte(CMD_SKIP_ROM);
        self.write_byte(CMD_WRITE_SCRATCHPAD);
        // TH / TL alarm registers are unused; only the config byte matters.
        self.write_byte(0x00);
        self.write_byte(0x00);
        self.write_byte(CONFIG_10_BIT);
        log::info!("DS18B20: probe present on GPIO {}, 10-bit resolution", self.gpio);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<(), SensorError> {
        log::info!("DS18B20(sim): GPIO {} ready", self.gpio);
        Ok(())
    }

    /// Acquire one temperature sample. Bus failures, CRC mismatches, and
    /// implausible readings all come back as `Invalid`; the caller's fault
    /// monitor decides what repeated failures mean.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> TemperatureSample {
        match self.read_celsius() {
            Ok(celsius) => TemperatureSample::from_celsius(celsius),
            Err(e) => {
                log::warn!("DS18B20 read failed: {e}");
                TemperatureSample::Invalid
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> TemperatureSample {
        if !SIM_BUS_OK.load(Ordering::Relaxed) {
            return TemperatureSample::Invalid;
        }
        let celsius = SIM_TEMP_MILLI_C.load(Ordering::Relaxed) as f32 / 1000.0;
        TemperatureSample::from_celsius(celsius)
    }

    // ── One-wire transaction layer (target only) ──────────────

    #[cfg(target_os = "espidf")]
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        if !self.bus_reset() {
            return Err(SensorError::NoDevice);
        }
        self.write_byte(CMD_SKIP_ROM);
        self.write_byte(CMD_CONVERT_T);

        // Externally-powered probes hold the line low until conversion
        // completes.
        let mut done = false;
        for _ in 0..CONVERSION_TIMEOUT_MS {
            hw_init::delay_us(1_000);
            if self.read_bit() {
                done = true;
                break;
            }
        }
        if !done {
            return Err(SensorError::ConversionTimeout);
        }

        if !self.bus_reset() {
            return Err(SensorError::NoDevice);
        }
        self.write_byte(CMD_SKIP_ROM);
        self.write_byte(CMD_READ_SCRATCHPAD);

        let mut scratchpad = [0u8; SCRATCHPAD_LEN];
        for byte in &mut scratchpad {
            *byte = self.read_byte();
        }

        if crc8(&scratchpad[..SCRATCHPAD_LEN - 1]) != scratchpad[SCRATCHPAD_LEN - 1] {
            return Err(SensorError::CrcMismatch);
        }

        Ok(raw_to_celsius(scratchpad[0], scratchpad[1]))
    }

    // ── One-wire bit layer (target only) ──────────────────────
    //
    // Timings follow the Maxim standard-speed tables. The GPIO is
    // configured open-drain: writing high releases the line to the pull-up.

    #[cfg(target_os = "espidf")]
    fn bus_reset(&mut self) -> bool {
        hw_init::gpio_write(self.gpio, false);
        hw_init::delay_us(480);
        hw_init::gpio_write(self.gpio, true);
        hw_init::delay_us(70);
        // Presence pulse: a device pulls the line low within 60–240 µs.
        let present = !hw_init::gpio_read(self.gpio);
        hw_init::delay_us(410);
        present
    }

    #[cfg(target_os = "espidf")]
    fn write_bit(&mut self, bit: bool) {
        if bit {
            hw_init::gpio_write(self.gpio, false);
            hw_init::delay_us(6);
            hw_init::gpio_write(self.gpio, true);
            hw_init::delay_us(64);
        } else {
            hw_init::gpio_write(self.gpio, false);
            hw_init::delay_us(60);
            hw_init::gpio_write(self.gpio, true);
            hw_init::delay_us(10);
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_bit(&mut self) -> bool {
        hw_init::gpio_write(self.gpio, false);
        hw_init::delay_us(6);
        hw_init::gpio_write(self.gpio, true);
        hw_init::delay_us(9);
        let bit = hw_init::gpio_read(self.gpio);
        hw_init::delay_us(55);
        bit
    }

    #[cfg(target_os = "espidf")]
    fn write_byte(&mut self, byte: u8) {
        // LSB first.
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0);
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }
}

// ── Pure conversion helpers (host-testable) ───────────────────

/// Convert the scratchpad temperature registers to Celsius. At 10-bit
/// resolution the two least-significant bits are undefined and must be
/// cleared before scaling.
fn raw_to_celsius(lsb: u8, msb: u8) -> f32 {
    let raw = i16::from_le_bytes([lsb, msb]) & !0x3;
    raw as f32 / 16.0
}

/// Dallas/Maxim CRC-8 (polynomial 0x31 reflected → 0x8C).
fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}
