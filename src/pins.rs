//! GPIO / peripheral pin assignments for the fan-controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// DS18B20 temperature sensor (one-wire)
// ---------------------------------------------------------------------------

/// One-wire data line. Open-drain with an external 4.7 kΩ pull-up.
pub const ONE_WIRE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Fan output (LEDC PWM)
// ---------------------------------------------------------------------------

/// PWM output to the fan driver transistor / 4-pin fan PWM input.
pub const FAN_PWM_GPIO: i32 = 16;

/// LEDC channel driving the fan.
pub const LEDC_CH_FAN: u32 = 0;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits). 8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the fan (25 kHz — above audible range, standard
/// for 4-pin PWM fans).
pub const FAN_PWM_FREQ_HZ: u32 = 25_000;
