//! Sensor subsystem.
//!
//! A single driver today: the DS18B20 one-wire temperature probe. The
//! driver produces a [`TemperatureSample`](crate::control::TemperatureSample)
//! each tick that the hardware adapter forwards through the sensor port.

pub mod ds18b20;

pub use ds18b20::Ds18b20Sensor;
