//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to              |
//! |------------|---------------------|--------------------------|
//! | `hardware` | SensorPort          | DS18B20 one-wire bus     |
//! |            | FanPort             | LEDC PWM output          |
//! | `log_sink` | EventSink           | Serial log output        |
//! | `time`     | (monotonic clock)   | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod time;
