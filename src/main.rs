//! SmartFan Firmware — Main Entry Point
//!
//! Hexagonal architecture with a tick-driven control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter        LogEventSink        MonotonicClock   │
//! │  (Sensor + Fan)         (EventSink)         (time base)      │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │           ControlService (pure logic)              │      │
//! │  │  SampleFilter · FaultMonitor · SpeedController     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use smartfan::adapters::hardware::HardwareAdapter;
use smartfan::adapters::log_sink::LogEventSink;
use smartfan::adapters::time::MonotonicClock;
use smartfan::app::events::AppEvent;
use smartfan::app::ports::EventSink;
use smartfan::app::service::ControlService;
use smartfan::config::FanConfig;
use smartfan::drivers::fan::FanDriver;
use smartfan::drivers::watchdog::Watchdog;
use smartfan::events::{drain_events, push_event, Event};
use smartfan::pins;
use smartfan::sensors::Ds18b20Sensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartFan v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compile-time defaults) ──────────────
    let config = FanConfig::default();
    if let Err(e) = config.validate() {
        error!("invalid configuration: {} — refusing to start", e);
        return Err(anyhow::anyhow!("{e}"));
    }
    info!("Configuration:");
    info!("  min temp:       {:.1}°C", config.temp_min_c);
    info!("  limit temp:     {:.1}°C", config.temp_limit_c);
    info!("  hysteresis:     {:.1}°C", config.temp_hysteresis_c);
    info!("  duty range:     {}–{}", config.fan_min_duty, config.fan_max_duty);
    info!("  check interval: {} ms", config.check_interval_ms);

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = smartfan::drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::new();

    // ── 4. Construct adapters ─────────────────────────────────
    let mut sensor = Ds18b20Sensor::new(pins::ONE_WIRE_GPIO);
    if let Err(e) = sensor.init() {
        // A missing probe is not fatal: the fault monitor drives the fan to
        // fail-safe maximum until the sensor shows up.
        log::warn!("DS18B20 init failed: {} — running blind until probe responds", e);
    }
    let mut hw = HardwareAdapter::new(sensor, FanDriver::new());
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 5. Construct the control service ──────────────────────
    let mut app = ControlService::new(config.clone());
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    //
    // Interval checks against the monotonic clock; each tick fires once the
    // interval has elapsed since the last fire (no drift compensation).
    let check_interval_us = u64::from(config.check_interval_ms) * 1_000;
    let telemetry_interval_us = u64::from(config.telemetry_interval_secs) * 1_000_000;
    let mut last_tick_us = clock.uptime_us();
    let mut last_telemetry_us = last_tick_us;

    loop {
        let now_us = clock.uptime_us();

        if now_us.wrapping_sub(last_tick_us) >= check_interval_us {
            last_tick_us = now_us;
            push_event(Event::ControlTick);
        }
        if now_us.wrapping_sub(last_telemetry_us) >= telemetry_interval_us {
            last_telemetry_us = now_us;
            push_event(Event::TelemetryTick);
        }

        drain_events(|event| match event {
            Event::ControlTick => {
                app.tick(&mut hw, &mut sink);
            }
            Event::TelemetryTick => {
                let t = app.build_telemetry();
                sink.emit(&AppEvent::Telemetry(t));
            }
        });

        // Feed watchdog on every iteration.
        watchdog.feed();

        // Idle between polls. On target this yields to the scheduler (and
        // keeps the IDLE task's watchdog happy); on host it is a plain sleep.
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::vTaskDelay(1);
        }
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
