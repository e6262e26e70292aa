//! Integration tests for the ControlService → controller → fan pipeline.
//!
//! These run on the host (x86_64) and verify the full per-tick chain from a
//! temperature sample down to a PWM write without any real hardware.

use std::collections::VecDeque;

use smartfan::app::events::AppEvent;
use smartfan::app::ports::{EventSink, FanPort, SensorPort};
use smartfan::app::service::ControlService;
use smartfan::config::FanConfig;
use smartfan::control::{FanBand, TemperatureSample};

// ── Mock hardware ─────────────────────────────────────────────
//
// Records every PWM write so tests can assert on the full command history.

struct MockHardware {
    /// Samples handed out per tick; the last one repeats when exhausted.
    samples: VecDeque<TemperatureSample>,
    last: TemperatureSample,
    /// Every duty applied through the fan port, in order.
    applied: Vec<u8>,
}

impl MockHardware {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            last: TemperatureSample::Invalid,
            applied: Vec::new(),
        }
    }

    fn queue_valid(&mut self, celsius: f32, times: usize) {
        for _ in 0..times {
            self.samples.push_back(TemperatureSample::Valid(celsius));
        }
    }

    fn queue_invalid(&mut self, times: usize) {
        for _ in 0..times {
            self.samples.push_back(TemperatureSample::Invalid);
        }
    }

    fn last_applied(&self) -> Option<u8> {
        self.applied.last().copied()
    }
}

impl SensorPort for MockHardware {
    fn acquire_temperature(&mut self) -> TemperatureSample {
        if let Some(s) = self.samples.pop_front() {
            self.last = s;
        }
        self.last
    }
}

impl FanPort for MockHardware {
    fn apply_duty(&mut self, duty: u8) {
        self.applied.push(duty);
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl RecordingSink {
    fn new() -> Self {
        Self::default()
    }

    fn count_fail_safe(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::FailSafeEngaged { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

fn make_app() -> (ControlService, MockHardware, RecordingSink) {
    let config = FanConfig::default();
    let mut app = ControlService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn run_ticks(app: &mut ControlService, hw: &mut MockHardware, sink: &mut RecordingSink, n: usize) {
    for _ in 0..n {
        app.tick(hw, sink);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_fan_off() {
    let (_app, hw, sink) = make_app();
    assert_eq!(hw.applied, vec![0], "fan must start off");
    assert!(matches!(sink.events.first(), Some(AppEvent::Started { duty: 0 })));
}

// ── Normal mapping through the full pipeline ──────────────────

#[test]
fn first_valid_sample_applies_proportional_duty() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_valid(24.0, 1);
    run_ticks(&mut app, &mut hw, &mut sink, 1);

    assert_eq!(hw.last_applied(), Some(152));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::DutyApplied {
            duty: 152,
            band: FanBand::Proportional,
            ..
        }
    )));
}

#[test]
fn steady_temperature_causes_a_single_write() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_valid(24.0, 10);
    run_ticks(&mut app, &mut hw, &mut sink, 10);

    // One write for startup (duty 0) plus exactly one for the change.
    assert_eq!(hw.applied, vec![0, 152]);
}

#[test]
fn cold_readings_keep_fan_off_without_redundant_writes() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_valid(18.0, 5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);

    // 0 → 0 is not a transition; only the startup write exists.
    assert_eq!(hw.applied, vec![0]);
    assert_eq!(app.duty(), 0);
}

#[test]
fn heat_up_hold_and_cool_down_follow_the_hysteresis_bands() {
    let (mut app, mut hw, mut sink) = make_app();

    // Heat up well past the limit: smoothed reading reaches 31 °C.
    hw.queue_valid(31.0, 5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert_eq!(app.duty(), 255);

    // Cool into the hysteresis band: smoothed stays above 26 °C, so the
    // duty must hold at maximum with no further PWM writes.
    let writes_before = hw.applied.len();
    hw.queue_valid(27.0, 5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert_eq!(app.duty(), 255);
    assert_eq!(hw.applied.len(), writes_before, "hold must not re-write PWM");

    // Cool below the band: proportional control resumes and settles at the
    // value for a fully-smoothed 25 °C.
    hw.queue_valid(25.0, 5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert_eq!(app.duty(), 178);
}

// ── Fault handling ────────────────────────────────────────────

#[test]
fn five_consecutive_failures_force_maximum_duty() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_invalid(5);
    run_ticks(&mut app, &mut hw, &mut sink, 4);

    // Four failures: still nothing beyond the startup write.
    assert_eq!(hw.applied, vec![0]);
    assert!(!app.is_fail_safe());

    // Fifth failure crosses the threshold.
    run_ticks(&mut app, &mut hw, &mut sink, 1);
    assert_eq!(hw.last_applied(), Some(255));
    assert!(app.is_fail_safe());
    assert_eq!(sink.count_fail_safe(), 1);
}

#[test]
fn fail_safe_event_fires_once_but_write_repeats() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_invalid(8);
    run_ticks(&mut app, &mut hw, &mut sink, 8);

    // Writes on ticks 5..8 (the fail-safe path repeats the PWM write).
    assert_eq!(hw.applied, vec![0, 255, 255, 255, 255]);
    assert_eq!(sink.count_fail_safe(), 1);
}

#[test]
fn success_before_threshold_resets_the_failure_run() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_invalid(4);
    hw.queue_valid(24.0, 1);
    hw.queue_invalid(4);
    run_ticks(&mut app, &mut hw, &mut sink, 9);

    assert_eq!(sink.count_fail_safe(), 0, "fail-safe must never engage");
    assert!(!app.is_fail_safe());
    assert_eq!(app.duty(), 152, "the lone valid sample sets the duty");
}

#[test]
fn valid_samples_after_fail_safe_restore_normal_control() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_invalid(5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert!(app.is_fail_safe());

    hw.queue_valid(24.0, 1);
    run_ticks(&mut app, &mut hw, &mut sink, 1);

    assert!(!app.is_fail_safe());
    assert_eq!(app.duty(), 152);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ControlRestored { duty: 152, .. })));
}

#[test]
fn fail_safe_duty_ignores_last_known_temperature() {
    let (mut app, mut hw, mut sink) = make_app();
    // Establish a low duty from a cool reading first.
    hw.queue_valid(21.0, 5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert!(app.duty() < 100);

    hw.queue_invalid(5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);
    assert_eq!(app.duty(), 255);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_reports_fail_safe_state() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.queue_invalid(5);
    run_ticks(&mut app, &mut hw, &mut sink, 5);

    let t = app.build_telemetry();
    assert!(t.fail_safe);
    assert_eq!(t.duty, 255);
    assert_eq!(t.consecutive_failures, 5);
    assert_eq!(t.tick_count, 5);
}
