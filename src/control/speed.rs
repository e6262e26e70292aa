//! Hysteretic fan-speed controller.
//!
//! Maps a smoothed temperature into a target PWM duty and decides whether
//! the change is worth applying. Four bands:
//!
//! ```text
//!            MIN         LIMIT−H      LIMIT       LIMIT+H
//!  ───────────┼─────────────┼───────────┼───────────┼──────────▶ °C
//!     off     │      proportional       │           │  ceiling
//!             │             ◀── cooling hold (fan at max) ──
//! ```
//!
//! Rising temperatures follow the proportional band until they cross the
//! limit. Once the fan is running at maximum, a sticky cooling-down state
//! holds it there until the temperature falls a full hysteresis band below
//! the limit, so readings that hover near the limit cannot chatter the fan
//! between full and proportional speed. Branch order below is load-bearing:
//! off, then hard ceiling, then cooling hold, then proportional.

use crate::config::FanConfig;

// ───────────────────────────────────────────────────────────────
// Decision types
// ───────────────────────────────────────────────────────────────

/// Which band of the mapping produced the current duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanBand {
    /// Below the minimum temperature — fan off.
    Off,
    /// Linear interpolation between minimum and maximum duty.
    Proportional,
    /// Fan at maximum and the temperature has not yet fallen a full
    /// hysteresis band below the limit — held at maximum.
    CoolingHold,
    /// At or above limit + hysteresis — hard ceiling, regardless of state.
    Ceiling,
    /// Sensor unreliable — forced maximum.
    FailSafe,
}

impl FanBand {
    /// Human label for the serial status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "off (below minimum)",
            Self::Proportional => "proportional",
            Self::CoolingHold => "maximum (hysteresis hold)",
            Self::Ceiling => "maximum (above limit)",
            Self::FailSafe => "maximum (fail-safe)",
        }
    }
}

/// Outcome of one controller evaluation.
#[derive(Debug, Clone, Copy)]
pub struct DutyDecision {
    /// Duty to drive, already clamped to `[0, fan_max_duty]`.
    pub duty: u8,
    /// True if the duty differs enough from the previous one to be applied.
    pub changed: bool,
    /// Band that produced the duty.
    pub band: FanBand,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Holds the hysteresis state (current duty, fan on/off, cooling latch) and
/// the mapping thresholds copied from [`FanConfig`].
#[derive(Debug, Clone)]
pub struct SpeedController {
    temp_min_c: f32,
    temp_limit_c: f32,
    temp_hysteresis_c: f32,
    fan_min_duty: u8,
    fan_max_duty: u8,
    duty_deadband: u8,

    current_duty: u8,
    fan_on: bool,
    /// Sticky cooling-down state: set whenever the mapping pins the fan at
    /// maximum, cleared only when the temperature re-enters the proportional
    /// or off band below `limit − hysteresis`.
    max_hold: bool,
    last_temp_c: Option<f32>,
    band: FanBand,
}

impl SpeedController {
    /// Construct from a validated configuration (see `FanConfig::validate`).
    pub fn new(config: &FanConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "config must be validated");
        Self {
            temp_min_c: config.temp_min_c,
            temp_limit_c: config.temp_limit_c,
            temp_hysteresis_c: config.temp_hysteresis_c,
            fan_min_duty: config.fan_min_duty,
            fan_max_duty: config.fan_max_duty,
            duty_deadband: config.duty_deadband,
            current_duty: 0,
            fan_on: false,
            max_hold: false,
            last_temp_c: None,
            band: FanBand::Off,
        }
    }

    /// Adopt new thresholds at runtime. Hysteresis state (current duty,
    /// fan on/off, cooling latch) is preserved.
    pub fn apply_config(&mut self, config: &FanConfig) {
        self.temp_min_c = config.temp_min_c;
        self.temp_limit_c = config.temp_limit_c;
        self.temp_hysteresis_c = config.temp_hysteresis_c;
        self.fan_min_duty = config.fan_min_duty;
        self.fan_max_duty = config.fan_max_duty;
        self.duty_deadband = config.duty_deadband;
    }

    /// Map a smoothed temperature to a target duty and gate the update.
    pub fn evaluate(&mut self, temperature: f32) -> DutyDecision {
        let (target, band) = self.target_for(temperature);
        self.last_temp_c = Some(temperature);
        self.band = band;

        let changed = self.update_gate(target);
        if changed {
            self.current_duty = target;
            self.fan_on = target > 0;
        }

        DutyDecision {
            duty: self.current_duty,
            changed,
            band,
        }
    }

    /// Fail-safe path: unconditionally pin the fan at maximum duty,
    /// bypassing both the mapping and the deadband gate. `changed` reports
    /// whether the duty moved relative to the prior state.
    pub fn force_maximum(&mut self) -> DutyDecision {
        let changed = self.current_duty != self.fan_max_duty;
        self.current_duty = self.fan_max_duty;
        self.fan_on = true;
        self.max_hold = true;
        self.band = FanBand::FailSafe;

        DutyDecision {
            duty: self.current_duty,
            changed,
            band: FanBand::FailSafe,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_duty(&self) -> u8 {
        self.current_duty
    }

    pub fn is_fan_on(&self) -> bool {
        self.fan_on
    }

    /// Last temperature fed to `evaluate`, if any.
    pub fn last_temperature(&self) -> Option<f32> {
        self.last_temp_c
    }

    /// Band selected by the most recent evaluation.
    pub fn band(&self) -> FanBand {
        self.band
    }

    // ── Internal ──────────────────────────────────────────────

    /// The mapping proper. Precedence: off, hard ceiling, cooling hold,
    /// proportional.
    fn target_for(&mut self, t: f32) -> (u8, FanBand) {
        if t < self.temp_min_c {
            self.max_hold = false;
            return (0, FanBand::Off);
        }

        if t >= self.temp_limit_c + self.temp_hysteresis_c {
            self.max_hold = true;
            return (self.fan_max_duty, FanBand::Ceiling);
        }

        if self.fan_on && (t > self.temp_limit_c || self.max_hold) {
            // Cooling down from maximum: resist dropping back until the
            // temperature has fallen a full hysteresis band below the limit.
            if t < self.temp_limit_c - self.temp_hysteresis_c {
                self.max_hold = false;
                return (self.proportional_duty(t), FanBand::Proportional);
            }
            self.max_hold = true;
            return (self.fan_max_duty, FanBand::CoolingHold);
        }

        (self.proportional_duty(t), FanBand::Proportional)
    }

    /// Linear interpolation of `[temp_min, temp_limit]` into
    /// `[fan_min_duty, fan_max_duty]`, truncated to an integer duty and
    /// clamped into the duty range.
    fn proportional_duty(&self, t: f32) -> u8 {
        let ratio = (t - self.temp_min_c) / (self.temp_limit_c - self.temp_min_c);
        let duty = self.fan_min_duty as f32
            + ratio * (self.fan_max_duty - self.fan_min_duty) as f32;
        (duty as u8).clamp(self.fan_min_duty, self.fan_max_duty)
    }

    /// Apply only when the target differs by more than the deadband, or
    /// when the transition crosses the on/off boundary in either direction.
    fn update_gate(&self, target: u8) -> bool {
        let delta = (i16::from(target) - i16::from(self.current_duty)).unsigned_abs();
        delta > u16::from(self.duty_deadband)
            || (target == 0 && self.current_duty != 0)
            || (target > 0 && self.current_duty == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SpeedController {
        SpeedController::new(&FanConfig::default())
    }

    // Defaults: MIN=20, LIMIT=28, HYST=2, MIN_DUTY=50, MAX_DUTY=255, deadband=5.

    #[test]
    fn below_minimum_keeps_fan_off() {
        let mut c = controller();
        let d = c.evaluate(18.0);
        assert_eq!(d.duty, 0);
        assert_eq!(d.band, FanBand::Off);
        assert!(!d.changed, "0 -> 0 is not a transition");
        assert!(!c.is_fan_on());
    }

    #[test]
    fn proportional_band_interpolates_and_truncates() {
        let mut c = controller();
        // 50 + (24-20)/8 × 205 = 152.5 → truncated to 152.
        let d = c.evaluate(24.0);
        assert_eq!(d.duty, 152);
        assert_eq!(d.band, FanBand::Proportional);
        assert!(d.changed);
        assert!(c.is_fan_on());
    }

    #[test]
    fn proportional_band_clamps_to_duty_range() {
        let mut c = controller();
        assert_eq!(c.evaluate(20.0).duty, 50);

        // With the fan off, 29 °C skips the cooling branch and interpolates
        // past the limit; the result must still clamp to the maximum duty.
        let mut c = controller();
        let d = c.evaluate(29.0);
        assert_eq!(d.duty, 255);
        assert_eq!(d.band, FanBand::Proportional);
    }

    #[test]
    fn rising_path_stays_proportional_below_the_limit() {
        let mut c = controller();
        assert_eq!(c.evaluate(24.0).duty, 152);
        // 27 °C approached from below never saw the limit — no hold yet.
        let d = c.evaluate(27.0);
        assert_eq!(d.duty, 229);
        assert_eq!(d.band, FanBand::Proportional);
    }

    #[test]
    fn ceiling_applies_regardless_of_prior_state() {
        let mut c = controller();
        let d = c.evaluate(31.0);
        assert_eq!(d.duty, 255);
        assert_eq!(d.band, FanBand::Ceiling);
        assert!(d.changed);
    }

    #[test]
    fn cooling_hold_pins_maximum_inside_hysteresis_band() {
        let mut c = controller();
        c.evaluate(31.0);
        // 27 °C is still above LIMIT−HYST = 26 — duty must stay at maximum.
        let d = c.evaluate(27.0);
        assert_eq!(d.duty, 255);
        assert_eq!(d.band, FanBand::CoolingHold);
        assert!(!d.changed);
    }

    #[test]
    fn hysteresis_oscillation_never_drops_from_maximum() {
        let mut c = controller();
        c.evaluate(31.0);
        for _ in 0..10 {
            let d = c.evaluate(28.5);
            assert_eq!(d.duty, 255);
            assert_eq!(d.band, FanBand::CoolingHold);
            assert!(!d.changed);
            let d = c.evaluate(27.5);
            assert_eq!(d.duty, 255);
            assert_eq!(d.band, FanBand::CoolingHold);
            assert!(!d.changed);
        }
    }

    #[test]
    fn drop_below_hysteresis_band_recomputes_proportionally() {
        let mut c = controller();
        c.evaluate(31.0);
        // 25 °C < LIMIT−HYST = 26: 50 + (25-20)/8 × 205 = 178.125 → 178.
        let d = c.evaluate(25.0);
        assert_eq!(d.duty, 178);
        assert_eq!(d.band, FanBand::Proportional);
        assert!(d.changed);
    }

    #[test]
    fn hold_releases_once_then_tracks_proportionally() {
        let mut c = controller();
        c.evaluate(31.0);
        c.evaluate(25.0);
        // Back up to 27 °C from the proportional band: the latch was
        // released, so this is plain interpolation again, not a hold.
        let d = c.evaluate(27.0);
        assert_eq!(d.duty, 229);
        assert_eq!(d.band, FanBand::Proportional);
    }

    #[test]
    fn deadband_suppresses_small_changes() {
        let mut c = controller();
        assert_eq!(c.evaluate(24.0).duty, 152);
        // 24.1 °C maps to 155; |155−152| = 3 ≤ 5 — no update.
        let d = c.evaluate(24.1);
        assert!(!d.changed);
        assert_eq!(d.duty, 152, "held duty is reported while gated");
        // Same temperature again: still no update.
        assert!(!c.evaluate(24.1).changed);
    }

    #[test]
    fn deadband_allows_large_changes() {
        let mut c = controller();
        c.evaluate(24.0);
        let d = c.evaluate(25.0);
        assert!(d.changed);
        assert_eq!(d.duty, 178);
    }

    #[test]
    fn off_transition_is_never_suppressed() {
        // Custom config with a minimum duty inside the deadband, so only
        // the boundary rule can let the transition through.
        let config = FanConfig {
            fan_min_duty: 4,
            ..FanConfig::default()
        };
        let mut c = SpeedController::new(&config);
        let d = c.evaluate(20.0);
        assert_eq!(d.duty, 4);
        assert!(d.changed, "off -> on must apply despite |4-0| <= deadband");
        assert!(c.is_fan_on());

        let d = c.evaluate(18.0);
        assert_eq!(d.duty, 0);
        assert!(d.changed, "on -> off must apply despite |0-4| <= deadband");
        assert!(!c.is_fan_on());
    }

    #[test]
    fn force_maximum_bypasses_gate_and_reports_prior_delta() {
        let mut c = controller();
        let d = c.force_maximum();
        assert_eq!(d.duty, 255);
        assert_eq!(d.band, FanBand::FailSafe);
        assert!(d.changed);
        assert!(c.is_fan_on());

        // Already at maximum: forcing again is a no-op change-wise.
        let d = c.force_maximum();
        assert_eq!(d.duty, 255);
        assert!(!d.changed);
    }

    #[test]
    fn recovery_after_fail_safe_goes_through_normal_mapping() {
        let mut c = controller();
        c.force_maximum();
        let d = c.evaluate(24.0);
        assert_eq!(d.duty, 152);
        assert!(d.changed);
        assert_eq!(d.band, FanBand::Proportional);
    }

    #[test]
    fn fail_safe_hold_persists_inside_hysteresis_band() {
        let mut c = controller();
        c.force_maximum();
        // First valid reading lands inside the hysteresis band: the fan
        // stays pinned rather than dropping straight to proportional.
        let d = c.evaluate(27.0);
        assert_eq!(d.duty, 255);
        assert_eq!(d.band, FanBand::CoolingHold);
    }

    #[test]
    fn last_temperature_tracks_evaluations() {
        let mut c = controller();
        assert!(c.last_temperature().is_none());
        c.evaluate(22.25);
        assert_eq!(c.last_temperature(), Some(22.25));
    }
}
