//! System configuration parameters
//!
//! All tunable parameters for the sky quality monitor.  Values are fixed at
//! build time; the struct exists so every component receives its constants
//! explicitly instead of reaching for globals.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capacity of the rolling-average window (samples).
pub const SMOOTH_WINDOW: usize = 5;

/// File the top-level fault handler appends its record to.
pub const DIAGNOSTIC_RECORD_PATH: &str = "/spiffs/error_log.txt";

/// Which brightness unit the device reports and classifies.
///
/// The two domains use different formulas and different comparison
/// directions; pick one per deployment and never mix their constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationDomain {
    /// Linear illuminance.  Brighter sky = larger value = higher rating.
    Lux,
    /// Logarithmic sky brightness (mag/arcsec^2 style).  Darker sky =
    /// larger value = lower rating.
    Sqm,
}

/// Which smoothed line feeds the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothedInput {
    Ema,
    RollingAverage,
}

/// `metric = a * log10(lux) + b`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SqmCalibration {
    pub a: f32,
    pub b: f32,
}

impl Default for SqmCalibration {
    fn default() -> Self {
        // mag/arcsec^2 = -2.5 * log10(lux / 108000)
        Self { a: -2.5, b: 12.58 }
    }
}

/// Auto-ranging window on channel 0 (16-bit counts).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangingConfig {
    /// Below this, sensitivity is increased.
    pub target_low: u16,
    /// Above this, sensitivity is decreased.
    pub target_high: u16,
    /// At or above this the channel is treated as saturated.
    pub saturation: u16,
    /// Maximum reads per ranging call.
    pub max_attempts: u8,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            target_low: 200,
            target_high: 50_000,
            saturation: 65_000,
            max_attempts: 6,
        }
    }
}

/// Pixel-matrix brightness scaling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Scale applied to the palette background (0.0 – 1.0).
    pub background_intensity: f32,
    /// Scale applied to the digit glyph (0.0 – 1.0).
    pub foreground_intensity: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            background_intensity: 0.18,
            foreground_intensity: 0.35,
        }
    }
}

/// Core monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Timing ---
    /// Target period of one healthy cycle (milliseconds).
    pub loop_interval_ms: u32,
    /// Refresh period while in safe mode (milliseconds).
    pub safe_mode_interval_ms: u32,
    /// Width of the heartbeat LED pulse (milliseconds).
    pub heartbeat_pulse_ms: u32,

    // --- Fault handling ---
    /// Read attempts per cycle before the sample is unavailable.
    pub max_read_retries: u8,
    /// Backoff unit; attempt `n` waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u32,
    /// Consecutive unavailable cycles before safe mode.
    pub max_init_failures: u32,
    /// Delay after a sensor reinitialisation (milliseconds).
    pub reinit_settle_ms: u32,
    /// Hardware liveness timer timeout (seconds).
    pub watchdog_timeout_secs: u32,

    // --- Smoothing & classification ---
    /// EMA weight of the newest sample (0 < alpha <= 1).
    pub ema_alpha: f32,
    pub smoothed_input: SmoothedInput,
    pub domain: ClassificationDomain,
    pub sqm_calibration: SqmCalibration,

    // --- Sensor ---
    /// Counts-per-lux divisor of the two-channel sensor.
    pub lux_df: f32,
    pub ranging: RangingConfig,

    // --- Output ---
    pub display: DisplayConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::lux()
    }
}

impl MonitorConfig {
    /// Linear-lux deployment (discrete LED boards).
    pub fn lux() -> Self {
        Self {
            loop_interval_ms: 1000,
            safe_mode_interval_ms: 1000,
            heartbeat_pulse_ms: 20,

            max_read_retries: 5,
            retry_backoff_ms: 50,
            max_init_failures: 10,
            reinit_settle_ms: 500,
            watchdog_timeout_secs: 8,

            ema_alpha: 0.3,
            smoothed_input: SmoothedInput::Ema,
            domain: ClassificationDomain::Lux,
            sqm_calibration: SqmCalibration::default(),

            lux_df: 408.0,
            ranging: RangingConfig::default(),

            display: DisplayConfig::default(),
        }
    }

    /// Log-domain deployment (auto-ranging sensor + pixel matrix).
    pub fn sqm() -> Self {
        Self {
            ema_alpha: 0.85,
            domain: ClassificationDomain::Sqm,
            ..Self::lux()
        }
    }

    /// Reject combinations that would break an invariant of the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.loop_interval_ms == 0 || self.safe_mode_interval_ms == 0 {
            return Err(Error::Config("loop interval must be non-zero"));
        }
        if self.max_read_retries == 0 {
            return Err(Error::Config("max_read_retries must be at least 1"));
        }
        if self.max_init_failures == 0 {
            return Err(Error::Config("max_init_failures must be at least 1"));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(Error::Config("ema_alpha must be in (0, 1]"));
        }
        if self.lux_df <= 0.0 {
            return Err(Error::Config("lux_df must be positive"));
        }
        let r = &self.ranging;
        if r.target_low >= r.target_high {
            return Err(Error::Config("ranging target_low must be below target_high"));
        }
        if r.target_high >= r.saturation {
            return Err(Error::Config("ranging target_high must be below saturation"));
        }
        if r.max_attempts == 0 {
            return Err(Error::Config("ranging max_attempts must be at least 1"));
        }
        let d = &self.display;
        if !(0.0..=1.0).contains(&d.background_intensity)
            || !(0.0..=1.0).contains(&d.foreground_intensity)
        {
            return Err(Error::Config("display intensities must be in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = MonitorConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.domain, ClassificationDomain::Lux);
        assert_eq!(c.max_read_retries, 5);
        assert_eq!(c.max_init_failures, 10);
        assert!((c.ema_alpha - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn sqm_preset_only_changes_domain_and_alpha() {
        let lux = MonitorConfig::lux();
        let sqm = MonitorConfig::sqm();
        assert!(sqm.validate().is_ok());
        assert_eq!(sqm.domain, ClassificationDomain::Sqm);
        assert!((sqm.ema_alpha - 0.85).abs() < f32::EPSILON);
        assert_eq!(sqm.loop_interval_ms, lux.loop_interval_ms);
        assert_eq!(sqm.ranging.target_high, lux.ranging.target_high);
    }

    #[test]
    fn serde_roundtrip() {
        let c = MonitorConfig::sqm();
        let json = serde_json::to_string(&c).unwrap();
        let c2: MonitorConfig = serde_json::from_str(&json).unwrap();
        assert!((c.ema_alpha - c2.ema_alpha).abs() < 0.001);
        assert_eq!(c.domain, c2.domain);
        assert_eq!(c.ranging.saturation, c2.ranging.saturation);
    }

    #[test]
    fn zero_alpha_rejected() {
        let c = MonitorConfig {
            ema_alpha: 0.0,
            ..MonitorConfig::default()
        };
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn inverted_ranging_window_rejected() {
        let mut c = MonitorConfig::default();
        c.ranging.target_low = 60_000;
        assert!(c.validate().is_err());

        let mut c = MonitorConfig::default();
        c.ranging.target_high = 65_000;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_retry_budget_rejected() {
        let c = MonitorConfig {
            max_read_retries: 0,
            ..MonitorConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn intensities_out_of_range_rejected() {
        let mut c = MonitorConfig::default();
        c.display.foreground_intensity = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn retry_backoff_fits_inside_one_cycle() {
        let c = MonitorConfig::default();
        let total: u32 = (1..u32::from(c.max_read_retries)).map(|n| n * c.retry_backoff_ms).sum();
        assert!(
            total < c.loop_interval_ms,
            "worst-case backoff should not exceed one cycle"
        );
    }
}
