//! Gain / integration-time auto-ranging.
//!
//! Each sensor publishes its presets as two ascending tables.  The
//! [`AutoRanger`] holds the currently selected pair and steps it one
//! preset at a time until channel 0 lands inside the target window:
//!
//! ```text
//!  saturated / too bright : lower gain   → else shorten integration
//!  too dark               : lengthen int → else raise gain
//!  in window              : done
//! ```
//!
//! The selection is sticky: it survives across cycles and across sensor
//! reinitialisation.  Ranging never fails on its own; when the preset
//! tables or the attempt budget run out the last reading is returned as a
//! best-effort value.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::config::RangingConfig;
use crate::error::SensorError;

use super::{LightSensor, RawChannels};

/// Extra wait on top of one integration period after a preset change.
const RANGE_SETTLE_MARGIN_MS: u32 = 10;

/// Discrete presets supported by a sensor, both tables ascending.
#[derive(Debug)]
pub struct RangeCapabilities {
    /// Analog gain multipliers.
    pub gains: &'static [f32],
    /// Integration times in milliseconds.
    pub integrations_ms: &'static [u16],
}

impl RangeCapabilities {
    /// Force `setting` onto valid table indices.
    pub fn clamp(&self, setting: RangeSetting) -> RangeSetting {
        RangeSetting {
            gain_index: setting.gain_index.min(self.gains.len().saturating_sub(1)),
            integration_index: setting
                .integration_index
                .min(self.integrations_ms.len().saturating_sub(1)),
        }
    }

    pub fn gain(&self, setting: RangeSetting) -> f32 {
        self.gains[setting.gain_index]
    }

    pub fn integration_ms(&self, setting: RangeSetting) -> u16 {
        self.integrations_ms[setting.integration_index]
    }
}

/// Index pair into a sensor's [`RangeCapabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSetting {
    pub gain_index: usize,
    pub integration_index: usize,
}

impl RangeSetting {
    pub const fn new(gain_index: usize, integration_index: usize) -> Self {
        Self {
            gain_index,
            integration_index,
        }
    }
}

/// Raw counts together with the preset they were taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedReading {
    pub ch0: u16,
    pub ch1: Option<u16>,
    pub integration_ms: u16,
    pub gain: f32,
    /// Channel 0 was at or above the saturation level.
    pub saturated: bool,
}

/// Keeps channel 0 inside the configured window.
pub struct AutoRanger {
    config: RangingConfig,
    setting: RangeSetting,
}

impl AutoRanger {
    /// Start from the sensor's default preset.
    pub fn for_sensor<S: LightSensor + ?Sized>(sensor: &S, config: RangingConfig) -> Self {
        Self::new(config, sensor.capabilities().clamp(sensor.default_range()))
    }

    pub fn new(config: RangingConfig, initial: RangeSetting) -> Self {
        Self {
            config,
            setting: initial,
        }
    }

    /// The currently selected preset.
    pub fn setting(&self) -> RangeSetting {
        self.setting
    }

    /// Push the current preset to the sensor (after a reinitialisation)
    /// and wait one integration period so the next read is trusted.
    pub fn restore<S, D>(&mut self, sensor: &mut S, delay: &mut D) -> Result<(), SensorError>
    where
        S: LightSensor + ?Sized,
        D: DelayNs,
    {
        let caps = sensor.capabilities();
        self.setting = caps.clamp(self.setting);
        sensor.set_range(self.setting)?;
        delay.delay_ms(u32::from(caps.integration_ms(self.setting)) + RANGE_SETTLE_MARGIN_MS);
        Ok(())
    }

    /// Read the sensor, stepping presets until channel 0 is in range.
    ///
    /// Bus failures propagate; running out of presets or attempts does not.
    pub fn acquire<S, D>(&mut self, sensor: &mut S, delay: &mut D) -> Result<RangedReading, SensorError>
    where
        S: LightSensor + ?Sized,
        D: DelayNs,
    {
        let caps = sensor.capabilities();
        self.setting = caps.clamp(self.setting);
        let max_attempts = self.config.max_attempts.max(1);

        let mut attempt = 0u8;
        loop {
            let raw = sensor.read_raw_channels()?;
            attempt += 1;
            let reading = self.reading(raw, caps);

            let Some(next) = self.next_setting(raw.ch0, caps) else {
                return Ok(reading);
            };
            if attempt >= max_attempts {
                debug!(
                    "ranging: budget of {} reads spent, returning ch0={} as best effort",
                    max_attempts, raw.ch0
                );
                return Ok(reading);
            }

            sensor.set_range(next)?;
            debug!(
                "ranging: ch0={} gain {}x/{}ms -> {}x/{}ms",
                raw.ch0,
                caps.gain(self.setting),
                caps.integration_ms(self.setting),
                caps.gain(next),
                caps.integration_ms(next),
            );
            self.setting = next;
            delay.delay_ms(u32::from(caps.integration_ms(next)) + RANGE_SETTLE_MARGIN_MS);
        }
    }

    fn reading(&self, raw: RawChannels, caps: &RangeCapabilities) -> RangedReading {
        RangedReading {
            ch0: raw.ch0,
            ch1: raw.ch1,
            integration_ms: caps.integration_ms(self.setting),
            gain: caps.gain(self.setting),
            saturated: raw.ch0 >= self.config.saturation,
        }
    }

    /// One-step adjustment for `ch0`, or `None` when in range or when no
    /// preset in the required direction remains.
    fn next_setting(&self, ch0: u16, caps: &RangeCapabilities) -> Option<RangeSetting> {
        let s = self.setting;
        let lower_gain = (s.gain_index > 0).then(|| RangeSetting::new(s.gain_index - 1, s.integration_index));
        let raise_gain = (s.gain_index + 1 < caps.gains.len())
            .then(|| RangeSetting::new(s.gain_index + 1, s.integration_index));
        let shorten = (s.integration_index > 0)
            .then(|| RangeSetting::new(s.gain_index, s.integration_index - 1));
        let lengthen = (s.integration_index + 1 < caps.integrations_ms.len())
            .then(|| RangeSetting::new(s.gain_index, s.integration_index + 1));

        if ch0 >= self.config.saturation || ch0 > self.config.target_high {
            lower_gain.or(shorten)
        } else if ch0 < self.config.target_low {
            lengthen.or(raise_gain)
        } else {
            None
        }
    }
}
