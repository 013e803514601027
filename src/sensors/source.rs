//! Sensor + auto-ranger + unit conversion, as one brightness source.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::BrightnessSource;
use crate::config::{ClassificationDomain, MonitorConfig, SqmCalibration};
use crate::error::SensorError;
use crate::processing::bortle::sqm_metric;

use super::LightSensor;
use super::ranging::{AutoRanger, RangeSetting};

/// Produces one brightness sample per call in the configured domain:
/// lux, or the SQM metric derived from it.
pub struct RangedSource<S> {
    sensor: S,
    ranger: AutoRanger,
    domain: ClassificationDomain,
    calibration: SqmCalibration,
}

impl<S: LightSensor> RangedSource<S> {
    pub fn new(sensor: S, config: &MonitorConfig) -> Self {
        let ranger = AutoRanger::for_sensor(&sensor, config.ranging);
        Self {
            sensor,
            ranger,
            domain: config.domain,
            calibration: config.sqm_calibration,
        }
    }

    /// Currently selected preset.
    pub fn range(&self) -> RangeSetting {
        self.ranger.setting()
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

impl<S: LightSensor> BrightnessSource for RangedSource<S> {
    fn is_ready(&self) -> bool {
        self.sensor.is_ready()
    }

    fn read_sample(&mut self, delay: &mut impl DelayNs) -> Result<f32, SensorError> {
        if !self.sensor.is_ready() {
            return Err(SensorError::NotInitialized);
        }
        let reading = self.ranger.acquire(&mut self.sensor, delay)?;
        let lux = self.sensor.lux(&reading);
        Ok(match self.domain {
            ClassificationDomain::Lux => lux,
            ClassificationDomain::Sqm => sqm_metric(lux, &self.calibration),
        })
    }

    fn reinit(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.sensor.init()?;
        // Keep the preset ranging had settled on.
        self.ranger.restore(&mut self.sensor, delay)?;
        let setting = self.ranger.setting();
        info!(
            "Sensor initialised at preset gain#{} / integration#{}",
            setting.gain_index, setting.integration_index
        );
        Ok(())
    }
}
