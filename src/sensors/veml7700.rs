//! VEML7700 single-channel ambient light sensor.
//!
//! Only the ALS channel feeds the brightness sample; the WHITE channel is
//! ignored.  Illuminance is counts times the datasheet resolution, which
//! scales inversely with gain and integration time (0.0036 lx/count at
//! 2x / 800 ms).

use log::info;

use crate::error::SensorError;

use super::bus::RegisterBus;
use super::ranging::{RangeCapabilities, RangeSetting, RangedReading};
use super::{LightSensor, RawChannels};

/// Fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x10;

const REG_ALS_CONF: u8 = 0x00;
const REG_POWER_SAVING: u8 = 0x03;
const REG_ALS: u8 = 0x04;
const REG_ID: u8 = 0x07;

const DEVICE_ID: u8 = 0x81;

const GAIN_SHIFT: u16 = 11;
const IT_SHIFT: u16 = 6;

/// lux per count = RESOLUTION_NUMERATOR / (gain * integration_ms)
const RESOLUTION_NUMERATOR: f32 = 5.76;

// Ascending sensitivity; the register codes are not monotonic.
static GAINS: [f32; 4] = [0.125, 0.25, 1.0, 2.0];
static GAIN_CODES: [u16; 4] = [0b10, 0b11, 0b00, 0b01];
static INTEGRATIONS_MS: [u16; 6] = [25, 50, 100, 200, 400, 800];
static IT_CODES: [u16; 6] = [0b1100, 0b1000, 0b0000, 0b0001, 0b0010, 0b0011];

static CAPABILITIES: RangeCapabilities = RangeCapabilities {
    gains: &GAINS,
    integrations_ms: &INTEGRATIONS_MS,
};

pub struct Veml7700<B> {
    bus: B,
    setting: RangeSetting,
    ready: bool,
}

impl<B: RegisterBus> Veml7700<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            setting: RangeSetting::new(3, 5),
            ready: false,
        }
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// ALS_CONF word for `setting` with the sensor powered on.
    fn conf_word(setting: RangeSetting) -> u16 {
        (GAIN_CODES[setting.gain_index] << GAIN_SHIFT)
            | (IT_CODES[setting.integration_index] << IT_SHIFT)
    }

    fn write_conf(&mut self, setting: RangeSetting) -> Result<(), SensorError> {
        self.bus
            .write_register(REG_ALS_CONF, &Self::conf_word(setting).to_le_bytes())?;
        Ok(())
    }
}

impl<B: RegisterBus> LightSensor for Veml7700<B> {
    fn init(&mut self) -> Result<(), SensorError> {
        self.ready = false;

        let mut id = [0u8; 2];
        self.bus.read_register(REG_ID, &mut id)?;
        if id[0] != DEVICE_ID {
            return Err(SensorError::UnexpectedId(id[0]));
        }

        self.write_conf(self.setting)?;
        self.bus.write_register(REG_POWER_SAVING, &[0x00, 0x00])?;

        self.ready = true;
        info!(
            "VEML7700 ready: {}x gain, {} ms",
            CAPABILITIES.gain(self.setting),
            CAPABILITIES.integration_ms(self.setting)
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn capabilities(&self) -> &'static RangeCapabilities {
        &CAPABILITIES
    }

    fn default_range(&self) -> RangeSetting {
        // Most sensitive preset; night-sky readings start near the floor.
        RangeSetting::new(3, 5)
    }

    fn set_range(&mut self, setting: RangeSetting) -> Result<(), SensorError> {
        let setting = CAPABILITIES.clamp(setting);
        self.write_conf(setting)?;
        self.setting = setting;
        Ok(())
    }

    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }
        let mut buf = [0u8; 2];
        self.bus.read_register(REG_ALS, &mut buf)?;
        Ok(RawChannels {
            ch0: u16::from_le_bytes(buf),
            ch1: None,
        })
    }

    fn lux(&self, reading: &RangedReading) -> f32 {
        let resolution = RESOLUTION_NUMERATOR / (reading.gain * f32::from(reading.integration_ms));
        f32::from(reading.ch0) * resolution
    }
}
