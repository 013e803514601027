//! TSL2591 two-channel light-to-digital converter.
//!
//! Channel 0 sees full spectrum, channel 1 infrared only.  Illuminance
//! is derived with the IR-corrected formula in
//! [`ir_corrected_lux`](crate::processing::bortle::ir_corrected_lux).
//!
//! Four gain steps (1x – 9876x) and six integration times (100 – 600 ms)
//! give the auto-ranger enough headroom to go from street lighting down
//! to a moonless sky.

use log::info;

use crate::error::SensorError;
use crate::processing::bortle::ir_corrected_lux;

use super::bus::RegisterBus;
use super::ranging::{RangeCapabilities, RangeSetting, RangedReading};
use super::{LightSensor, RawChannels};

/// Fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x29;

const COMMAND: u8 = 0xA0;
const REG_ENABLE: u8 = 0x00;
const REG_CONTROL: u8 = 0x01;
const REG_ID: u8 = 0x12;
const REG_C0DATAL: u8 = 0x14;

const ENABLE_PON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;
const DEVICE_ID: u8 = 0x50;

static GAINS: [f32; 4] = [1.0, 25.0, 428.0, 9876.0];
static GAIN_CODES: [u8; 4] = [0x00, 0x10, 0x20, 0x30];
static INTEGRATIONS_MS: [u16; 6] = [100, 200, 300, 400, 500, 600];

static CAPABILITIES: RangeCapabilities = RangeCapabilities {
    gains: &GAINS,
    integrations_ms: &INTEGRATIONS_MS,
};

pub struct Tsl2591<B> {
    bus: B,
    lux_df: f32,
    setting: RangeSetting,
    ready: bool,
}

impl<B: RegisterBus> Tsl2591<B> {
    /// `lux_df` is the counts-per-lux divisor for this optical stack.
    pub fn new(bus: B, lux_df: f32) -> Self {
        Self {
            bus,
            lux_df,
            setting: RangeSetting::new(1, 2),
            ready: false,
        }
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn control_byte(setting: RangeSetting) -> u8 {
        GAIN_CODES[setting.gain_index] | setting.integration_index as u8
    }
}

impl<B: RegisterBus> LightSensor for Tsl2591<B> {
    fn init(&mut self) -> Result<(), SensorError> {
        self.ready = false;

        let mut id = [0u8; 1];
        self.bus.read_register(COMMAND | REG_ID, &mut id)?;
        if id[0] != DEVICE_ID {
            return Err(SensorError::UnexpectedId(id[0]));
        }

        self.bus
            .write_register(COMMAND | REG_CONTROL, &[Self::control_byte(self.setting)])?;
        self.bus
            .write_register(COMMAND | REG_ENABLE, &[ENABLE_PON | ENABLE_AEN])?;

        self.ready = true;
        info!(
            "TSL2591 ready: {}x gain, {} ms",
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
        // Medium gain, 300 ms.
        RangeSetting::new(1, 2)
    }

    fn set_range(&mut self, setting: RangeSetting) -> Result<(), SensorError> {
        let setting = CAPABILITIES.clamp(setting);
        self.bus
            .write_register(COMMAND | REG_CONTROL, &[Self::control_byte(setting)])?;
        self.setting = setting;
        Ok(())
    }

    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }
        let mut buf = [0u8; 4];
        self.bus.read_register(COMMAND | REG_C0DATAL, &mut buf)?;
        let ch0 = u16::from_le_bytes([buf[0], buf[1]]);
        let ch1 = u16::from_le_bytes([buf[2], buf[3]]);
        Ok(RawChannels { ch0, ch1: Some(ch1) })
    }

    fn lux(&self, reading: &RangedReading) -> f32 {
        ir_corrected_lux(
            reading.ch0,
            reading.ch1.unwrap_or(0),
            reading.integration_ms,
            reading.gain,
            self.lux_df,
        )
    }
}
