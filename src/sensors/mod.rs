//! Light sensor subsystem: register bus, chip drivers, auto-ranging and
//! the retrying read path.
//!
//! ```text
//!  RegisterBus ─▶ LightSensor (tsl2591 / veml7700)
//!                     │
//!                AutoRanger ─▶ RangedSource (lux or SQM sample)
//!                                   │
//!                             ReadSupervisor ─▶ Option<f32>
//! ```
//!
//! Every chip driver implements the single [`LightSensor`] capability
//! contract; sensors without a control you need simply publish a one-entry
//! preset table.

pub mod bus;
pub mod ranging;
pub mod source;
pub mod supervisor;
pub mod tsl2591;
pub mod veml7700;

use crate::error::SensorError;
use ranging::{RangeCapabilities, RangeSetting, RangedReading};

/// Counts from one integration period.  Consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChannels {
    /// Primary (visible or full-spectrum) channel.
    pub ch0: u16,
    /// Secondary (infrared) channel, if the chip has one.
    pub ch1: Option<u16>,
}

/// Capability contract every light-sensor driver provides.
///
/// Reads are not synchronised with the integration period; after `init`
/// or `set_range` the caller waits one integration time before trusting
/// a read.
pub trait LightSensor {
    /// Probe, power up and configure the chip with its current preset.
    fn init(&mut self) -> Result<(), SensorError>;

    /// `true` once `init` has succeeded.
    fn is_ready(&self) -> bool;

    /// Presets this chip supports.
    fn capabilities(&self) -> &'static RangeCapabilities;

    /// Preset used before any ranging has happened.
    fn default_range(&self) -> RangeSetting;

    /// Program gain and integration time.
    fn set_range(&mut self, setting: RangeSetting) -> Result<(), SensorError>;

    /// Read all channels for the last completed integration period.
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError>;

    /// Convert counts taken at a known preset to illuminance.
    fn lux(&self, reading: &RangedReading) -> f32;
}
