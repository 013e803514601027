//! Unified error types for the Skyglow firmware.
//!
//! One `Error` enum that every subsystem converts into, so the top-level
//! loop handles faults uniformly.  All variants are `Copy` so they can be
//! passed through the read supervisor and the FSM without allocation.
//!
//! Only [`Error`] ever escapes a control cycle.  Bus and sensor errors are
//! absorbed by the read supervisor and surface as an unavailable sample.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The light sensor could not be read or configured.
    Sensor(SensorError),
    /// An indicator output (LED pin or pixel strip) rejected a write.
    Output(OutputError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Failure of a single two-wire register transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Address or data byte was not acknowledged (device unreachable).
    Nack,
    /// The transaction did not complete in time.
    Timeout,
    /// The reply had the wrong length or an impossible value.
    Malformed,
    /// Bus-level fault (arbitration loss, stuck line, overrun).
    Bus,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::Timeout => write!(f, "bus timeout"),
            Self::Malformed => write!(f, "malformed reply"),
            Self::Bus => write!(f, "bus fault"),
        }
    }
}

impl From<embedded_hal::i2c::ErrorKind> for BusError {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss | ErrorKind::Bus | ErrorKind::Overrun => Self::Bus,
            // ESP-IDF reports its transaction timeout as `Other`.
            _ => Self::Timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A register transaction failed.
    Bus(BusError),
    /// The driver has not completed `init()` since construction or the
    /// last failure.
    NotInitialized,
    /// The device answered with an unexpected identification byte.
    UnexpectedId(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::NotInitialized => write!(f, "sensor not initialised"),
            Self::UnexpectedId(id) => write!(f, "unexpected device id 0x{id:02x}"),
        }
    }
}

impl From<BusError> for SensorError {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Sensor(SensorError::Bus(e))
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// A GPIO level write failed.
    Gpio,
    /// The pixel strip driver rejected a frame.
    Pixels,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio => write!(f, "GPIO write failed"),
            Self::Pixels => write!(f, "pixel frame write failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
