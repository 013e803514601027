//! Register-level access to a two-wire device.
//!
//! Sensor drivers speak to their chip through [`RegisterBus`] only.  The
//! production implementation, [`I2cRegisterBus`], binds any
//! `embedded_hal::i2c::I2c` to a fixed 7-bit address; tests substitute a
//! register-map fake.

use embedded_hal::i2c::{Error as _, I2c};

use crate::error::BusError;

/// Longest single register write any driver issues (register + payload).
const MAX_WRITE_LEN: usize = 8;

/// Synchronous register transactions against one device.
pub trait RegisterBus {
    /// Write `data` starting at register `reg`.
    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), BusError>;

    /// Fill `buf` with consecutive bytes starting at register `reg`.
    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

/// [`RegisterBus`] over an `embedded-hal` I2C bus at a fixed address.
pub struct I2cRegisterBus<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cRegisterBus<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying I2C bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), BusError> {
        let mut frame: heapless::Vec<u8, MAX_WRITE_LEN> = heapless::Vec::new();
        frame.push(reg).map_err(|_| BusError::Malformed)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| BusError::Malformed)?;
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| BusError::from(e.kind()))
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if buf.is_empty() {
            return Err(BusError::Malformed);
        }
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|e| BusError::from(e.kind()))
    }
}
