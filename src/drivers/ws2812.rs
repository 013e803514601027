//! WS2812 chain over the ESP32 RMT peripheral.
//!
//! Exposes the chain as a `smart_leds::SmartLedsWrite` so
//! [`MatrixDisplay`](super::matrix::MatrixDisplay) can drive it.  Each
//! colour goes out as 24 bits, GRB order, MSB first.

use core::time::Duration;

use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::{
    PinState, Pulse, RmtChannel, TxRmtDriver, VariableLengthSignal,
};
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;
use smart_leds::{RGB8, SmartLedsWrite};

// Bit timings from the WS2812B datasheet.
const T0H_NS: u64 = 350;
const T0L_NS: u64 = 800;
const T1H_NS: u64 = 700;
const T1L_NS: u64 = 600;

pub struct RmtPixelWriter<'d> {
    tx: TxRmtDriver<'d>,
    zero: (Pulse, Pulse),
    one: (Pulse, Pulse),
}

impl<'d> RmtPixelWriter<'d> {
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'd,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
    ) -> Result<Self, EspError> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)?;
        let hz = tx.counter_clock()?;
        let pulse = |state, ns| Pulse::new_with_duration(hz, state, &Duration::from_nanos(ns));
        let zero = (pulse(PinState::High, T0H_NS)?, pulse(PinState::Low, T0L_NS)?);
        let one = (pulse(PinState::High, T1H_NS)?, pulse(PinState::Low, T1L_NS)?);
        Ok(Self { tx, zero, one })
    }
}

impl SmartLedsWrite for RmtPixelWriter<'_> {
    type Error = EspError;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut signal = VariableLengthSignal::new();
        for c in iterator {
            let c: RGB8 = c.into();
            let word = (u32::from(c.g) << 16) | (u32::from(c.r) << 8) | u32::from(c.b);
            for bit in (0..24).rev() {
                let (high, low) = if word & (1 << bit) != 0 {
                    &self.one
                } else {
                    &self.zero
                };
                signal.push([high, low])?;
            }
        }
        self.tx.start_blocking(&signal)
    }
}
