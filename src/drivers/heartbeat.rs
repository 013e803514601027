//! Heartbeat LED.
//!
//! A single output pin pulsed by the service after each healthy cycle and
//! each safe-mode refresh.  The driver only tracks the level; the pulse
//! width is timed by the caller.

use embedded_hal::digital::{OutputPin, PinState};

use crate::app::ports::HeartbeatPort;
use crate::error::OutputError;

pub struct HeartbeatLed<P> {
    pin: P,
    on: bool,
    pulses: u32,
}

impl<P: OutputPin> HeartbeatLed<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            on: false,
            pulses: 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Rising edges since construction (wraps).
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeartbeatPort for HeartbeatLed<P> {
    fn set_heartbeat(&mut self, on: bool) -> Result<(), OutputError> {
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| OutputError::Gpio)?;
        if on && !self.on {
            self.pulses = self.pulses.wrapping_add(1);
        }
        self.on = on;
        Ok(())
    }
}
