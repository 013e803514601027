//! Three discrete indicator LEDs (green / yellow / red).
//!
//! Exactly one lamp is lit for any rating:
//!
//! | Rating | Lamp   |
//! |--------|--------|
//! | 1 – 3  | green  |
//! | 4 – 5  | yellow |
//! | 6 – 9  | red    |
//!
//! Pins are any `embedded_hal::digital::OutputPin`, active high.

use embedded_hal::digital::{OutputPin, PinState};

use crate::app::ports::IndicatorPort;
use crate::error::OutputError;
use crate::processing::bortle::BortleRating;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lamp {
    Green,
    Yellow,
    Red,
}

impl Lamp {
    pub fn for_rating(rating: BortleRating) -> Self {
        match rating.value() {
            0..=3 => Self::Green,
            4 | 5 => Self::Yellow,
            _ => Self::Red,
        }
    }
}

pub struct TrafficLight<G, Y, R> {
    green: G,
    yellow: Y,
    red: R,
    lit: Option<Lamp>,
}

impl<G, Y, R> TrafficLight<G, Y, R>
where
    G: OutputPin,
    Y: OutputPin,
    R: OutputPin,
{
    pub fn new(green: G, yellow: Y, red: R) -> Self {
        Self {
            green,
            yellow,
            red,
            lit: None,
        }
    }

    /// Lamp currently driven high, if any.
    pub fn lit(&self) -> Option<Lamp> {
        self.lit
    }

    /// All lamps off.
    pub fn off(&mut self) -> Result<(), OutputError> {
        self.drive(None)
    }

    pub fn release(self) -> (G, Y, R) {
        (self.green, self.yellow, self.red)
    }

    fn drive(&mut self, lamp: Option<Lamp>) -> Result<(), OutputError> {
        let level = |l: Lamp| PinState::from(lamp == Some(l));
        // Lamps going dark switch before the new one lights.
        let order = [Lamp::Green, Lamp::Yellow, Lamp::Red]
            .into_iter()
            .filter(|l| Some(*l) != lamp)
            .chain(lamp);
        for l in order {
            match l {
                Lamp::Green => self.green.set_state(level(l)).map_err(|_| OutputError::Gpio)?,
                Lamp::Yellow => self.yellow.set_state(level(l)).map_err(|_| OutputError::Gpio)?,
                Lamp::Red => self.red.set_state(level(l)).map_err(|_| OutputError::Gpio)?,
            }
        }
        self.lit = lamp;
        Ok(())
    }
}

impl<G, Y, R> IndicatorPort for TrafficLight<G, Y, R>
where
    G: OutputPin,
    Y: OutputPin,
    R: OutputPin,
{
    fn show_rating(&mut self, rating: BortleRating) -> Result<(), OutputError> {
        self.drive(Some(Lamp::for_rating(rating)))
    }
}
