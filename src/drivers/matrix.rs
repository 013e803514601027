//! 8x8 addressable-pixel rating display.
//!
//! The whole grid is filled with the rating's palette colour at
//! background intensity, and the rating digit is drawn on top in white
//! at foreground intensity using a 3x5 font centred on the grid.
//!
//! Frames go out through any `smart_leds::SmartLedsWrite` with `RGB8`
//! colour, so the same renderer drives an RMT WS2812 chain on target and
//! a capturing fake in tests.

use smart_leds::{RGB8, SmartLedsWrite};

use crate::app::ports::IndicatorPort;
use crate::config::DisplayConfig;
use crate::error::OutputError;
use crate::processing::bortle::BortleRating;

pub const WIDTH: usize = 8;
pub const HEIGHT: usize = 8;
pub const PIXELS: usize = WIDTH * HEIGHT;

pub type Frame = [RGB8; PIXELS];

const fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
    RGB8 { r, g, b }
}

/// Background colour per rating, index 0 = Bortle 1.
pub const PALETTE: [RGB8; 9] = [
    rgb(0, 0, 40),      // 1 excellent dark sky
    rgb(0, 40, 120),    // 2 typical dark site
    rgb(0, 120, 160),   // 3 rural
    rgb(0, 160, 40),    // 4 rural / suburban transition
    rgb(160, 200, 0),   // 5 suburban
    rgb(255, 160, 0),   // 6 bright suburban
    rgb(255, 80, 0),    // 7 suburban / urban transition
    rgb(255, 0, 0),     // 8 city
    rgb(255, 0, 120),   // 9 inner city
];

const GLYPH_COLOR: RGB8 = rgb(255, 255, 255);

const GLYPH_W: usize = 3;
const GLYPH_H: usize = 5;

/// 3x5 digits, one byte per row, bit 2 = leftmost column.
const FONT: [[u8; GLYPH_H]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

/// How the chain snakes through the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Every row runs left to right.
    Progressive,
    /// Odd rows run right to left.
    Serpentine,
}

impl Wiring {
    /// Chain index of grid cell (`x`, `y`).
    pub fn index(self, x: usize, y: usize) -> usize {
        let col = match self {
            Self::Serpentine if y % 2 == 1 => WIDTH - 1 - x,
            _ => x,
        };
        y * WIDTH + col
    }
}

fn scale(c: RGB8, k: f32) -> RGB8 {
    let k = k.clamp(0.0, 1.0);
    let s = |v: u8| (f32::from(v) * k).round() as u8;
    rgb(s(c.r), s(c.g), s(c.b))
}

/// Render a rating into a frame.
pub fn render(rating: BortleRating, display: &DisplayConfig, wiring: Wiring) -> Frame {
    let idx = usize::from(rating.value() - 1);
    let background = scale(PALETTE[idx], display.background_intensity);
    let glyph_color = scale(GLYPH_COLOR, display.foreground_intensity);

    let mut frame = [background; PIXELS];

    let glyph = &FONT[usize::from(rating.value())];
    let x0 = (WIDTH - GLYPH_W) / 2;
    let y0 = (HEIGHT - GLYPH_H) / 2;
    for (dy, row) in glyph.iter().enumerate() {
        for dx in 0..GLYPH_W {
            if row & (1 << (GLYPH_W - 1 - dx)) != 0 {
                frame[wiring.index(x0 + dx, y0 + dy)] = glyph_color;
            }
        }
    }
    frame
}

pub struct MatrixDisplay<W> {
    writer: W,
    display: DisplayConfig,
    wiring: Wiring,
    last: Option<BortleRating>,
}

impl<W> MatrixDisplay<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub fn new(writer: W, display: DisplayConfig, wiring: Wiring) -> Self {
        Self {
            writer,
            display,
            wiring,
            last: None,
        }
    }

    /// Rating currently on the grid.
    pub fn shown(&self) -> Option<BortleRating> {
        self.last
    }

    pub fn release(self) -> W {
        self.writer
    }
}

impl<W> IndicatorPort for MatrixDisplay<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    fn show_rating(&mut self, rating: BortleRating) -> Result<(), OutputError> {
        let frame = render(rating, &self.display, self.wiring);
        self.writer
            .write(frame.iter().copied())
            .map_err(|_| OutputError::Pixels)?;
        self.last = Some(rating);
        Ok(())
    }
}
