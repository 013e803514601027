//! GPIO / peripheral pin assignments for the Skyglow sensor board.
//!
//! Single source of truth: `main` references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Light sensor (I2C0)
// ---------------------------------------------------------------------------

/// I2C data line to the light sensor.
pub const I2C_SDA_GPIO: i32 = 8;
/// I2C clock line to the light sensor.
pub const I2C_SCL_GPIO: i32 = 9;
/// Bus clock.  Both supported sensors accept fast mode.
pub const I2C_BAUDRATE_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Discrete indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

/// Bortle 1-3 (excellent).
pub const LED_GREEN_GPIO: i32 = 2;
/// Bortle 4-5 (moderate).
pub const LED_YELLOW_GPIO: i32 = 4;
/// Bortle 6-9 (poor).
pub const LED_RED_GPIO: i32 = 3;
/// On-board LED used for the heartbeat pulse.
pub const HEARTBEAT_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// 8x8 WS2812 matrix (RMT channel 0)
// ---------------------------------------------------------------------------

/// Data line of the pixel matrix.
pub const MATRIX_DATA_GPIO: i32 = 14;
