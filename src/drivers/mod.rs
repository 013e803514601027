//! Output drivers: rating indicators, heartbeat LED and liveness timer.

pub mod heartbeat;
pub mod matrix;
pub mod traffic_light;
pub mod watchdog;

#[cfg(all(target_os = "espidf", feature = "matrix-display"))]
pub mod ws2812;
