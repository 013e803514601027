//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the monitor's cycle orchestration: read, smooth,
//! classify, display, feed.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
