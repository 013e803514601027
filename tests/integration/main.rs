//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the monitor against
//! mock adapters.  All tests run on the host with no real hardware
//! required.

#![cfg(not(target_os = "espidf"))]

mod lifecycle_tests;
mod mock_hw;
mod scenario_tests;
