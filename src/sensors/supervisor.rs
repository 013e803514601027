//! Bounded-retry wrapper around a brightness source.
//!
//! ```text
//!  attempt 1 ─✗─ sleep 1·base ─ attempt 2 ─✗─ sleep 2·base ─ … ─ attempt N ─✗─▶ None
//!      └─✓──────────────────────────────────────────────────────────────────▶ Some(x)
//! ```
//!
//! No sleep follows the final attempt.  A sensor that is not initialised
//! cannot succeed on retry, so it short-circuits to `None` at once.

use embedded_hal::delay::DelayNs;
use log::{error, warn};

use crate::app::ports::BrightnessSource;
use crate::error::SensorError;

pub struct ReadSupervisor {
    max_retries: u8,
    base_backoff_ms: u32,
    failed_reads: u32,
}

impl ReadSupervisor {
    pub fn new(max_retries: u8, base_backoff_ms: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_backoff_ms,
            failed_reads: 0,
        }
    }

    /// One logical brightness read.  `None` means unavailable this cycle.
    pub fn read_brightness<B, D>(&mut self, source: &mut B, delay: &mut D) -> Option<f32>
    where
        B: BrightnessSource,
        D: DelayNs,
    {
        if !source.is_ready() {
            warn!("Sensor not initialised, skipping read");
            self.failed_reads = self.failed_reads.saturating_add(1);
            return None;
        }

        let mut last_err = SensorError::NotInitialized;
        for attempt in 1..=self.max_retries {
            match source.read_sample(delay) {
                Ok(value) => {
                    self.failed_reads = 0;
                    return Some(value);
                }
                Err(e) => {
                    warn!("Read attempt {}/{} failed: {}", attempt, self.max_retries, e);
                    last_err = e;
                    if attempt < self.max_retries {
                        delay.delay_ms(u32::from(attempt) * self.base_backoff_ms);
                    }
                }
            }
        }

        error!(
            "All {} read attempts failed, last error: {}",
            self.max_retries, last_err
        );
        self.failed_reads = self.failed_reads.saturating_add(1);
        None
    }

    /// Logical reads in a row that ended unavailable.
    pub fn failed_reads(&self) -> u32 {
        self.failed_reads
    }
}
