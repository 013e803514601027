//! Port traits: the hexagonal boundary between the monitor core and the
//! board it runs on.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Drivers and adapters implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them through
//! the [`Board`] context struct, so the domain core owns no hardware
//! handle of its own and every collaborator can be replaced by a mock.

use embedded_hal::delay::DelayNs;

use crate::error::{OutputError, SensorError};
use crate::processing::bortle::BortleRating;

// ───────────────────────────────────────────────────────────────
// Brightness port (driven adapter: sensor → domain)
// ───────────────────────────────────────────────────────────────

/// One brightness sample per call, already in the classification domain.
pub trait BrightnessSource {
    /// `false` until the sensor has been initialised successfully.
    fn is_ready(&self) -> bool;

    /// Take one sample.  May sleep on `delay` while the sensor settles.
    fn read_sample(&mut self, delay: &mut impl DelayNs) -> Result<f32, SensorError>;

    /// Re-run the sensor's initialisation sequence.
    fn reinit(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Output ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Anything that can present a Bortle rating: discrete LEDs, a pixel
/// matrix, a test recorder.
pub trait IndicatorPort {
    fn show_rating(&mut self, rating: BortleRating) -> Result<(), OutputError>;
}

/// Single LED pulsed once per healthy cycle.
pub trait HeartbeatPort {
    fn set_heartbeat(&mut self, on: bool) -> Result<(), OutputError>;
}

/// Hardware liveness timer.  Timeout is fixed when the adapter is built.
pub trait LivenessPort {
    fn feed(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event / record sinks (driven adapters: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Append-only text store for the single diagnostic record.
///
/// Implementations must never panic; the caller ignores the result.
pub trait RecordSink {
    fn append(&mut self, text: &str) -> Result<(), RecordError>;
}

/// The record could not be stored.  Never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordError;

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "diagnostic record not written")
    }
}

// ───────────────────────────────────────────────────────────────
// Board context
// ───────────────────────────────────────────────────────────────

/// Every hardware collaborator of the monitor, owned in one place.
///
/// Built once by `main` (or a test) and lent to the service each cycle.
pub struct Board<S, I, H, W, C, D> {
    pub source: S,
    pub indicator: I,
    pub heartbeat: H,
    pub watchdog: W,
    pub clock: C,
    pub delay: D,
}
