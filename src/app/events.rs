//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use crate::config::ClassificationDomain;
use crate::fsm::StateId;
use crate::processing::bortle::BortleRating;

/// Structured events emitted by the monitor core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state and whether the
    /// first sensor initialisation succeeded).
    Started { state: StateId, sensor_ready: bool },

    /// One healthy cycle's report.
    Reading(ReadingReport),

    /// No usable sample this cycle.
    ReadUnavailable { consecutive_failures: u32 },

    /// A reinitialisation attempt finished.
    Reinitialized { attempt: u32, max: u32, ok: bool },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Failure budget spent; the device will show the alert rating only.
    SafeModeEntered { failures: u32 },

    /// The cadence deadline had already passed and was reset.
    BehindSchedule { late_ms: u64 },
}

/// Values logged after each healthy cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingReport {
    pub domain: ClassificationDomain,
    pub sample: f32,
    pub rolling_avg: f32,
    pub ema: f32,
    pub rating: BortleRating,
}
