//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (ESP-IDF console on target, nothing on host unless a
//! logger is installed).

use log::{Level, log};

use crate::app::events::{AppEvent, ReadingReport};
use crate::app::ports::EventSink;
use crate::config::ClassificationDomain;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// `Lux: 0.0123 | Avg: 0.0119 | EMA: 0.0121 | Bortle: 1`
pub fn format_reading(r: &ReadingReport) -> String {
    let label = match r.domain {
        ClassificationDomain::Lux => "Lux",
        ClassificationDomain::Sqm => "SQM",
    };
    format!(
        "{}: {:.4} | Avg: {:.4} | EMA: {:.4} | Bortle: {}",
        label, r.sample, r.rolling_avg, r.ema, r.rating
    )
}

/// Log level and console line for one event.
pub fn format_event(event: &AppEvent) -> (Level, String) {
    match event {
        AppEvent::Reading(r) => (Level::Info, format_reading(r)),
        AppEvent::ReadUnavailable {
            consecutive_failures,
        } => (
            Level::Warn,
            format!(
                "READ | no sample this cycle ({} in a row)",
                consecutive_failures
            ),
        ),
        AppEvent::Reinitialized { attempt, max, ok } => {
            if *ok {
                (Level::Info, format!("REINIT | attempt {}/{} ok", attempt, max))
            } else {
                (Level::Warn, format!("REINIT | attempt {}/{} failed", attempt, max))
            }
        }
        AppEvent::StateChanged { from, to } => {
            (Level::Info, format!("STATE | {:?} -> {:?}", from, to))
        }
        AppEvent::SafeModeEntered { failures } => (
            Level::Error,
            format!(
                "SAFE_MODE | {} failed cycles, showing alert rating only",
                failures
            ),
        ),
        AppEvent::BehindSchedule { late_ms } => (
            Level::Info,
            format!("CADENCE | {}ms behind, deadline reset", late_ms),
        ),
        AppEvent::Started {
            state,
            sensor_ready,
        } => (
            Level::Info,
            format!(
                "START | initial_state={:?} sensor_ready={}",
                state, sensor_ready
            ),
        ),
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let (level, line) = format_event(event);
        log!(level, "{}", line);
    }
}
