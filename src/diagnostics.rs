//! Best-effort fault record.
//!
//! On an unrecoverable fault (an error escaping the monitor loop, or a
//! panic) one short text record is appended to
//! [`DIAGNOSTIC_RECORD_PATH`](crate::config::DIAGNOSTIC_RECORD_PATH).
//! Writing the record must never make things worse: every storage error
//! is logged and dropped.

use core::fmt::Write as _;

use log::{error, warn};

use crate::app::ports::RecordSink;

/// Longest cause kept in a record; the rest is cut.
pub const CAUSE_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    pub uptime_secs: u64,
    pub cause: heapless::String<CAUSE_CAPACITY>,
}

impl FaultRecord {
    pub fn new(uptime_secs: u64, cause: &str) -> Self {
        let mut c = heapless::String::new();
        // Cut on a char boundary so the push cannot fail halfway.
        let mut end = cause.len().min(CAUSE_CAPACITY);
        while !cause.is_char_boundary(end) {
            end -= 1;
        }
        let _ = c.push_str(&cause[..end]);
        Self {
            uptime_secs,
            cause: c,
        }
    }

    /// Build a record from anything printable.
    pub fn from_display(uptime_secs: u64, cause: &dyn core::fmt::Display) -> Self {
        let mut text: heapless::String<CAUSE_CAPACITY> = heapless::String::new();
        // Overflow truncates; the prefix is still useful.
        let _ = write!(text, "{}", cause);
        Self {
            uptime_secs,
            cause: text,
        }
    }

    /// `"\n--- Error at 42s ---\ncause\n"`
    pub fn render(&self) -> String {
        format!("\n--- Error at {}s ---\n{}\n", self.uptime_secs, self.cause)
    }
}

/// Append `record` to `sink`.  Failures are logged, never returned.
pub fn record_fault(sink: &mut impl RecordSink, record: &FaultRecord) {
    error!("FAULT at {}s: {}", record.uptime_secs, record.cause);
    if let Err(e) = sink.append(&record.render()) {
        warn!("{}", e);
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook: append a FaultRecord before the default handler aborts
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that appends a [`FaultRecord`] to the diagnostic
/// file.
///
/// Call once during init, after the filesystem holding the record path is
/// mounted.  If it is not, the append fails silently.
pub fn install_panic_handler() {
    use crate::adapters::record_file::FileRecordSink;
    use crate::adapters::time::SystemClock;
    use crate::config::DIAGNOSTIC_RECORD_PATH;

    let clock = SystemClock::new();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        let record = FaultRecord::new(clock.uptime_secs(), reason);
        let mut sink = FileRecordSink::new(DIAGNOSTIC_RECORD_PATH);
        record_fault(&mut sink, &record);
    }));
}
