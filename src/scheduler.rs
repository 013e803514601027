//! Fixed-cadence cycle timer.
//!
//! Absolute-deadline scheme: every cycle moves the deadline forward by one
//! period and sleeps until it.  A cycle that overruns does not trigger a
//! burst of catch-up cycles; the deadline is reset to "now" instead.
//!
//! ```text
//!  next ──period──▶ next ──period──▶ next          on time: sleep(next - now)
//!                          now ─┐
//!                     next ◀────┘                   late:    next = now, no sleep
//! ```

use log::debug;

/// What the caller should do before starting the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleWait {
    /// Sleep this many milliseconds.
    Sleep(u32),
    /// The deadline had passed by `late_ms`; start immediately.
    Behind { late_ms: u64 },
}

pub struct CycleTimer {
    period_ms: u64,
    next_ms: u64,
}

impl CycleTimer {
    /// Anchor the first deadline at `now_ms`.
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        Self {
            period_ms: u64::from(period_ms),
            next_ms: now_ms,
        }
    }

    /// Change the cadence.  Takes effect from the next deadline on.
    pub fn set_period(&mut self, period_ms: u32) {
        self.period_ms = u64::from(period_ms);
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Absolute time of the pending deadline.
    pub fn deadline_ms(&self) -> u64 {
        self.next_ms
    }

    /// Advance the deadline by one period and compute the wait from `now_ms`.
    pub fn next_wait(&mut self, now_ms: u64) -> CycleWait {
        self.next_ms = self.next_ms.saturating_add(self.period_ms);
        if self.next_ms >= now_ms {
            let wait = (self.next_ms - now_ms).min(u64::from(u32::MAX));
            CycleWait::Sleep(wait as u32)
        } else {
            let late_ms = now_ms - self.next_ms;
            debug!("cycle overran by {} ms, resetting deadline", late_ms);
            self.next_ms = now_ms;
            CycleWait::Behind { late_ms }
        }
    }
}
