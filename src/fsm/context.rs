//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds this cycle's sample, the failure counters, the
//! smoothing pipeline, the configuration and the commands the service
//! applies after the tick.  Think of it as the "blackboard" in a
//! blackboard architecture.

use crate::config::MonitorConfig;
use crate::processing::bortle::BortleRating;
use crate::processing::{Pipeline, PipelineOutput};

// ---------------------------------------------------------------------------
// Cycle commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// What the service must do once the tick returns, in this order:
/// reinitialise, show, pulse, feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCommands {
    /// Rating to present; `None` leaves the indicator untouched.
    pub display: Option<BortleRating>,
    /// Run the sensor initialisation sequence.
    pub reinit_sensor: bool,
    /// Sleep after the reinitialisation (milliseconds).
    pub settle_ms: u32,
    /// Pulse the heartbeat LED.
    pub heartbeat: bool,
    /// Feed the liveness timer.
    pub feed_watchdog: bool,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Input --
    /// This cycle's brightness sample; `None` when the read was unavailable.
    pub sample: Option<f32>,

    // -- Failure accounting --
    /// Cycles in a row without a usable sample.
    pub consecutive_failures: u32,

    // -- Processing --
    pub pipeline: Pipeline,
    /// Output of the last healthy cycle.
    pub last_output: Option<PipelineOutput>,

    // -- Outputs --
    pub commands: CycleCommands,

    // -- Configuration --
    pub config: MonitorConfig,
}

impl FsmContext {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            sample: None,
            consecutive_failures: 0,
            pipeline: Pipeline::new(&config),
            last_output: None,
            commands: CycleCommands::default(),
            config,
        }
    }

    /// Load this cycle's sample and clear last cycle's commands.
    pub fn begin_cycle(&mut self, sample: Option<f32>) {
        self.sample = sample;
        self.commands = CycleCommands::default();
    }

    /// `true` once the failure budget is spent.
    pub fn failure_budget_spent(&self) -> bool {
        self.consecutive_failures >= self.config.max_init_failures
    }
}
