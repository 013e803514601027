//! Monitor service: the hexagonal core.
//!
//! [`MonitorService`] owns the FSM, its context, the read supervisor and
//! the cycle timer.  All I/O flows through the [`Board`] handed in at each
//! call, so the whole lifecycle runs against mock adapters in tests.
//!
//! ```text
//!  BrightnessSource ──▶ ┌──────────────────────────┐ ──▶ IndicatorPort
//!                       │      MonitorService       │ ──▶ HeartbeatPort
//!  Clock · DelayNs ───▶ │  Supervisor · FSM · Timer │ ──▶ LivenessPort
//!                       └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Within one cycle the order is fixed: read, smooth, classify, show,
//! pulse, feed, then sleep to the next deadline.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::processing::PipelineOutput;
use crate::scheduler::{CycleTimer, CycleWait};
use crate::sensors::supervisor::ReadSupervisor;

use super::events::{AppEvent, ReadingReport};
use super::ports::{
    Board, BrightnessSource, Clock, EventSink, HeartbeatPort, IndicatorPort, LivenessPort,
};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    fsm: Fsm,
    ctx: FsmContext,
    supervisor: ReadSupervisor,
    timer: Option<CycleTimer>,
    cycle_count: u64,
    reinit_attempts: u32,
}

impl MonitorService {
    /// Construct the service.  Does **not** touch hardware: call
    /// [`start`](Self::start) next.
    pub fn new(config: MonitorConfig) -> Self {
        let supervisor = ReadSupervisor::new(config.max_read_retries, config.retry_backoff_ms);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Running);
        Self {
            fsm,
            ctx,
            supervisor,
            timer: None,
            cycle_count: 0,
            reinit_attempts: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise the sensor, start the FSM and anchor the cadence.
    ///
    /// A failed initialisation is not fatal: the first cycle's read will
    /// come back unavailable and the normal recovery path takes over.
    pub fn start<S, I, H, W, C, D>(
        &mut self,
        board: &mut Board<S, I, H, W, C, D>,
        sink: &mut impl EventSink,
    ) where
        S: BrightnessSource,
        C: Clock,
        D: DelayNs,
    {
        let sensor_ready = match board.source.reinit(&mut board.delay) {
            Ok(()) => true,
            Err(e) => {
                warn!("Initial sensor setup failed: {}", e);
                false
            }
        };
        self.fsm.start(&mut self.ctx);
        self.timer = Some(CycleTimer::new(
            self.ctx.config.loop_interval_ms,
            board.clock.now_ms(),
        ));
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            sensor_ready,
        });
        info!("MonitorService started in {:?}", self.fsm.current_state());
    }

    /// Start, then cycle forever.  Returns only with a fault that escaped
    /// a cycle; the caller records it and halts.
    pub fn run<S, I, H, W, C, D>(
        &mut self,
        board: &mut Board<S, I, H, W, C, D>,
        sink: &mut impl EventSink,
    ) -> Result<Infallible>
    where
        S: BrightnessSource,
        I: IndicatorPort,
        H: HeartbeatPort,
        W: LivenessPort,
        C: Clock,
        D: DelayNs,
    {
        self.start(board, sink);
        loop {
            self.run_cycle(board, sink)?;
            self.wait_for_next_cycle(board, sink);
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One cycle without the cadence sleep.
    pub fn run_cycle<S, I, H, W, C, D>(
        &mut self,
        board: &mut Board<S, I, H, W, C, D>,
        sink: &mut impl EventSink,
    ) -> Result<()>
    where
        S: BrightnessSource,
        I: IndicatorPort,
        H: HeartbeatPort,
        W: LivenessPort,
        C: Clock,
        D: DelayNs,
    {
        self.cycle_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Read (never in safe mode)
        let sample = if prev_state == StateId::SafeMode {
            None
        } else {
            self.supervisor
                .read_brightness(&mut board.source, &mut board.delay)
        };

        // 2. Smooth + classify + decide
        self.ctx.begin_cycle(sample);
        self.fsm.tick(&mut self.ctx);
        let after_tick = self.fsm.current_state();
        self.emit_transition(prev_state, after_tick, sink);

        if prev_state == StateId::Running && after_tick != StateId::Running {
            sink.emit(&AppEvent::ReadUnavailable {
                consecutive_failures: self.ctx.consecutive_failures,
            });
        }
        if after_tick == StateId::SafeMode && prev_state != StateId::SafeMode {
            sink.emit(&AppEvent::SafeModeEntered {
                failures: self.ctx.consecutive_failures,
            });
            if let Some(timer) = self.timer.as_mut() {
                timer.set_period(self.ctx.config.safe_mode_interval_ms);
            }
        }

        // 3. Apply commands
        self.apply_commands(board, sink)?;

        // 4. Reinitializing always hands back to Running in the same cycle
        if after_tick == StateId::Reinitializing {
            self.fsm.tick(&mut self.ctx);
            self.emit_transition(after_tick, self.fsm.current_state(), sink);
        }

        if prev_state == StateId::Running && after_tick == StateId::Running {
            if let Some(out) = self.ctx.last_output {
                self.emit_reading(out, sink);
            }
        }
        Ok(())
    }

    /// Sleep until the next cycle deadline.
    pub fn wait_for_next_cycle<S, I, H, W, C, D>(
        &mut self,
        board: &mut Board<S, I, H, W, C, D>,
        sink: &mut impl EventSink,
    ) where
        C: Clock,
        D: DelayNs,
    {
        let now = board.clock.now_ms();
        let period = self.ctx.config.loop_interval_ms;
        let timer = self
            .timer
            .get_or_insert_with(|| CycleTimer::new(period, now));
        match timer.next_wait(now) {
            CycleWait::Sleep(ms) => board.delay.delay_ms(ms),
            CycleWait::Behind { late_ms } => sink.emit(&AppEvent::BehindSchedule { late_ms }),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.ctx.consecutive_failures
    }

    /// Sensor reinitialisations issued by the recovery path.
    pub fn reinit_attempts(&self) -> u32 {
        self.reinit_attempts
    }

    /// Cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Smoothing/classification result of the last healthy cycle.
    pub fn last_output(&self) -> Option<PipelineOutput> {
        self.ctx.last_output
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Execute the FSM's commands in order: reinit, show, pulse, feed.
    fn apply_commands<S, I, H, W, C, D>(
        &mut self,
        board: &mut Board<S, I, H, W, C, D>,
        sink: &mut impl EventSink,
    ) -> Result<()>
    where
        S: BrightnessSource,
        I: IndicatorPort,
        H: HeartbeatPort,
        W: LivenessPort,
        D: DelayNs,
    {
        let cmds = self.ctx.commands;

        // ── Recovery ─────────────────────────────────────────
        if cmds.reinit_sensor {
            self.reinit_attempts += 1;
            let ok = match board.source.reinit(&mut board.delay) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Sensor reinitialisation failed: {}", e);
                    false
                }
            };
            board.delay.delay_ms(cmds.settle_ms);
            sink.emit(&AppEvent::Reinitialized {
                attempt: self.ctx.consecutive_failures,
                max: self.ctx.config.max_init_failures,
                ok,
            });
        }

        // ── Indicator ────────────────────────────────────────
        if let Some(rating) = cmds.display {
            board.indicator.show_rating(rating)?;
        }

        // ── Heartbeat ────────────────────────────────────────
        if cmds.heartbeat {
            board.heartbeat.set_heartbeat(true)?;
            board.delay.delay_ms(self.ctx.config.heartbeat_pulse_ms);
            board.heartbeat.set_heartbeat(false)?;
        }

        // ── Liveness timer (last) ────────────────────────────
        if cmds.feed_watchdog {
            board.watchdog.feed();
        }
        Ok(())
    }

    fn emit_transition(&self, from: StateId, to: StateId, sink: &mut impl EventSink) {
        if from != to {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }

    fn emit_reading(&self, out: PipelineOutput, sink: &mut impl EventSink) {
        // Only a classified output is ever stored.
        if let Some(rating) = out.rating {
            sink.emit(&AppEvent::Reading(ReadingReport {
                domain: self.ctx.pipeline.domain(),
                sample: out.sample,
                rolling_avg: out.rolling_avg,
                ema: out.ema,
                rating,
            }));
        }
    }
}
