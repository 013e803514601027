//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!              ┌──[sample ok]──┐
//!              ▼               │
//!           RUNNING ───────────┘
//!            │   ▲
//!  [no sample,   │ [always, same cycle]
//!   budget left] │
//!            ▼   │
//!        REINITIALIZING
//!
//!  RUNNING ──[no sample, budget spent]──▶ SAFE_MODE (terminal)
//! ```

use log::{error, info, warn};

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::processing::bortle::BortleRating;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Running
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: None,
            on_exit: None,
            on_update: running_update,
        },
        // Index 1: Reinitializing
        StateDescriptor {
            id: StateId::Reinitializing,
            name: "Reinitializing",
            on_enter: Some(reinit_enter),
            on_exit: None,
            on_update: reinit_update,
        },
        // Index 2: SafeMode
        StateDescriptor {
            id: StateId::SafeMode,
            name: "SafeMode",
            on_enter: Some(safe_mode_enter),
            on_exit: None,
            on_update: safe_mode_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING: read → smooth → classify → show → feed
// ═══════════════════════════════════════════════════════════════════════════

fn running_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Unratable samples are rejected before smoothing; they would poison the EMA.
    let output = ctx.sample.and_then(|x| ctx.pipeline.process(x));

    match output.and_then(|o| o.rating.map(|r| (o, r))) {
        Some((out, rating)) => {
            ctx.consecutive_failures = 0;
            ctx.last_output = Some(out);
            ctx.commands.display = Some(rating);
            ctx.commands.heartbeat = true;
            ctx.commands.feed_watchdog = true;
            None
        }
        None => {
            ctx.consecutive_failures = ctx.consecutive_failures.saturating_add(1);
            if ctx.failure_budget_spent() {
                Some(StateId::SafeMode)
            } else {
                Some(StateId::Reinitializing)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  REINITIALIZING: one recovery attempt, then back to RUNNING
// ═══════════════════════════════════════════════════════════════════════════

fn reinit_enter(ctx: &mut FsmContext) {
    ctx.commands.reinit_sensor = true;
    ctx.commands.settle_ms = ctx.config.reinit_settle_ms;
    info!(
        "REINITIALIZING: attempt {}/{}",
        ctx.consecutive_failures, ctx.config.max_init_failures
    );
}

fn reinit_update(_ctx: &mut FsmContext) -> Option<StateId> {
    // The outcome does not matter; the next read decides.
    Some(StateId::Running)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFE_MODE: terminal: show the alert rating and keep the timer fed
// ═══════════════════════════════════════════════════════════════════════════

fn safe_mode_enter(ctx: &mut FsmContext) {
    error!(
        "SAFE_MODE: {} consecutive failed cycles, sensor recovery abandoned",
        ctx.consecutive_failures
    );
    safe_mode_refresh(ctx);
}

fn safe_mode_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.sample.is_some() {
        warn!("SAFE_MODE: ignoring sample, no recovery in safe mode");
    }
    safe_mode_refresh(ctx);
    None
}

fn safe_mode_refresh(ctx: &mut FsmContext) {
    ctx.commands.reinit_sensor = false;
    ctx.commands.display = Some(BortleRating::WORST);
    ctx.commands.heartbeat = true;
    ctx.commands.feed_watchdog = true;
}
