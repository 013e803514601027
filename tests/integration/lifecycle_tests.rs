//! Integration tests for the MonitorService → FSM → outputs lifecycle.
//!
//! These run on the host and drive whole cycles through the service with
//! mock adapters, checking the fault-recovery contract end to end.

use crate::mock_hw::{NACK, Op, ScriptedSource, harness};

use skyglow::app::events::AppEvent;
use skyglow::app::service::MonitorService;
use skyglow::config::MonitorConfig;
use skyglow::error::{Error, OutputError};
use skyglow::fsm::StateId;

fn service() -> MonitorService {
    MonitorService::new(MonitorConfig::default())
}

// ── Healthy cycle ordering ────────────────────────────────────

#[test]
fn healthy_cycle_runs_read_show_pulse_feed_in_order() {
    let mut h = harness(ScriptedSource::values(&[50.0]));
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    assert_eq!(h.take_journal(), vec![Op::Reinit]);

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    assert_eq!(
        h.take_journal(),
        vec![
            Op::Read,
            Op::Show(8),
            Op::Heartbeat(true),
            Op::Sleep(20),
            Op::Heartbeat(false),
            Op::Feed,
        ]
    );
    assert_eq!(svc.state(), StateId::Running);
}

#[test]
fn transient_read_failures_are_retried_within_the_cycle() {
    let source = ScriptedSource::new(vec![Err(NACK), Err(NACK), Ok(50.0)], Err(NACK));
    let mut h = harness(source);
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    h.take_journal();

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    let ops = h.take_journal();
    assert_eq!(
        &ops[..5],
        &[Op::Read, Op::Sleep(50), Op::Read, Op::Sleep(100), Op::Read]
    );
    assert_eq!(h.board.indicator.shown, vec![8]);
    assert_eq!(h.board.watchdog.feeds, 1);
    assert_eq!(svc.consecutive_failures(), 0);
    assert_eq!(svc.reinit_attempts(), 0);
}

// ── Failure path ──────────────────────────────────────────────

#[test]
fn unavailable_cycle_reinitialises_without_display_or_feed() {
    let mut h = harness(ScriptedSource::broken());
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    h.take_journal();

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    let ops = h.take_journal();

    // Five reads, backoff between them, none after the last.
    let reads = ops.iter().filter(|o| **o == Op::Read).count();
    assert_eq!(reads, 5);
    let backoff: Vec<u32> = ops
        .iter()
        .take_while(|o| **o != Op::Reinit)
        .filter_map(|o| match o {
            Op::Sleep(ms) => Some(*ms),
            _ => None,
        })
        .collect();
    assert_eq!(backoff, vec![50, 100, 150, 200]);

    assert!(ops.contains(&Op::Reinit));
    assert_eq!(ops.last(), Some(&Op::Sleep(500)), "settle delay ends the cycle");
    assert!(!ops.iter().any(|o| matches!(o, Op::Show(_) | Op::Feed)));

    assert_eq!(svc.state(), StateId::Running);
    assert_eq!(svc.consecutive_failures(), 1);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::ReadUnavailable { .. })),
        1
    );
}

#[test]
fn recovery_resets_failure_count() {
    let source = ScriptedSource::new(
        vec![Err(NACK), Err(NACK), Err(NACK), Err(NACK), Err(NACK), Ok(0.005)],
        Err(NACK),
    );
    let mut h = harness(source);
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    assert_eq!(svc.consecutive_failures(), 1);

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    assert_eq!(svc.consecutive_failures(), 0);
    assert_eq!(h.board.indicator.shown, vec![1]);
}

#[test]
fn budget_exhaustion_enters_safe_mode_showing_nine() {
    let cfg = MonitorConfig::default();
    let budget = cfg.max_init_failures;
    let mut h = harness(ScriptedSource::broken());
    let mut svc = MonitorService::new(cfg);
    svc.start(&mut h.board, &mut h.sink);

    for n in 1..budget {
        svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
        assert_eq!(svc.state(), StateId::Running, "cycle {n}");
    }
    assert!(h.board.indicator.shown.is_empty());
    assert_eq!(h.board.watchdog.feeds, 0);

    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    assert_eq!(svc.state(), StateId::SafeMode);
    assert_eq!(svc.consecutive_failures(), budget);
    assert_eq!(svc.reinit_attempts(), budget - 1);
    assert_eq!(h.board.indicator.shown, vec![9]);
    assert_eq!(h.board.watchdog.feeds, 1);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::SafeModeEntered { .. })),
        1
    );
}

#[test]
fn safe_mode_never_reads_or_reinitialises_again() {
    let mut h = harness(ScriptedSource::broken());
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    while svc.state() != StateId::SafeMode {
        svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    }
    let reads = h.board.source.reads;
    let reinits = h.board.source.reinits;
    h.take_journal();

    // The sensor would answer now; it must be ignored.
    h.board.source.fallback = Ok(0.005);
    for _ in 0..3 {
        svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    }

    assert_eq!(svc.state(), StateId::SafeMode);
    assert_eq!(h.board.source.reads, reads);
    assert_eq!(h.board.source.reinits, reinits);
    assert_eq!(&h.board.indicator.shown[1..], &[9, 9, 9]);
    assert_eq!(h.board.watchdog.feeds, 4);

    let ops = h.take_journal();
    assert_eq!(
        &ops[..5],
        &[
            Op::Show(9),
            Op::Heartbeat(true),
            Op::Sleep(20),
            Op::Heartbeat(false),
            Op::Feed
        ]
    );
}

#[test]
fn absent_sensor_is_never_read() {
    let mut h = harness(ScriptedSource::absent());
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    assert!(matches!(
        h.sink.events.first(),
        Some(AppEvent::Started { sensor_ready: false, .. })
    ));

    while svc.state() != StateId::SafeMode {
        svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    }
    assert_eq!(h.board.source.reads, 0);
    assert_eq!(svc.cycle_count(), u64::from(svc.config().max_init_failures));
}

#[test]
fn output_failure_escapes_as_top_level_fault() {
    let mut h = harness(ScriptedSource::values(&[50.0]));
    h.board.indicator.fail = true;
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);

    let err = svc.run_cycle(&mut h.board, &mut h.sink).unwrap_err();
    assert_eq!(err, Error::Output(OutputError::Pixels));
    assert_eq!(h.board.watchdog.feeds, 0, "no feed after a failed cycle");
}

#[test]
fn reading_report_carries_pipeline_values() {
    let mut h = harness(ScriptedSource::values(&[0.005, 0.005]));
    let mut svc = service();
    svc.start(&mut h.board, &mut h.sink);
    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
    svc.run_cycle(&mut h.board, &mut h.sink).unwrap();

    let reports: Vec<_> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Reading(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 2);
    assert!((reports[1].ema - 0.005).abs() < 1e-7);
    assert!((reports[1].rolling_avg - 0.005).abs() < 1e-7);
    assert_eq!(reports[1].rating.value(), 1);
}
