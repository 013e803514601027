//! End-to-end scenarios on the real three-LED driver, plus cycle cadence.

use crate::mock_hw::{Harness, NACK, Op, ScriptedSource, harness, traffic_harness};

use skyglow::app::events::AppEvent;
use skyglow::app::ports::IndicatorPort;
use skyglow::app::service::MonitorService;
use skyglow::config::{MonitorConfig, SmoothedInput};
use skyglow::fsm::StateId;

fn run_cycles<I: IndicatorPort>(svc: &mut MonitorService, n: usize, h: &mut Harness<I>) {
    for _ in 0..n {
        svc.run_cycle(&mut h.board, &mut h.sink).unwrap();
        svc.wait_for_next_cycle(&mut h.board, &mut h.sink);
    }
}

// ── Lamp scenarios ────────────────────────────────────────────

#[test]
fn dark_sky_lights_green_only() {
    let (mut h, lamps) = traffic_harness(ScriptedSource::values(&[0.005; 5]));
    let mut svc = MonitorService::new(MonitorConfig {
        smoothed_input: SmoothedInput::RollingAverage,
        ..MonitorConfig::lux()
    });
    svc.start(&mut h.board, &mut h.sink);
    run_cycles(&mut svc, 5, &mut h);

    let out = svc.last_output().unwrap();
    assert!((out.rolling_avg - 0.005).abs() < 1e-7);
    assert_eq!(out.rating.map(|r| r.value()), Some(1));
    assert_eq!(lamps.levels(), (true, false, false));
}

#[test]
fn city_sky_lights_red_only() {
    let (mut h, lamps) = traffic_harness(ScriptedSource::values(&[50.0; 3]));
    let mut svc = MonitorService::new(MonitorConfig::lux());
    svc.start(&mut h.board, &mut h.sink);
    run_cycles(&mut svc, 3, &mut h);

    assert_eq!(svc.last_output().and_then(|o| o.rating).map(|r| r.value()), Some(8));
    assert_eq!(lamps.levels(), (false, false, true));
}

#[test]
fn suburban_sky_lights_yellow_only() {
    let (mut h, lamps) = traffic_harness(ScriptedSource::values(&[2.0]));
    let mut svc = MonitorService::new(MonitorConfig::lux());
    svc.start(&mut h.board, &mut h.sink);
    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(lamps.levels(), (false, true, false));
}

#[test]
fn safe_mode_shows_red_only() {
    let (mut h, lamps) = traffic_harness(ScriptedSource::values(&[0.005]));
    let mut svc = MonitorService::new(MonitorConfig::lux());
    svc.start(&mut h.board, &mut h.sink);
    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(lamps.levels(), (true, false, false));

    while svc.state() != StateId::SafeMode {
        run_cycles(&mut svc, 1, &mut h);
    }
    assert_eq!(lamps.levels(), (false, false, true));
}

#[test]
fn sqm_domain_rates_dark_sky_low() {
    let mut h = harness(ScriptedSource::values(&[21.95, 21.95, 21.95]));
    let mut svc = MonitorService::new(MonitorConfig::sqm());
    svc.start(&mut h.board, &mut h.sink);
    run_cycles(&mut svc, 3, &mut h);
    assert_eq!(h.board.indicator.shown, vec![2, 2, 2]);
}

#[test]
fn nan_sample_counts_as_failed_cycle() {
    let mut h = harness(ScriptedSource::values(&[f32::NAN, 0.005]));
    let mut svc = MonitorService::new(MonitorConfig::lux());
    svc.start(&mut h.board, &mut h.sink);

    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(svc.consecutive_failures(), 1);
    assert!(h.board.indicator.shown.is_empty());

    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(svc.consecutive_failures(), 0);
    // The EMA was never poisoned by the NaN.
    assert_eq!(svc.last_output().map(|o| o.ema), Some(0.005));
}

#[test]
fn negative_lux_does_not_poison_later_readings() {
    let mut h = harness(ScriptedSource::new(vec![Ok(-1.0)], Ok(0.005)));
    let cfg = MonitorConfig::lux();
    let cycles = cfg.max_init_failures as usize * 2;
    let mut svc = MonitorService::new(cfg);
    svc.start(&mut h.board, &mut h.sink);

    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(svc.consecutive_failures(), 1);
    assert!(svc.last_output().is_none());

    run_cycles(&mut svc, cycles, &mut h);
    assert_eq!(svc.state(), StateId::Running);
    assert_eq!(svc.consecutive_failures(), 0);
    assert_eq!(h.board.indicator.shown, vec![1; cycles]);
    let out = svc.last_output().unwrap();
    assert!((out.ema - 0.005).abs() < 1e-7);
    assert!((out.rolling_avg - 0.005).abs() < 1e-7);
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn healthy_cycles_keep_a_fixed_period() {
    let mut h = harness(ScriptedSource::values(&[1.0; 4]));
    let mut svc = MonitorService::new(MonitorConfig::lux());
    svc.start(&mut h.board, &mut h.sink);

    run_cycles(&mut svc, 4, &mut h);
    let sleeps: Vec<u32> = h
        .take_journal()
        .into_iter()
        .filter_map(|o| match o {
            Op::Sleep(ms) if ms != 20 => Some(ms),
            _ => None,
        })
        .collect();
    // Pulse width is cycle work; the remainder of each second is slept.
    assert_eq!(sleeps, vec![980, 980, 980, 980]);
    assert_eq!(h.now.get(), 4000);
}

#[test]
fn overrun_resets_the_deadline_instead_of_bursting() {
    let cfg = MonitorConfig {
        reinit_settle_ms: 900,
        ..MonitorConfig::lux()
    };
    let mut h = harness(ScriptedSource::new(
        vec![Err(NACK), Err(NACK), Err(NACK), Err(NACK), Err(NACK), Ok(1.0)],
        Ok(1.0),
    ));
    let mut svc = MonitorService::new(cfg);
    svc.start(&mut h.board, &mut h.sink);

    // Backoff 500 ms + settle 900 ms = 1400 ms of work.
    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(h.now.get(), 1400);
    assert!(h
        .sink
        .events
        .contains(&AppEvent::BehindSchedule { late_ms: 400 }));

    // Next cycle is measured from the reset deadline.
    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(h.now.get(), 2400);
}

#[test]
fn safe_mode_switches_to_its_own_interval() {
    let cfg = MonitorConfig {
        max_init_failures: 1,
        reinit_settle_ms: 0,
        safe_mode_interval_ms: 3000,
        ..MonitorConfig::lux()
    };
    let mut h = harness(ScriptedSource::broken());
    let mut svc = MonitorService::new(cfg);
    svc.start(&mut h.board, &mut h.sink);

    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(svc.state(), StateId::SafeMode);
    let entered_at = h.now.get();

    run_cycles(&mut svc, 1, &mut h);
    assert_eq!(h.now.get() - entered_at, 3000);
}
