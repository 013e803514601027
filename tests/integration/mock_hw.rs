//! Mock board for integration tests.
//!
//! Every mock appends to one shared [`Journal`] so tests can assert on the
//! exact order of reads, display writes, heartbeat pulses, feeds and
//! sleeps across a cycle.  Delays advance a shared fake clock instead of
//! sleeping.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use skyglow::app::events::AppEvent;
use skyglow::app::ports::{
    Board, BrightnessSource, Clock, EventSink, HeartbeatPort, IndicatorPort, LivenessPort,
};
use skyglow::drivers::traffic_light::TrafficLight;
use skyglow::error::{BusError, OutputError, SensorError};
use skyglow::processing::bortle::BortleRating;

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Read,
    Reinit,
    Show(u8),
    Heartbeat(bool),
    Feed,
    Sleep(u32),
}

pub type Journal = Rc<RefCell<Vec<Op>>>;

// ── Brightness source ─────────────────────────────────────────

/// Returns scripted results one read at a time, then `fallback` forever.
pub struct ScriptedSource {
    script: VecDeque<Result<f32, SensorError>>,
    pub fallback: Result<f32, SensorError>,
    pub reinit_ok: bool,
    ready: bool,
    pub reads: u32,
    pub reinits: u32,
    journal: Journal,
}

pub const NACK: SensorError = SensorError::Bus(BusError::Nack);

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(script: Vec<Result<f32, SensorError>>, fallback: Result<f32, SensorError>) -> Self {
        Self {
            script: script.into(),
            fallback,
            reinit_ok: true,
            ready: false,
            reads: 0,
            reinits: 0,
            journal: Journal::default(),
        }
    }

    /// Each value succeeds on the first attempt of its cycle; afterwards
    /// every read fails.
    pub fn values(values: &[f32]) -> Self {
        Self::new(values.iter().map(|v| Ok(*v)).collect(), Err(NACK))
    }

    /// Every read fails.
    pub fn broken() -> Self {
        Self::new(Vec::new(), Err(NACK))
    }

    /// Initialisation never succeeds, so the sensor is never ready.
    pub fn absent() -> Self {
        Self {
            reinit_ok: false,
            ..Self::broken()
        }
    }
}

impl BrightnessSource for ScriptedSource {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn read_sample(&mut self, _delay: &mut impl DelayNs) -> Result<f32, SensorError> {
        self.reads += 1;
        self.journal.borrow_mut().push(Op::Read);
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn reinit(&mut self, _delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.reinits += 1;
        self.journal.borrow_mut().push(Op::Reinit);
        self.ready = self.reinit_ok;
        if self.reinit_ok { Ok(()) } else { Err(NACK) }
    }
}

// ── Outputs ───────────────────────────────────────────────────

pub struct RecordingIndicator {
    pub shown: Vec<u8>,
    pub fail: bool,
    journal: Journal,
}

impl IndicatorPort for RecordingIndicator {
    fn show_rating(&mut self, rating: BortleRating) -> Result<(), OutputError> {
        if self.fail {
            return Err(OutputError::Pixels);
        }
        self.shown.push(rating.value());
        self.journal.borrow_mut().push(Op::Show(rating.value()));
        Ok(())
    }
}

pub struct RecordingHeartbeat {
    pub levels: Vec<bool>,
    journal: Journal,
}

impl HeartbeatPort for RecordingHeartbeat {
    fn set_heartbeat(&mut self, on: bool) -> Result<(), OutputError> {
        self.levels.push(on);
        self.journal.borrow_mut().push(Op::Heartbeat(on));
        Ok(())
    }
}

pub struct CountingWatchdog {
    pub feeds: u32,
    journal: Journal,
}

impl LivenessPort for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
        self.journal.borrow_mut().push(Op::Feed);
    }
}

/// GPIO whose level is visible through a shared cell.
#[derive(Clone, Default)]
pub struct MockPin(pub Rc<Cell<bool>>);

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// Levels of the three traffic-light lamps.
#[derive(Clone, Default)]
pub struct Lamps {
    pub green: MockPin,
    pub yellow: MockPin,
    pub red: MockPin,
}

impl Lamps {
    /// `(green, yellow, red)`
    pub fn levels(&self) -> (bool, bool, bool) {
        (self.green.0.get(), self.yellow.0.get(), self.red.0.get())
    }
}

// ── Time ──────────────────────────────────────────────────────

pub struct FakeClock(Rc<Cell<u64>>);

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Advances the fake clock instead of sleeping.
pub struct FakeDelay {
    now: Rc<Cell<u64>>,
    journal: Journal,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + u64::from(ms));
        self.journal.borrow_mut().push(Op::Sleep(ms));
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type MockBoard<I> =
    Board<ScriptedSource, I, RecordingHeartbeat, CountingWatchdog, FakeClock, FakeDelay>;

pub struct Harness<I> {
    pub board: MockBoard<I>,
    pub sink: CollectingSink,
    pub journal: Journal,
    pub now: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl<I> Harness<I> {
    /// Journal entries recorded so far, then clear it.
    pub fn take_journal(&self) -> Vec<Op> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }
}

fn assemble<I>(mut source: ScriptedSource, indicator: impl FnOnce(Journal) -> I) -> Harness<I> {
    let journal = Journal::default();
    let now = Rc::new(Cell::new(0));
    source.journal = journal.clone();
    Harness {
        board: Board {
            source,
            indicator: indicator(journal.clone()),
            heartbeat: RecordingHeartbeat {
                levels: Vec::new(),
                journal: journal.clone(),
            },
            watchdog: CountingWatchdog {
                feeds: 0,
                journal: journal.clone(),
            },
            clock: FakeClock(now.clone()),
            delay: FakeDelay {
                now: now.clone(),
                journal: journal.clone(),
            },
        },
        sink: CollectingSink::default(),
        journal,
        now,
    }
}

/// Board with a recording indicator.
pub fn harness(source: ScriptedSource) -> Harness<RecordingIndicator> {
    assemble(source, |journal| RecordingIndicator {
        shown: Vec::new(),
        fail: false,
        journal,
    })
}

/// Board with the real three-LED driver on mock pins.
#[allow(dead_code)]
pub fn traffic_harness(
    source: ScriptedSource,
) -> (Harness<TrafficLight<MockPin, MockPin, MockPin>>, Lamps) {
    let lamps = Lamps::default();
    let l = lamps.clone();
    let h = assemble(source, move |_| TrafficLight::new(l.green, l.yellow, l.red));
    (h, lamps)
}
