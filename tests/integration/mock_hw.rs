//! Mock adapters for integration tests.
//!
//! Every port trait gets a recording or scripted implementation so tests
//! can drive readings and time by hand and assert on the full relay and
//! display history without touching real GPIO or I²C.

use std::cell::Cell;
use std::rc::Rc;

use embassy_time::Instant;
use embedded_hal::delay::DelayNs;

use irrigator::app::events::AppEvent;
use irrigator::app::ports::{ActuatorPort, ClockPort, DisplayPort, EventSink, SensorPort};
use irrigator::app::presenter::Frame;
use irrigator::error::{ActuatorError, DisplayError};
use irrigator::sensors::SensorReadings;

// ── MockHardware ──────────────────────────────────────────────

/// Sensor source plus relay.  Readings stay at whatever the test last set.
pub struct MockHardware {
    pub moisture: u8,
    pub temperature: Option<f32>,
    /// Every level written to the relay, in order.
    pub relay_writes: Vec<bool>,
    pub relay_on: bool,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(moisture: u8, temperature: Option<f32>) -> Self {
        Self {
            moisture,
            temperature,
            relay_writes: Vec::new(),
            relay_on: false,
            fail_writes: false,
        }
    }

    pub fn set(&mut self, moisture: u8, temperature: Option<f32>) {
        self.moisture = moisture;
        self.temperature = temperature;
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorReadings {
        SensorReadings {
            raw_moisture: 1023u16.saturating_sub(u16::from(self.moisture) * 7),
            moisture_percent: self.moisture,
            temperature_c: self.temperature,
        }
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::GpioWriteFailed(-1));
        }
        self.relay_writes.push(on);
        self.relay_on = on;
        Ok(())
    }

    fn pump_is_on(&self) -> bool {
        self.relay_on
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Shared millisecond counter.  Clones see the same time, so a
/// [`RecordingDelay`] can advance the clock the service reads.
#[derive(Clone, Default)]
pub struct ManualClock {
    ms: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u64) -> Self {
        let c = Self::default();
        c.set(ms);
        c
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.ms.set(self.ms.get() + ms);
    }

    pub fn millis(&self) -> u64 {
        self.ms.get()
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.ms.get())
    }
}

// ── RecordingDelay ────────────────────────────────────────────

/// Records every sleep and moves the shared clock forward by it.
pub struct RecordingDelay {
    pub clock: ManualClock,
    pub sleeps_ms: Vec<u32>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            sleeps_ms: Vec::new(),
        }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns) / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        self.clock.advance(u64::from(ms));
    }
}

// ── RecordingDisplay ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Frame>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn texts(&self) -> Vec<(String, String)> {
        self.frames
            .iter()
            .map(|f| (f.top.to_string(), f.bottom.to_string()))
            .collect()
    }
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Bus);
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
