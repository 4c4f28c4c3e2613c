//! Display presenter: turns a [`CycleReport`] into 16x2 text frames.
//!
//! Pure formatting, no I/O.  The service pushes the frames through the
//! [`DisplayPort`](super::ports::DisplayPort) and sleeps for each view's
//! hold time.
//!
//! ```text
//!  too hot:  [ Alarm 8s ]
//!  normal:   [ Mood 3s ] -> [ Sensors 5s ] -> [ Status (until next cycle) ]
//! ```

use core::fmt::Write;

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::config::IrrigationConfig;
use crate::drivers::lcd::COLS;

use super::events::CycleReport;

/// One display row.
pub type Line = String<COLS>;

/// A full screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub top: Line,
    pub bottom: Line,
}

impl Frame {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: fit(top),
            bottom: fit(bottom),
        }
    }
}

/// Which screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Alarm,
    Mood,
    Sensors,
    Status,
}

const ALARM_SEQUENCE: &[View] = &[View::Alarm];
const NORMAL_SEQUENCE: &[View] = &[View::Mood, View::Sensors, View::Status];

pub struct DisplayPresenter {
    mood_ms: u32,
    sensor_ms: u32,
    alarm_ms: u32,
    splash_ms: u32,
}

impl DisplayPresenter {
    pub fn new(config: &IrrigationConfig) -> Self {
        Self {
            mood_ms: config.mood_view_ms,
            sensor_ms: config.sensor_view_ms,
            alarm_ms: config.alarm_view_ms,
            splash_ms: config.splash_view_ms,
        }
    }

    /// Boot screens with their hold times.
    pub fn splash(&self) -> [(Frame, u32); 2] {
        [
            (Frame::new("Irrigation sys", "Starting..."), self.splash_ms),
            (Frame::new("Pump: OFF", "System ready"), self.splash_ms),
        ]
    }

    /// Views for this cycle, in display order.
    pub fn sequence(&self, report: &CycleReport) -> &'static [View] {
        if report.snapshot.temperature_too_high {
            ALARM_SEQUENCE
        } else {
            NORMAL_SEQUENCE
        }
    }

    /// How long the service holds a view.  The status view stays up for
    /// the inter-cycle sleep, which the main loop owns.
    pub fn hold_ms(&self, view: View) -> u32 {
        match view {
            View::Alarm => self.alarm_ms,
            View::Mood => self.mood_ms,
            View::Sensors => self.sensor_ms,
            View::Status => 0,
        }
    }

    /// Render `view`.  `now` is the time the frame is drawn, which for the
    /// status view is several seconds after the cycle's own timestamp.
    pub fn render(&self, view: View, report: &CycleReport, config: &IrrigationConfig, now: Instant) -> Frame {
        match view {
            View::Alarm => alarm_view(report.readings.temperature_c),
            View::Mood => mood_view(report.readings.moisture_percent, report.snapshot.analyzing),
            View::Sensors => sensor_view(
                report.readings.temperature_c,
                report.readings.moisture_percent,
                report.snapshot.analyzing,
            ),
            View::Status => status_view(report, config, now),
        }
    }
}

// ── Views ─────────────────────────────────────────────────────

pub fn alarm_view(temperature_c: Option<f32>) -> Frame {
    let bottom = match temperature_c {
        Some(t) => line(format_args!("No water: {t:.1}C")),
        None => fit("No water: --C"),
    };
    Frame {
        top: fit("TEMP TOO HIGH!"),
        bottom,
    }
}

pub fn mood_view(moisture: u8, analyzing: bool) -> Frame {
    if analyzing {
        return Frame::new("Water soaking in", "Wait for check");
    }
    Frame::new("Your plant says:", mood_text(moisture))
}

/// Mood line banded by moisture.
pub fn mood_text(moisture: u8) -> &'static str {
    match moisture {
        81.. => "I'm drowning :O",
        76..=80 => "Too wet :|",
        41..=75 => "I'm happy :)",
        31..=40 => "I'm thirsty :/",
        16..=30 => "Water, quick :(",
        _ => "I'm dying D:",
    }
}

pub fn sensor_view(temperature_c: Option<f32>, moisture: u8, analyzing: bool) -> Frame {
    let top = match temperature_c {
        Some(t) => line(format_args!("Temp: {t:.1}C")),
        None => fit("Temp: Error"),
    };
    let bottom = if analyzing {
        fit("Stabilizing...")
    } else {
        line(format_args!("Moisture: {moisture}%"))
    };
    Frame { top, bottom }
}

pub fn status_view(report: &CycleReport, config: &IrrigationConfig, now: Instant) -> Frame {
    let s = &report.snapshot;

    if s.pump_active {
        let ran = since(now, s.irrigation_start);
        return Frame {
            top: fit("Pump: ON"),
            bottom: line(format_args!("Dripping {}s", ran.as_secs())),
        };
    }

    let bottom = if s.analyzing {
        let elapsed = since(now, s.analysis_start);
        let window = config.analysis_duration();
        if elapsed < window {
            line(format_args!("Waiting {}s", countdown_secs(window - elapsed)))
        } else {
            fit("Finishing...")
        }
    } else if s.wants_water && !s.temperature_too_high {
        match s.interval_remaining(now, config.min_inter_cycle()) {
            Some(remaining) => line(format_args!("Wait {}s", countdown_secs(remaining))),
            None => fit("Preparing water"),
        }
    } else if s.temperature_too_high {
        fit("Temp too high")
    } else {
        fit("No need")
    };

    Frame {
        top: fit("Pump: OFF"),
        bottom,
    }
}

/// Whole seconds left, rounded up by one so the display never shows 0
/// while the wait is still running.
pub fn countdown_secs(remaining: Duration) -> u64 {
    remaining.as_secs() + 1
}

// ── Helpers ──────────────────────────────────────────────────

fn since(now: Instant, start: Option<Instant>) -> Duration {
    start.map_or(Duration::from_ticks(0), |t| now.saturating_duration_since(t))
}

/// Copy as much of `text` as fits on one row.
fn fit(text: &str) -> Line {
    let mut out = Line::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn line(args: core::fmt::Arguments<'_>) -> Line {
    let mut buf: String<32> = String::new();
    // Overflow only truncates.
    let _ = buf.write_fmt(args);
    fit(&buf)
}
