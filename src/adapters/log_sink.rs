//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (UART / USB-CDC through `esp_idf_logger` in production).  The
//! per-cycle line keeps a fixed field layout so the host-side dashboard
//! can parse it.

use core::fmt;

use log::{debug, info, warn};

use crate::app::events::{AppEvent, CycleReport};
use crate::app::ports::EventSink;
use crate::fsm::context::{AnalysisVerdict, HoldReason};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(report) => {
                info!("{}", CycleLine(report));
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PumpStarted { moisture } => {
                info!("PUMP | on, moisture={}%", moisture);
            }
            AppEvent::PumpStopped {
                reason,
                moisture,
                ran,
            } => {
                info!(
                    "PUMP | off after {} ms, reason={}, moisture={}%",
                    ran.as_millis(),
                    reason,
                    moisture
                );
            }
            AppEvent::AnalysisCompleted { verdict, moisture } => {
                let outcome = match verdict {
                    AnalysisVerdict::StillDry => "still dry",
                    AnalysisVerdict::Satisfied => "satisfied",
                };
                info!("ANALYSIS | done, moisture={}%, {}", moisture, outcome);
            }
            AppEvent::Holding(HoldReason::WaitingForInterval { remaining }) => {
                debug!("HOLD | interval, {} ms left", remaining.as_millis());
            }
            AppEvent::Holding(HoldReason::BlockedByTemperature) => {
                warn!("HOLD | plant needs water, temperature too high");
            }
            AppEvent::Holding(other) => {
                debug!("HOLD | {:?}", other);
            }
            AppEvent::Fault(e) => {
                warn!("FAULT | {}", e);
            }
            AppEvent::Summary(s) => {
                info!(
                    "STATS | {} cycles | moisture min={}% max={}% avg={:.1}% | \
                     temp avg={} | bursts={} (total {}) | gain={}",
                    s.cycles,
                    s.moisture_min,
                    s.moisture_max,
                    s.moisture_avg,
                    AvgTemp(s.temperature_avg),
                    s.activations,
                    s.total_activations,
                    Gain(s.average_gain),
                );
            }
        }
    }
}

struct AvgTemp(Option<f32>);

impl fmt::Display for AvgTemp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{t:.1}C"),
            None => f.write_str("--C"),
        }
    }
}

struct Gain(Option<f32>);

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(g) => write!(f, "{g:+.1}%"),
            None => f.write_str("--"),
        }
    }
}

/// The per-cycle diagnostic line.
pub struct CycleLine<'a>(pub &'a CycleReport);

impl fmt::Display for CycleLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(
            f,
            "Raw sensor: {} -> Humedad: {}% | Temp: ",
            r.readings.raw_moisture, r.readings.moisture_percent,
        )?;
        match r.readings.temperature_c.filter(|t| !t.is_nan()) {
            Some(t) => write!(f, "{t:.2}C")?,
            None => f.write_str("nanC")?,
        }
        write!(
            f,
            " | Estado: {} | Planta necesita agua: {}",
            r.status().as_log_str(),
            if r.snapshot.wants_water { "SI" } else { "NO" },
        )
    }
}
