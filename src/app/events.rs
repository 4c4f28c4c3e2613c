//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; today that is the serial log.

use embassy_time::{Duration, Instant};

use crate::error::Error;
use crate::fsm::context::{AnalysisVerdict, HoldReason, IrrigationState, PumpCommand, StopReason};
use crate::fsm::{Branch, StateId};
use crate::history::WindowSummary;
use crate::sensors::SensorReadings;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A drip burst began.
    PumpStarted { moisture: u8 },

    /// A drip burst ended.
    PumpStopped {
        reason: StopReason,
        moisture: u8,
        ran: Duration,
    },

    /// The absorption wait finished and the soil was re-checked.
    AnalysisCompleted {
        verdict: AnalysisVerdict,
        moisture: u8,
    },

    /// The plant wants water but a guard is holding the pump off.
    Holding(HoldReason),

    /// A peripheral failed in a way the loop rides through.
    Fault(Error),

    /// End-of-cycle report, one per control cycle.
    Cycle(CycleReport),

    /// Rolling statistics for the last summary window.
    Summary(WindowSummary),
}

/// Coarse status used by the diagnostic log line, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    TemperatureHigh,
    Irrigating,
    Analyzing,
    Waiting,
}

impl StatusLabel {
    pub fn from_state(state: &IrrigationState) -> Self {
        if state.temperature_too_high {
            Self::TemperatureHigh
        } else if state.pump_active {
            Self::Irrigating
        } else if state.analyzing {
            Self::Analyzing
        } else {
            Self::Waiting
        }
    }

    /// Token understood by the host-side dashboard parser.
    pub fn as_log_str(self) -> &'static str {
        match self {
            Self::TemperatureHigh => "TEMP ALTA - NO RIEGO",
            Self::Irrigating => "RIEGO ACTIVO",
            Self::Analyzing => "ANALIZANDO",
            Self::Waiting => "ESPERANDO",
        }
    }
}

/// Immutable per-cycle snapshot handed to the presenter and the log sink.
/// Neither feeds anything back into the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub now: Instant,
    pub readings: SensorReadings,
    pub previous_state: StateId,
    pub state: StateId,
    pub branch: Branch,
    pub command: PumpCommand,
    pub hold: Option<HoldReason>,
    pub stop_reason: Option<StopReason>,
    pub verdict: Option<AnalysisVerdict>,
    pub snapshot: IrrigationState,
}

impl CycleReport {
    pub fn status(&self) -> StatusLabel {
        StatusLabel::from_state(&self.snapshot)
    }
}
