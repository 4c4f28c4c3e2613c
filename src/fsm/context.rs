//! Irrigation state and the per-cycle context threaded through every
//! FSM handler.
//!
//! `IrrigationState` is the single value-object the whole controller
//! decides on.  `FsmContext` wraps it together with the current cycle's
//! inputs and the outputs a handler may write (pump command, hold reason,
//! stop reason).  Handlers never touch hardware; the application service
//! applies the command after `step` returns.

use embassy_time::{Duration, Instant};

use crate::config::IrrigationConfig;

// ---------------------------------------------------------------------------
// Irrigation state (owned by the state machine, snapshotted for presentation)
// ---------------------------------------------------------------------------

/// Decision state of the controller.
///
/// Invariants after every step:
/// - `pump_active` and `analyzing` are never both true.
/// - `pump_active` is never true while `temperature_too_high` is true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrrigationState {
    /// Hysteretic desire flag.
    pub wants_water: bool,
    /// Relay commanded state.
    pub pump_active: bool,
    /// Post-irrigation absorption wait in progress.
    pub analyzing: bool,
    /// Safety override, recomputed every cycle.
    pub temperature_too_high: bool,
    /// When the pump last turned off; `None` until the first burst ends.
    pub last_irrigation_end: Option<Instant>,
    /// When the current (or most recent) burst started.
    pub irrigation_start: Option<Instant>,
    /// When the current (or most recent) analysis phase started.
    pub analysis_start: Option<Instant>,
}

impl IrrigationState {
    /// Apply the dead-band hysteresis to `wants_water`.
    pub fn update_desire(&mut self, moisture: u8, config: &IrrigationConfig) {
        if moisture <= config.dry_threshold_percent {
            self.wants_water = true;
        } else if moisture >= config.satisfied_threshold_percent {
            self.wants_water = false;
        }
    }

    /// Time left before another burst may start, or `None` if allowed now.
    pub fn interval_remaining(&self, now: Instant, min_interval: Duration) -> Option<Duration> {
        let end = self.last_irrigation_end?;
        let elapsed = now.saturating_duration_since(end);
        if elapsed >= min_interval {
            None
        } else {
            Some(min_interval - elapsed)
        }
    }
}

// ---------------------------------------------------------------------------
// Step outputs
// ---------------------------------------------------------------------------

/// Command for the pump relay produced by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpCommand {
    TurnOn,
    TurnOff,
    #[default]
    NoChange,
}

/// Why the idle or analysis branch held without commanding the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// Absorption analysis still running.
    Absorbing { remaining: Duration },
    /// Plant is dry but the previous burst ended too recently.
    WaitingForInterval { remaining: Duration },
    /// Plant wants water but the temperature is too high.
    BlockedByTemperature,
    /// Burst in progress, none of its stop conditions hold yet.
    Dripping,
    /// Nothing to do.
    NoNeed,
}

/// Why an active burst ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Moisture reached the satisfied threshold.
    Satisfied,
    /// Desire flag cleared while the pump ran.
    DesireCleared,
    /// Maximum burst duration elapsed.
    DripComplete,
    /// Safety cutoff.
    OverTemperature,
}

impl core::fmt::Display for StopReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Satisfied => write!(f, "plant satisfied"),
            Self::DesireCleared => write!(f, "desire cleared"),
            Self::DripComplete => write!(f, "drip complete"),
            Self::OverTemperature => write!(f, "temperature too high"),
        }
    }
}

/// Result of the confirmation re-read at the end of an analysis phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisVerdict {
    /// Moisture still at or below the dry threshold.
    StillDry,
    /// The burst was enough.
    Satisfied,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Cycle inputs --
    /// Moisture reading for this cycle (0–100).
    pub moisture: u8,
    /// Monotonic timestamp of this cycle.
    pub now: Instant,

    // -- State --
    pub state: IrrigationState,

    // -- Outputs (reset at the start of each step) --
    pub command: PumpCommand,
    pub hold: Option<HoldReason>,
    pub stop_reason: Option<StopReason>,
    pub verdict: Option<AnalysisVerdict>,

    // -- Configuration --
    pub config: IrrigationConfig,
}

impl FsmContext {
    /// Create a new context with all flags false and no timestamps.
    pub fn new(config: IrrigationConfig) -> Self {
        Self {
            moisture: 0,
            now: Instant::from_ticks(0),
            state: IrrigationState::default(),
            command: PumpCommand::NoChange,
            hold: None,
            stop_reason: None,
            verdict: None,
            config,
        }
    }

    /// Clear per-step outputs and latch the new inputs.
    pub fn begin_cycle(&mut self, moisture: u8, temperature_too_high: bool, now: Instant) {
        self.moisture = moisture.min(100);
        self.now = now;
        self.state.temperature_too_high = temperature_too_high;
        self.command = PumpCommand::NoChange;
        self.hold = None;
        self.stop_reason = None;
        self.verdict = None;
    }

    /// Time since `since`, zero if `since` is unset.
    pub fn elapsed_since(&self, since: Option<Instant>) -> Duration {
        since.map_or(Duration::from_ticks(0), |t| {
            self.now.saturating_duration_since(t)
        })
    }
}
