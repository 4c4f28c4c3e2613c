//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the state machine, the safety monitor, the display
//! presenter and the burst history.  All I/O flows through port traits
//! injected at call sites, so the whole control loop runs against mock
//! adapters in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │        AppService         │
//! ActuatorPort ◀──│  Safety · FSM · History   │ ──▶ DisplayPort
//!                 └──────────────────────────┘
//! ```

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::config::IrrigationConfig;
use crate::fsm::context::{HoldReason, PumpCommand};
use crate::fsm::{IrrigationStateMachine, StateId};
use crate::history::{CycleStatistics, IrrigationHistory};
use crate::safety::SafetyMonitor;

use super::events::{AppEvent, CycleReport};
use super::ports::{ActuatorPort, ClockPort, DisplayPort, EventSink, SensorPort};
use super::presenter::{DisplayPresenter, View};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: IrrigationStateMachine,
    safety: SafetyMonitor,
    presenter: DisplayPresenter,
    history: IrrigationHistory,
    stats: CycleStatistics,
    summary_every: u32,
    cycle_count: u64,
}

impl AppService {
    /// Build the service from configuration.  Call [`start`](Self::start)
    /// before the first tick.
    pub fn new(config: IrrigationConfig) -> Self {
        let safety = SafetyMonitor::new(&config);
        let presenter = DisplayPresenter::new(&config);
        let summary_every = config.summary_interval_cycles;
        Self {
            fsm: IrrigationStateMachine::new(config),
            safety,
            presenter,
            history: IrrigationHistory::new(),
            stats: CycleStatistics::new(),
            summary_every,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the relay to its off level and announce the initial state.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Err(e) = hw.set_pump(false) {
            error!("Could not force pump off at startup: {}", e);
            sink.emit(&AppEvent::Fault(e.into()));
        }
        let state = self.fsm.current_state();
        sink.emit(&AppEvent::Started(state));
        info!("AppService started in {}", self.fsm.state_name());
    }

    /// Show the boot screens.  Display errors are logged and skipped.
    pub fn show_splash(&self, display: &mut impl DisplayPort, delay: &mut impl DelayNs) {
        for (frame, hold_ms) in self.presenter.splash() {
            if let Err(e) = display.show(&frame) {
                warn!("Display: splash failed: {}", e);
            }
            delay.delay_ms(hold_ms);
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle: sense → safety → FSM → relay → record.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`ActuatorPort`] so the
    /// hardware adapter is borrowed mutably once.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.cycle_count += 1;

        // 1. Sense, then stamp the cycle.
        let readings = hw.read_all();
        let now = clock.now();

        // 2. Safety before the state machine.
        let too_high = self.safety.evaluate(readings.temperature_c);

        // 3. Decide.
        let outcome = self.fsm.step(readings.moisture_percent, too_high, now);

        // 4. Drive the relay.  A relay that disagrees with the decision
        //    state is rewritten even without a command.
        let desired = outcome.snapshot.pump_active;
        if outcome.command != PumpCommand::NoChange || hw.pump_is_on() != desired {
            if let Err(e) = hw.set_pump(desired) {
                error!("Pump relay write failed (want {}): {}", on_off(desired), e);
                sink.emit(&AppEvent::Fault(e.into()));
            }
        }

        let report = CycleReport {
            cycle: self.cycle_count,
            now,
            readings,
            previous_state: outcome.previous,
            state: outcome.state_id,
            branch: outcome.branch,
            command: outcome.command,
            hold: outcome.hold,
            stop_reason: outcome.stop_reason,
            verdict: outcome.verdict,
            snapshot: outcome.snapshot,
        };

        // 5. History and events.
        if report.state != report.previous_state {
            sink.emit(&AppEvent::StateChanged {
                from: report.previous_state,
                to: report.state,
            });
        }
        self.record_bursts(&report, sink);
        if let Some(hold @ (HoldReason::WaitingForInterval { .. } | HoldReason::BlockedByTemperature)) =
            report.hold
        {
            sink.emit(&AppEvent::Holding(hold));
        }
        sink.emit(&AppEvent::Cycle(report));

        // 6. Rolling statistics.
        self.stats.record(
            readings.moisture_percent,
            readings.temperature_c,
            report.command == PumpCommand::TurnOn,
        );
        if self.summary_every > 0 && self.stats.cycles_in_window() >= self.summary_every {
            if let Some(mut summary) = self.stats.take_window() {
                summary.average_gain = self.history.average_gain();
                sink.emit(&AppEvent::Summary(summary));
            }
        }

        report
    }

    /// Walk the display views for `report`, holding each for its time.
    /// Frames are rendered at display time so countdowns stay current.
    pub fn present(
        &self,
        display: &mut impl DisplayPort,
        delay: &mut impl DelayNs,
        clock: &impl ClockPort,
        report: &CycleReport,
    ) {
        for &view in self.presenter.sequence(report) {
            let frame = self
                .presenter
                .render(view, report, self.fsm.config(), clock.now());
            if let Err(e) = display.show(&frame) {
                warn!("Display: {:?} view failed: {}", view, e);
            }
            let hold = self.presenter.hold_ms(view);
            if hold > 0 {
                delay.delay_ms(hold);
            }
        }
    }

    /// Show only the status view.  Used while a burst runs, when the
    /// loop cannot afford the full view sequence.
    pub fn present_status(
        &self,
        display: &mut impl DisplayPort,
        clock: &impl ClockPort,
        report: &CycleReport,
    ) {
        let frame = self
            .presenter
            .render(View::Status, report, self.fsm.config(), clock.now());
        if let Err(e) = display.show(&frame) {
            warn!("Display: status view failed: {}", e);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Time left before the running burst hits its limit.  `None` unless
    /// the pump is on.
    pub fn burst_remaining(&self, now: Instant) -> Option<Duration> {
        if self.fsm.current_state() != StateId::Active {
            return None;
        }
        let start = self.fsm.snapshot().irrigation_start?;
        let ran = now.saturating_duration_since(start);
        Some(
            self.fsm
                .config()
                .max_irrigation()
                .checked_sub(ran)
                .unwrap_or(Duration::from_ticks(0)),
        )
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn history(&self) -> &IrrigationHistory {
        &self.history
    }

    pub fn statistics(&self) -> &CycleStatistics {
        &self.stats
    }

    pub fn config(&self) -> &IrrigationConfig {
        self.fsm.config()
    }

    // ── Internal ──────────────────────────────────────────────

    fn record_bursts(&mut self, report: &CycleReport, sink: &mut impl EventSink) {
        let moisture = report.readings.moisture_percent;

        match report.command {
            PumpCommand::TurnOn => {
                self.history.burst_started(report.now, moisture);
                sink.emit(&AppEvent::PumpStarted { moisture });
            }
            PumpCommand::TurnOff => {
                if let Some(reason) = report.stop_reason {
                    self.history.burst_stopped(report.now, moisture, reason);
                    let ran = self.history.latest().map_or_else(
                        || Duration::from_ticks(0),
                        |r| r.duration,
                    );
                    sink.emit(&AppEvent::PumpStopped {
                        reason,
                        moisture,
                        ran,
                    });
                }
            }
            PumpCommand::NoChange => {}
        }

        if let Some(verdict) = report.verdict {
            self.history.analysis_completed(moisture);
            sink.emit(&AppEvent::AnalysisCompleted { verdict, moisture });
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
