//! End-to-end control scenarios through `AppService::tick`.
//!
//! Each test drives the service with scripted readings and a manual clock
//! and checks the pump command, the relay and the decision state.

use embassy_time::{Duration, Instant};

use irrigator::app::events::AppEvent;
use irrigator::app::service::AppService;
use irrigator::config::IrrigationConfig;
use irrigator::fsm::context::{AnalysisVerdict, HoldReason, PumpCommand, StopReason};
use irrigator::fsm::{Branch, StateId};

use crate::mock_hw::{ManualClock, MockHardware, RecordingSink};

struct Rig {
    app: AppService,
    hw: MockHardware,
    clock: ManualClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: IrrigationConfig) -> Self {
        let mut app = AppService::new(config);
        let mut hw = MockHardware::new(50, Some(25.0));
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            clock: ManualClock::at(0),
            sink,
        }
    }

    fn tick_at(&mut self, ms: u64, moisture: u8, temp: Option<f32>) -> irrigator::app::events::CycleReport {
        self.clock.set(ms);
        self.hw.set(moisture, temp);
        self.app.tick(&mut self.hw, &self.clock, &mut self.sink)
    }
}

fn at(ms: u64) -> Option<Instant> {
    Some(Instant::from_millis(ms))
}

// ── Scenario A: dry soil, cool air, never irrigated ──────────

#[test]
fn scenario_a_dry_soil_starts_pump() {
    let mut rig = Rig::new(IrrigationConfig::default());

    let r = rig.tick_at(1_000, 20, Some(25.0));

    assert_eq!(r.command, PumpCommand::TurnOn);
    assert_eq!(r.state, StateId::Active);
    assert!(r.snapshot.pump_active);
    assert!(r.snapshot.wants_water);
    assert_eq!(r.snapshot.irrigation_start, at(1_000));
    assert!(rig.hw.relay_on);
    assert!(rig.sink.contains(&AppEvent::PumpStarted { moisture: 20 }));
}

// ── Scenario B: burst limit reached ──────────────────────────

#[test]
fn scenario_b_burst_limit_stops_pump_and_starts_analysis() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));

    let r = rig.tick_at(1_500, 20, Some(25.0));

    assert_eq!(r.command, PumpCommand::TurnOff);
    assert_eq!(r.state, StateId::Analyzing);
    assert_eq!(r.stop_reason, Some(StopReason::DripComplete));
    assert!(!r.snapshot.pump_active);
    assert!(r.snapshot.analyzing);
    assert_eq!(r.snapshot.analysis_start, at(1_500));
    assert_eq!(r.snapshot.last_irrigation_end, at(1_500));
    assert!(!rig.hw.relay_on);
    assert!(rig.sink.contains(&AppEvent::PumpStopped {
        reason: StopReason::DripComplete,
        moisture: 20,
        ran: Duration::from_millis(500),
    }));
}

#[test]
fn burst_shorter_than_limit_keeps_dripping() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));

    let r = rig.tick_at(1_499, 20, Some(25.0));
    assert_eq!(r.command, PumpCommand::NoChange);
    assert_eq!(r.hold, Some(HoldReason::Dripping));
    assert!(rig.hw.relay_on);
}

// ── Scenario C: absorption window ────────────────────────────

#[test]
fn scenario_c_analysis_holds_then_resolves_satisfied() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));
    rig.tick_at(1_500, 20, Some(25.0));

    let r = rig.tick_at(1_500 + 14_999, 50, Some(25.0));
    assert_eq!(r.command, PumpCommand::NoChange);
    assert_eq!(r.branch, Branch::Analysis);
    assert!(r.snapshot.analyzing);
    assert_eq!(
        r.hold,
        Some(HoldReason::Absorbing {
            remaining: Duration::from_millis(1)
        })
    );

    let r = rig.tick_at(1_500 + 15_000, 50, Some(25.0));
    assert_eq!(r.command, PumpCommand::NoChange);
    assert_eq!(r.state, StateId::Idle);
    assert!(!r.snapshot.analyzing);
    assert!(!r.snapshot.wants_water);
    assert_eq!(r.verdict, Some(AnalysisVerdict::Satisfied));
    assert_eq!(rig.app.history().latest().and_then(|h| h.settled_moisture), Some(50));
}

#[test]
fn analysis_still_dry_keeps_desire_and_waters_again() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));
    rig.tick_at(1_500, 20, Some(25.0));

    let r = rig.tick_at(16_500, 25, Some(25.0));
    assert_eq!(r.verdict, Some(AnalysisVerdict::StillDry));
    assert!(r.snapshot.wants_water);
    assert_eq!(r.state, StateId::Idle);

    // Interval (10 s) already elapsed during the 15 s analysis.
    let r = rig.tick_at(19_500, 25, Some(25.0));
    assert_eq!(r.command, PumpCommand::TurnOn);
    assert_eq!(rig.app.history().total_bursts(), 1);
}

#[test]
fn moisture_during_analysis_is_ignored() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));
    rig.tick_at(1_500, 20, Some(25.0));

    // Probe reads saturated mid-analysis; no pump decision is made.
    let r = rig.tick_at(4_500, 5, Some(25.0));
    assert_eq!(r.command, PumpCommand::NoChange);
    assert!(r.snapshot.analyzing);
    assert!(!rig.hw.relay_on);
}

// ── Scenario D: safety cutoff ────────────────────────────────

#[test]
fn scenario_d_over_temperature_cuts_pump_without_analysis() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));

    let r = rig.tick_at(1_200, 20, Some(35.0));

    assert_eq!(r.branch, Branch::SafetyCutoff);
    assert_eq!(r.command, PumpCommand::TurnOff);
    assert_eq!(r.state, StateId::SafetyStop);
    assert_eq!(r.stop_reason, Some(StopReason::OverTemperature));
    assert!(!r.snapshot.pump_active);
    assert!(!r.snapshot.analyzing);
    assert!(r.snapshot.temperature_too_high);
    assert_eq!(r.snapshot.last_irrigation_end, at(1_200));
    assert!(!rig.hw.relay_on);
}

#[test]
fn safety_stop_recovers_once_cool_and_respects_interval() {
    let mut rig = Rig::new(IrrigationConfig::default());
    rig.tick_at(1_000, 20, Some(25.0));
    rig.tick_at(1_200, 20, Some(35.0));

    // Still hot: stays stopped, pump blocked.
    let r = rig.tick_at(4_200, 20, Some(34.0));
    assert_eq!(r.state, StateId::SafetyStop);
    assert_eq!(r.hold, Some(HoldReason::BlockedByTemperature));
    assert!(rig.sink.contains(&AppEvent::Holding(HoldReason::BlockedByTemperature)));

    // Cooled but inside the interval: back to idle, still waiting.
    let r = rig.tick_at(7_200, 20, Some(29.0));
    assert_eq!(r.state, StateId::Idle);
    assert_eq!(r.command, PumpCommand::NoChange);

    let r = rig.tick_at(11_200, 20, Some(29.0));
    assert_eq!(r.command, PumpCommand::TurnOn);
    assert_eq!(r.state, StateId::Active);
}

#[test]
fn exactly_thirty_degrees_is_safe() {
    let mut rig = Rig::new(IrrigationConfig::default());
    let r = rig.tick_at(1_000, 20, Some(30.0));
    assert_eq!(r.command, PumpCommand::TurnOn);
    assert!(!r.snapshot.temperature_too_high);
}

#[test]
fn hot_and_dry_never_starts_pump() {
    let mut rig = Rig::new(IrrigationConfig::default());
    for t in 0..10 {
        let r = rig.tick_at(1_000 + t * 3_000, 10, Some(31.0));
        assert_eq!(r.command, PumpCommand::NoChange);
        assert!(!r.snapshot.pump_active);
    }
    assert!(rig.hw.relay_writes.iter().all(|on| !on));
}

// ── Scenario E: minimum interval hold ────────────────────────

#[test]
fn scenario_e_interval_hold() {
    let cfg = IrrigationConfig {
        analysis_ms: 1_000,
        ..Default::default()
    };
    let mut rig = Rig::new(cfg);
    rig.tick_at(1_000, 20, Some(25.0));
    rig.tick_at(1_500, 20, Some(25.0));
    let r = rig.tick_at(2_500, 20, Some(25.0));
    assert_eq!(r.verdict, Some(AnalysisVerdict::StillDry));
    rig.sink.clear();

    // 5 s after the burst ended.
    let r = rig.tick_at(6_500, 20, Some(25.0));

    assert!(r.snapshot.wants_water);
    assert_eq!(r.command, PumpCommand::NoChange);
    assert_eq!(r.state, StateId::Idle);
    let hold = HoldReason::WaitingForInterval {
        remaining: Duration::from_millis(5_000),
    };
    assert_eq!(r.hold, Some(hold));
    assert!(rig.sink.contains(&AppEvent::Holding(hold)));
    assert!(!rig.hw.relay_on);

    let r = rig.tick_at(11_500, 20, Some(25.0));
    assert_eq!(r.command, PumpCommand::TurnOn);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn invalid_temperature_does_not_block_by_default() {
    let mut rig = Rig::new(IrrigationConfig::default());
    let r = rig.tick_at(1_000, 20, None);
    assert!(!r.snapshot.temperature_too_high);
    assert_eq!(r.command, PumpCommand::TurnOn);
}

#[test]
fn invalid_temperature_blocks_when_configured() {
    let cfg = IrrigationConfig {
        invalid_temperature_blocks_irrigation: true,
        ..Default::default()
    };
    let mut rig = Rig::new(cfg);
    let r = rig.tick_at(1_000, 20, None);
    assert!(r.snapshot.temperature_too_high);
    assert_eq!(r.command, PumpCommand::NoChange);

    // A running burst is cut if the probe drops out.
    let r = rig.tick_at(2_000, 20, Some(25.0));
    assert_eq!(r.command, PumpCommand::TurnOn);
    let r = rig.tick_at(2_100, 20, None);
    assert_eq!(r.command, PumpCommand::TurnOff);
    assert_eq!(r.stop_reason, Some(StopReason::OverTemperature));
}
