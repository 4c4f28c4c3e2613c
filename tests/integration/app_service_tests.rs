//! Integration tests for the AppService → presenter → display pipeline and
//! the event stream, using the mock adapters.

use embassy_time::{Duration, Instant};

use irrigator::app::events::AppEvent;
use irrigator::app::service::AppService;
use irrigator::config::IrrigationConfig;
use irrigator::error::Error;
use irrigator::fsm::StateId;
use irrigator::fsm::context::StopReason;

use crate::mock_hw::{ManualClock, MockHardware, RecordingDelay, RecordingDisplay, RecordingSink};

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn start_drives_relay_off_and_reports_idle() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(50, Some(22.0));
    hw.relay_on = true;
    let mut sink = RecordingSink::new();

    app.start(&mut hw, &mut sink);

    assert_eq!(hw.relay_writes, vec![false]);
    assert_eq!(sink.events, vec![AppEvent::Started(StateId::Idle)]);
}

#[test]
fn splash_screens_hold_two_seconds_each() {
    let app = AppService::new(IrrigationConfig::default());
    let clock = ManualClock::at(0);
    let mut delay = RecordingDelay::new(clock.clone());
    let mut display = RecordingDisplay::default();

    app.show_splash(&mut display, &mut delay);

    assert_eq!(
        display.texts(),
        owned(&[("Irrigation sys", "Starting..."), ("Pump: OFF", "System ready")])
    );
    assert_eq!(delay.sleeps_ms, vec![2_000, 2_000]);
    assert_eq!(clock.millis(), 4_000);
}

#[test]
fn normal_cycle_walks_three_views() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(60, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(10_000);
    let mut delay = RecordingDelay::new(clock.clone());
    let mut display = RecordingDisplay::default();

    let report = app.tick(&mut hw, &clock, &mut sink);
    app.present(&mut display, &mut delay, &clock, &report);

    assert_eq!(
        display.texts(),
        owned(&[
            ("Your plant says:", "I'm happy :)"),
            ("Temp: 22.0C", "Moisture: 60%"),
            ("Pump: OFF", "No need"),
        ])
    );
    assert_eq!(delay.sleeps_ms, vec![3_000, 5_000]);
}

#[test]
fn hot_cycle_shows_only_the_alarm() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(20, Some(34.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(0);
    let mut delay = RecordingDelay::new(clock.clone());
    let mut display = RecordingDisplay::default();

    let report = app.tick(&mut hw, &clock, &mut sink);
    app.present(&mut display, &mut delay, &clock, &report);

    assert_eq!(
        display.texts(),
        owned(&[("TEMP TOO HIGH!", "No water: 34.0C")])
    );
    assert_eq!(delay.sleeps_ms, vec![8_000]);
}

#[test]
fn analysis_countdown_is_rendered_at_display_time() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(20, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);
    let mut delay = RecordingDelay::new(clock.clone());
    let mut display = RecordingDisplay::default();

    app.tick(&mut hw, &clock, &mut sink);
    clock.set(1_500);
    let report = app.tick(&mut hw, &clock, &mut sink);
    assert!(report.snapshot.analyzing);

    app.present(&mut display, &mut delay, &clock, &report);

    // Mood and sensor views hold 8 s, leaving 7 s of the 15 s window.
    assert_eq!(
        display.texts(),
        owned(&[
            ("Water soaking in", "Wait for check"),
            ("Temp: 22.0C", "Stabilizing..."),
            ("Pump: OFF", "Waiting 8s"),
        ])
    );
}

#[test]
fn full_burst_emits_start_stop_and_analysis_events() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(20, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);

    app.tick(&mut hw, &clock, &mut sink);
    clock.set(1_500);
    app.tick(&mut hw, &clock, &mut sink);
    clock.set(16_500);
    hw.set(48, Some(22.0));
    app.tick(&mut hw, &clock, &mut sink);

    let transitions: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (StateId::Idle, StateId::Active),
            (StateId::Active, StateId::Analyzing),
            (StateId::Analyzing, StateId::Idle),
        ]
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpStopped { reason: StopReason::DripComplete, .. })),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AnalysisCompleted { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Cycle(_))), 3);

    let record = app.history().latest().copied().unwrap();
    assert_eq!(record.moisture_before, 20);
    assert_eq!(record.settled_moisture, Some(48));
    assert_eq!(record.duration.as_millis(), 500);
}

#[test]
fn running_burst_reports_time_to_its_limit() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(20, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);
    let mut display = RecordingDisplay::default();

    assert_eq!(app.burst_remaining(Instant::from_millis(1_000)), None);

    let report = app.tick(&mut hw, &clock, &mut sink);
    assert_eq!(report.state, StateId::Active);
    clock.set(1_200);
    assert_eq!(
        app.burst_remaining(Instant::from_millis(1_200)),
        Some(Duration::from_millis(300))
    );

    app.present_status(&mut display, &clock, &report);
    assert_eq!(display.texts(), owned(&[("Pump: ON", "Dripping 0s")]));

    // Ticking at the limit ends the burst after 500 ms, not a full cycle.
    clock.set(1_500);
    let report = app.tick(&mut hw, &clock, &mut sink);
    assert_eq!(report.stop_reason, Some(StopReason::DripComplete));
    assert!(!hw.relay_on);
    assert_eq!(app.burst_remaining(Instant::from_millis(1_500)), None);
}

#[test]
fn relay_write_failure_is_reported_and_retried() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(20, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);

    hw.fail_writes = true;
    let report = app.tick(&mut hw, &clock, &mut sink);
    assert!(report.snapshot.pump_active);
    assert!(!hw.relay_on);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Fault(Error::Actuator(_)))), 1);

    // Next cycle the relay works again and is brought in line.
    hw.fail_writes = false;
    clock.set(1_200);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(hw.relay_on);
}

#[test]
fn display_failure_does_not_stop_the_cycle() {
    let mut app = AppService::new(IrrigationConfig::default());
    let mut hw = MockHardware::new(60, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(0);
    let mut delay = RecordingDelay::new(clock.clone());
    let mut display = RecordingDisplay {
        fail: true,
        ..Default::default()
    };

    let report = app.tick(&mut hw, &clock, &mut sink);
    app.present(&mut display, &mut delay, &clock, &report);

    assert!(display.frames.is_empty());
    assert_eq!(delay.sleeps_ms, vec![3_000, 5_000]);
    assert_eq!(app.cycle_count(), 1);
}

#[test]
fn summary_window_counts_activations() {
    let cfg = IrrigationConfig {
        summary_interval_cycles: 4,
        ..Default::default()
    };
    let mut app = AppService::new(cfg);
    let mut hw = MockHardware::new(20, Some(20.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);

    for ms in [1_000, 1_500, 4_500, 7_500] {
        clock.set(ms);
        app.tick(&mut hw, &clock, &mut sink);
    }

    let summary = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Summary(s) => Some(*s),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.activations, 1);
    assert_eq!(summary.moisture_min, 20);
    assert_eq!(summary.temperature_avg, Some(20.0));
    assert_eq!(summary.average_gain, None, "no burst has settled yet");
}

#[test]
fn summary_carries_absorbed_gain() {
    let cfg = IrrigationConfig {
        summary_interval_cycles: 3,
        ..Default::default()
    };
    let mut app = AppService::new(cfg);
    let mut hw = MockHardware::new(20, Some(22.0));
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(1_000);

    app.tick(&mut hw, &clock, &mut sink);
    clock.set(1_500);
    app.tick(&mut hw, &clock, &mut sink);
    clock.set(16_500);
    hw.set(48, Some(22.0));
    app.tick(&mut hw, &clock, &mut sink);

    let gain = sink.events.iter().find_map(|e| match e {
        AppEvent::Summary(s) => Some(s.average_gain),
        _ => None,
    });
    assert_eq!(gain, Some(Some(28.0)));
}
