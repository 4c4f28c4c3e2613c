//! Fuzz target: `IrrigationStateMachine::step`
//!
//! Interprets the input as a trace of (elapsed, moisture, temperature flag)
//! triples and checks the decision-state invariants after every step.
//!
//! cargo fuzz run fuzz_state_machine

#![no_main]

use embassy_time::Instant;
use irrigator::config::IrrigationConfig;
use irrigator::fsm::IrrigationStateMachine;
use irrigator::fsm::context::PumpCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = IrrigationConfig::default();
    let min_gap = u64::from(cfg.min_inter_cycle_ms);
    let mut fsm = IrrigationStateMachine::new(cfg);
    let mut now = 0u64;
    let mut last_off: Option<u64> = None;

    for chunk in data.chunks_exact(3) {
        // Up to ~65 s between cycles, 10 ms resolution.
        now += u64::from(chunk[0]) * 256 + u64::from(chunk[1] & 0x0F) * 10;
        let moisture = chunk[1] >> 1;
        let hot = chunk[2] & 1 == 1;

        let out = fsm.step(moisture, hot, Instant::from_millis(now));
        let s = out.snapshot;

        assert!(!(s.pump_active && s.analyzing));
        assert!(!(s.pump_active && s.temperature_too_high));
        match out.command {
            PumpCommand::TurnOn => {
                if let Some(off) = last_off {
                    assert!(now - off >= min_gap);
                }
            }
            PumpCommand::TurnOff => last_off = Some(now),
            PumpCommand::NoChange => {}
        }
    }
});
