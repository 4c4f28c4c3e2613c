//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[wants water, cool, interval elapsed]──▶ ACTIVE
//!    ▲                                               │
//!    │                     [satisfied | desire cleared | burst elapsed]
//!    │                                               ▼
//!    └──────────[absorption time elapsed]─────── ANALYZING
//!
//!  ACTIVE ──[too hot]──▶ SAFETY_STOP ──[cooled]──▶ IDLE (or ACTIVE)
//! ```
//!
//! The pump is switched only by `active_enter` / `active_exit`, so the
//! relay command always follows the state change that caused it.

use super::context::{AnalysisVerdict, FsmContext, HoldReason, PumpCommand, StopReason};
use super::{StateDescriptor, StateId};
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
        // Index 2: Analyzing
        StateDescriptor {
            id: StateId::Analyzing,
            name: "Analyzing",
            on_enter: Some(analyzing_enter),
            on_exit: Some(analyzing_exit),
            on_update: analyzing_update,
        },
        // Index 3: SafetyStop
        StateDescriptor {
            id: StateId::SafetyStop,
            name: "SafetyStop",
            on_enter: Some(safety_stop_enter),
            on_exit: None,
            on_update: safety_stop_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    idle_decision(ctx)
}

/// Start a burst if the plant wants water, the reading is still at or
/// below the dry threshold, it is cool enough and the minimum interval has
/// passed.  Otherwise record why we are holding.
fn idle_decision(ctx: &mut FsmContext) -> Option<StateId> {
    let wants = ctx.state.wants_water;
    let dry = ctx.moisture <= ctx.config.dry_threshold_percent;
    let hot = ctx.state.temperature_too_high;

    if wants && dry && !hot {
        if let Some(remaining) = ctx
            .state
            .interval_remaining(ctx.now, ctx.config.min_inter_cycle())
        {
            debug!("IDLE: dry, next burst allowed in {} ms", remaining.as_millis());
            ctx.hold = Some(HoldReason::WaitingForInterval { remaining });
            return None;
        }
        return Some(StateId::Active);
    }

    ctx.hold = Some(if wants && hot {
        HoldReason::BlockedByTemperature
    } else {
        HoldReason::NoNeed
    });
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE state: pump running for one short burst
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.state.pump_active = true;
    ctx.state.irrigation_start = Some(ctx.now);
    ctx.command = PumpCommand::TurnOn;
    info!(
        "ACTIVE: pump on at {}% moisture, burst limit {} ms",
        ctx.moisture, ctx.config.max_irrigation_ms
    );
}

fn active_exit(ctx: &mut FsmContext) {
    ctx.state.pump_active = false;
    ctx.state.last_irrigation_end = Some(ctx.now);
    ctx.command = PumpCommand::TurnOff;
    let ran = ctx.elapsed_since(ctx.state.irrigation_start);
    info!("ACTIVE: pump off after {} ms", ran.as_millis());
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    let reason = if ctx.moisture >= ctx.config.satisfied_threshold_percent {
        StopReason::Satisfied
    } else if !ctx.state.wants_water {
        StopReason::DesireCleared
    } else if ctx.elapsed_since(ctx.state.irrigation_start) >= ctx.config.max_irrigation() {
        StopReason::DripComplete
    } else {
        ctx.hold = Some(HoldReason::Dripping);
        return None;
    };

    info!("ACTIVE: stopping, {reason}");
    ctx.stop_reason = Some(reason);
    Some(StateId::Analyzing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ANALYZING state: waiting for the water to soak in
// ═══════════════════════════════════════════════════════════════════════════

fn analyzing_enter(ctx: &mut FsmContext) {
    ctx.state.analyzing = true;
    ctx.state.analysis_start = Some(ctx.now);
    info!(
        "ANALYZING: waiting {} ms for absorption",
        ctx.config.analysis_ms
    );
}

fn analyzing_exit(ctx: &mut FsmContext) {
    ctx.state.analyzing = false;
}

fn analyzing_update(ctx: &mut FsmContext) -> Option<StateId> {
    let elapsed = ctx.elapsed_since(ctx.state.analysis_start);
    let window = ctx.config.analysis_duration();

    if elapsed < window {
        ctx.hold = Some(HoldReason::Absorbing {
            remaining: window - elapsed,
        });
        return None;
    }

    // Confirmation re-read: only a reading at or below the dry threshold
    // keeps the desire alive.
    let still_dry = ctx.moisture <= ctx.config.dry_threshold_percent;
    ctx.state.wants_water = still_dry;
    let verdict = if still_dry {
        AnalysisVerdict::StillDry
    } else {
        AnalysisVerdict::Satisfied
    };
    ctx.verdict = Some(verdict);
    info!(
        "ANALYZING: done at {}% moisture, {}",
        ctx.moisture,
        if still_dry { "still needs water" } else { "plant satisfied" }
    );

    Some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFETY_STOP state: burst aborted by over-temperature
// ═══════════════════════════════════════════════════════════════════════════

fn safety_stop_enter(ctx: &mut FsmContext) {
    // active_exit already switched the pump off and stamped the end time.
    ctx.stop_reason = Some(StopReason::OverTemperature);
    warn!(
        "SAFETY_STOP: burst aborted, temperature above {:.1}C",
        ctx.config.max_safe_temperature_c
    );
}

fn safety_stop_update(ctx: &mut FsmContext) -> Option<StateId> {
    let next = idle_decision(ctx);
    if ctx.state.temperature_too_high {
        return None;
    }

    info!("SAFETY_STOP: temperature back in range");
    Some(next.unwrap_or(StateId::Idle))
}
