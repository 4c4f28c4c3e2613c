//! Function-pointer finite state machine for the irrigation core.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Idle       │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  │ Active     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Analyzing  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ SafetyStop │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  └────────────┴───────────┴──────────┴───────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step first applies the desire hysteresis, then walks the
//! [`BRANCH_PRIORITY`] table and runs the **first** branch whose guard
//! matches.  Exactly one branch executes per step:
//!
//! ```text
//!   SafetyCutoff  >  Analysis  >  ActiveCheck  >  IdleDecision
//! ```
//!
//! The safety cutoff forces `SafetyStop` directly; every other branch
//! delegates to the current state's `on_update`.  If that returns
//! `Some(next)`, the engine runs `on_exit` for the current state, then
//! `on_enter` for the next.  Pump on/off side effects live in the
//! `Active` enter/exit actions, so `pump_active` always mirrors the
//! current state.

pub mod context;
pub mod states;

use context::{AnalysisVerdict, FsmContext, HoldReason, IrrigationState, PumpCommand, StopReason};
use embassy_time::Instant;
use log::info;

use crate::config::IrrigationConfig;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible controller states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Active = 1,
    Analyzing = 2,
    SafetyStop = 3,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `SafetyStop` in release (pump stays off).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Active,
            2 => Self::Analyzing,
            3 => Self::SafetyStop,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::SafetyStop
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Branch priority table
// ---------------------------------------------------------------------------

/// The four mutually exclusive decision branches of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    SafetyCutoff,
    Analysis,
    ActiveCheck,
    IdleDecision,
}

type BranchGuard = fn(&IrrigationState) -> bool;

fn cutoff_guard(s: &IrrigationState) -> bool {
    s.temperature_too_high && s.pump_active
}

fn analysis_guard(s: &IrrigationState) -> bool {
    s.analyzing
}

fn active_guard(s: &IrrigationState) -> bool {
    s.pump_active
}

fn idle_guard(_: &IrrigationState) -> bool {
    true
}

/// Fixed evaluation order; the first matching guard wins.
pub const BRANCH_PRIORITY: [(Branch, BranchGuard); 4] = [
    (Branch::SafetyCutoff, cutoff_guard),
    (Branch::Analysis, analysis_guard),
    (Branch::ActiveCheck, active_guard),
    (Branch::IdleDecision, idle_guard),
];

impl Branch {
    /// Resolve the branch for `state` using [`BRANCH_PRIORITY`].
    pub fn select(state: &IrrigationState) -> Self {
        BRANCH_PRIORITY
            .iter()
            .find(|(_, guard)| guard(state))
            .map_or(Self::IdleDecision, |(branch, _)| *branch)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Step result
// ---------------------------------------------------------------------------

/// Everything one call to [`IrrigationStateMachine::step`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub command: PumpCommand,
    pub branch: Branch,
    /// State after the step.
    pub state_id: StateId,
    /// State before the step, differs from `state_id` on a transition.
    pub previous: StateId,
    pub hold: Option<HoldReason>,
    pub stop_reason: Option<StopReason>,
    pub verdict: Option<AnalysisVerdict>,
    /// Immutable copy of the decision state for presentation and logging.
    pub snapshot: IrrigationState,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The irrigation state machine.
///
/// Owns the state table and the [`FsmContext`] (and with it the single
/// [`IrrigationState`]).  Nothing outside this type mutates the state.
pub struct IrrigationStateMachine {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    ctx: FsmContext,
}

impl IrrigationStateMachine {
    /// Construct the machine in `Idle` with all flags false.
    pub fn new(config: IrrigationConfig) -> Self {
        Self {
            table: states::build_state_table(),
            current: StateId::Idle as usize,
            ctx: FsmContext::new(config),
        }
    }

    /// Advance the controller by one cycle.
    ///
    /// 1. Latch inputs and apply the desire hysteresis.
    /// 2. Select the branch by priority.
    /// 3. Run it, performing at most one state transition.
    pub fn step(&mut self, moisture: u8, temperature_too_high: bool, now: Instant) -> StepOutcome {
        let previous = self.current_state();

        self.ctx.begin_cycle(moisture, temperature_too_high, now);
        let moisture = self.ctx.moisture;
        self.ctx.state.update_desire(moisture, &self.ctx.config);

        let branch = Branch::select(&self.ctx.state);
        debug_assert_eq!(
            branch_owner(branch, previous),
            previous,
            "branch {branch:?} selected while in {previous:?}"
        );

        let next = match branch {
            Branch::SafetyCutoff => Some(StateId::SafetyStop),
            _ => (self.table[self.current].on_update)(&mut self.ctx),
        };

        if let Some(next_id) = next {
            self.transition(next_id);
        }

        StepOutcome {
            command: self.ctx.command,
            branch,
            state_id: self.current_state(),
            previous,
            hold: self.ctx.hold,
            stop_reason: self.ctx.stop_reason,
            verdict: self.ctx.verdict,
            snapshot: self.ctx.state,
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Human-readable name of the current state.
    pub fn state_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// Read-only view of the decision state.
    pub fn snapshot(&self) -> IrrigationState {
        self.ctx.state
    }

    pub fn config(&self) -> &IrrigationConfig {
        &self.ctx.config
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId) {
        let next_idx = next_id as usize;
        if next_idx == self.current {
            return;
        }

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(&mut self.ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(&mut self.ctx);
        }
    }
}

/// Which state a branch can legitimately run from.  `IdleDecision` is
/// shared by `Idle` and `SafetyStop`.
fn branch_owner(branch: Branch, current: StateId) -> StateId {
    match branch {
        Branch::SafetyCutoff | Branch::ActiveCheck => StateId::Active,
        Branch::Analysis => StateId::Analyzing,
        Branch::IdleDecision => match current {
            StateId::SafetyStop => StateId::SafetyStop,
            _ => StateId::Idle,
        },
    }
}
