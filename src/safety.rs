//! Temperature safety monitor.
//!
//! The monitor runs **every cycle before the FSM** and turns the optional
//! ambient temperature into the single `temperature_too_high` flag the
//! state machine consumes.  When the flag is raised while the pump runs,
//! the FSM's highest-priority branch cuts the pump immediately.
//!
//! ## Condition lifecycle
//!
//! 1. A valid reading above the limit raises the condition.
//! 2. The FSM blocks new bursts and aborts a running one.
//! 3. Each cycle the monitor re-evaluates; a reading at or below the limit
//!    clears it.
//!
//! An unreadable sensor does not raise the condition unless
//! `invalid_temperature_blocks_irrigation` is set.

use crate::config::IrrigationConfig;
use log::{error, info, warn};

/// Pure over-temperature predicate: true iff a reading is present and
/// strictly above `max_c`.
pub fn is_too_high(temperature_c: Option<f32>, max_c: f32) -> bool {
    temperature_c.is_some_and(|t| !t.is_nan() && t > max_c)
}

/// Stateful wrapper that logs condition edges once.
pub struct SafetyMonitor {
    max_temp_c: f32,
    invalid_blocks: bool,
    /// Latched condition from the previous evaluation.
    too_high: bool,
    /// Whether the previous reading was unavailable.
    sensor_missing: bool,
}

impl SafetyMonitor {
    pub fn new(config: &IrrigationConfig) -> Self {
        Self {
            max_temp_c: config.max_safe_temperature_c,
            invalid_blocks: config.invalid_temperature_blocks_irrigation,
            too_high: false,
            sensor_missing: false,
        }
    }

    /// Evaluate the latest reading.  Returns the `temperature_too_high` flag
    /// for this cycle.
    pub fn evaluate(&mut self, temperature_c: Option<f32>) -> bool {
        let valid = temperature_c.filter(|t| !t.is_nan());

        // ── Sensor availability ───────────────────────────────────
        let missing = valid.is_none();
        if missing != self.sensor_missing {
            if missing {
                warn!("SAFETY: temperature sensor unavailable");
            } else {
                info!("SAFETY: temperature sensor back online");
            }
            self.sensor_missing = missing;
        }

        // ── Over-temperature ──────────────────────────────────────
        let condition = if missing {
            self.invalid_blocks
        } else {
            is_too_high(valid, self.max_temp_c)
        };

        if condition != self.too_high {
            if condition {
                error!(
                    "SAFETY CONDITION SET: temperature {} above {:.1}C",
                    DisplayTemp(valid),
                    self.max_temp_c
                );
            } else {
                info!("SAFETY CONDITION CLEARED: temperature {}", DisplayTemp(valid));
            }
            self.too_high = condition;
        }

        self.too_high
    }

    /// Current latched condition.
    pub fn too_high(&self) -> bool {
        self.too_high
    }
}

struct DisplayTemp(Option<f32>);

impl core::fmt::Display for DisplayTemp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{t:.1}C"),
            None => write!(f, "unavailable"),
        }
    }
}
