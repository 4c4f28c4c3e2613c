//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, relay, clock, display, event sinks) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the control core never touches hardware directly
//! and tests can drive time and readings deterministically.

use embassy_time::Instant;

use crate::error::{ActuatorError, DisplayError};
use crate::sensors::SensorReadings;

use super::presenter::Frame;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
///
/// Implementations never fail: a broken probe is reported as a
/// conservative value (held moisture, `None` temperature).
pub trait SensorPort {
    fn read_all(&mut self) -> SensorReadings;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the pump relay.
pub trait ActuatorPort {
    /// Switch the pump.  Polarity is the adapter's concern.
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Last state successfully written to the relay.
    fn pump_is_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic time → domain)
// ───────────────────────────────────────────────────────────────

/// Single monotonic time source.  Every timestamp in the control core
/// comes from here.
pub trait ClockPort {
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character display)
// ───────────────────────────────────────────────────────────────

/// Shows one full two-line frame, replacing whatever was on screen.
pub trait DisplayPort {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
