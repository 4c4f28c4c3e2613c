//! Application core: pure domain logic, zero I/O.
//!
//! The control loop for the irrigator: safety evaluation, the irrigation
//! state machine, burst history and the display texts.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod presenter;
pub mod service;
