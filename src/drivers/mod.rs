//! Peripheral drivers and one-shot hardware initialisation.

pub mod hw_init;
pub mod lcd;
pub mod pump;
pub mod watchdog;
