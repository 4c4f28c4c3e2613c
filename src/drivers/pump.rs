//! Pump relay driver.
//!
//! A single relay switches the drip pump on or off.  Most hobby relay
//! modules energise on a LOW input, so the driver owns the polarity and
//! the rest of the firmware only speaks on/off.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the relay GPIO via hw_init helpers.
//! On host/test: hw_init latches the level in memory.

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    On,
}

pub struct PumpRelay {
    gpio: i32,
    active_low: bool,
    state: RelayState,
    switch_count: u32,
}

impl PumpRelay {
    /// Build the driver and drive the relay to its inactive level.
    pub fn new(active_low: bool) -> Result<Self, ActuatorError> {
        Self::on_pin(pins::PUMP_RELAY_GPIO, active_low)
    }

    pub fn on_pin(gpio: i32, active_low: bool) -> Result<Self, ActuatorError> {
        let relay = Self {
            gpio,
            active_low,
            state: RelayState::Off,
            switch_count: 0,
        };
        relay.write_level(false)?;
        Ok(relay)
    }

    /// GPIO level that corresponds to the relay being idle.
    pub fn off_level(active_low: bool) -> bool {
        active_low
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.write_level(on)?;
        let next = if on { RelayState::On } else { RelayState::Off };
        if next != self.state {
            self.switch_count = self.switch_count.saturating_add(1);
        }
        self.state = next;
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == RelayState::On
    }

    /// Number of on/off edges since construction.
    pub fn switch_count(&self) -> u32 {
        self.switch_count
    }

    fn write_level(&self, on: bool) -> Result<(), ActuatorError> {
        // XOR maps logical on/off onto the wiring polarity.
        hw_init::gpio_write(self.gpio, on ^ self.active_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own pin so parallel tests don't share a latch bit.

    #[test]
    fn active_low_relay_idles_high() {
        let relay = PumpRelay::on_pin(40, true).unwrap();
        assert_eq!(relay.state(), RelayState::Off);
        assert!(hw_init::sim_gpio_level(40));
    }

    #[test]
    fn active_low_relay_pulls_low_when_on() {
        let mut relay = PumpRelay::on_pin(41, true).unwrap();
        relay.set(true).unwrap();
        assert!(relay.is_on());
        assert!(!hw_init::sim_gpio_level(41));
        relay.set(false).unwrap();
        assert!(hw_init::sim_gpio_level(41));
        assert_eq!(relay.switch_count(), 2);
    }

    #[test]
    fn active_high_relay() {
        let mut relay = PumpRelay::on_pin(42, false).unwrap();
        assert!(!hw_init::sim_gpio_level(42));
        relay.set(true).unwrap();
        assert!(hw_init::sim_gpio_level(42));
        relay.set(true).unwrap();
        assert_eq!(relay.switch_count(), 1, "repeat command is not an edge");
    }

    #[test]
    fn off_level_matches_polarity() {
        assert!(PumpRelay::off_level(true));
        assert!(!PumpRelay::off_level(false));
    }
}
