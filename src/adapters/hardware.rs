//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the pump relay, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::pump::PumpRelay;
use crate::error::ActuatorError;
use crate::sensors::temperature::TemperatureProbe;
use crate::sensors::{SensorHub, SensorReadings};

pub struct HardwareAdapter<P> {
    sensor_hub: SensorHub<P>,
    pump: PumpRelay,
}

impl<P: TemperatureProbe> HardwareAdapter<P> {
    pub fn new(sensor_hub: SensorHub<P>, pump: PumpRelay) -> Self {
        Self { sensor_hub, pump }
    }

    pub fn sensors(&self) -> &SensorHub<P> {
        &self.sensor_hub
    }

    pub fn pump(&self) -> &PumpRelay {
        &self.pump
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: TemperatureProbe> SensorPort for HardwareAdapter<P> {
    fn read_all(&mut self) -> SensorReadings {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: TemperatureProbe> ActuatorPort for HardwareAdapter<P> {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pump.set(on)
    }

    fn pump_is_on(&self) -> bool {
        self.pump.is_on()
    }
}
