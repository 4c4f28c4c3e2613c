//! Ambient temperature source for the safety monitor.
//!
//! [`TemperatureProbe`] abstracts the physical sensor (a DHT11 on the real
//! board, an injectable atomic on host builds).  [`TemperatureSensor`]
//! turns probe failures into `None` and logs them on the edge, so a flaky
//! sensor is visible without flooding the console.

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{info, warn};

use super::dht11::Dht11;
use crate::error::SensorError;

/// Anything that can produce one temperature sample in Celsius.
pub trait TemperatureProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

impl<P, D> TemperatureProbe for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.read().map(|m| m.temperature)
    }
}

// ── Host simulation ──────────────────────────────────────────

/// f32 bit pattern; NaN marks a failed read.
static SIM_TEMPERATURE_BITS: AtomicU32 = AtomicU32::new(0x41B0_0000); // 22.0

pub fn sim_set_temperature(celsius: f32) {
    SIM_TEMPERATURE_BITS.store(celsius.to_bits(), Ordering::Relaxed);
}

/// Probe backed by [`sim_set_temperature`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SimTemperatureProbe;

impl TemperatureProbe for SimTemperatureProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let t = f32::from_bits(SIM_TEMPERATURE_BITS.load(Ordering::Relaxed));
        if t.is_nan() {
            Err(SensorError::Timeout)
        } else {
            Ok(t)
        }
    }
}

// ── Wrapper ──────────────────────────────────────────────────

pub struct TemperatureSensor<P> {
    probe: P,
    consecutive_failures: u32,
    last_error: Option<SensorError>,
}

impl<P: TemperatureProbe> TemperatureSensor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            consecutive_failures: 0,
            last_error: None,
        }
    }

    /// One sample, or `None` if the probe failed.
    pub fn read(&mut self) -> Option<f32> {
        match self.probe.read_celsius() {
            Ok(t) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "temperature: probe recovered after {} failed reads",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
                self.last_error = None;
                Some(t)
            }
            Err(e) => {
                if self.consecutive_failures == 0 {
                    warn!("temperature: read failed: {e}");
                }
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error = Some(e);
                None
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<SensorError> {
        self.last_error
    }
}
