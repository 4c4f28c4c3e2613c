//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorReadings`]
//! snapshot each cycle.  A failed moisture read keeps the previous good
//! value; before the first good read that value is the wet calibration
//! point, so an unreadable probe can never start the pump.

pub mod dht11;
pub mod moisture;
pub mod temperature;

use log::warn;

use crate::error::SensorError;
use moisture::{MoistureReading, MoistureSensor};
use temperature::{TemperatureProbe, TemperatureSensor};

/// Everything the control core needs from the outside world for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    /// Raw moisture sample (10-bit domain) for diagnostics.
    pub raw_moisture: u16,
    /// Calibrated moisture, 0–100.
    pub moisture_percent: u8,
    /// `None` when the probe could not be read.
    pub temperature_c: Option<f32>,
}

/// Aggregates the moisture probe and the temperature source.
pub struct SensorHub<P> {
    pub moisture: MoistureSensor,
    pub temperature: TemperatureSensor<P>,
    last_moisture: MoistureReading,
    moisture_error: Option<SensorError>,
}

impl<P: TemperatureProbe> SensorHub<P> {
    pub fn new(moisture: MoistureSensor, temperature: TemperatureSensor<P>) -> Self {
        let wet = moisture.calibration().wet_raw;
        Self {
            moisture,
            temperature,
            last_moisture: MoistureReading {
                raw: wet,
                percent: 100,
            },
            moisture_error: None,
        }
    }

    /// Read every sensor and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorReadings {
        match self.moisture.read() {
            Ok(r) => {
                self.last_moisture = r;
                self.moisture_error = None;
            }
            Err(e) => {
                if self.moisture_error.is_none() {
                    warn!(
                        "moisture: read failed ({e}), holding {}%",
                        self.last_moisture.percent
                    );
                }
                self.moisture_error = Some(e);
            }
        }

        SensorReadings {
            raw_moisture: self.last_moisture.raw,
            moisture_percent: self.last_moisture.percent,
            temperature_c: self.temperature.read(),
        }
    }

    pub fn moisture_error(&self) -> Option<SensorError> {
        self.moisture_error
    }
}
