//! Resistive soil-moisture probe.
//!
//! Reads the probe through an ADC1 channel and maps the raw value onto
//! 0–100 % with a two-point linear calibration (dry air → 0 %, water →
//! 100 %).  The mapping is integer and truncates toward zero, then clamps,
//! so readings beyond either calibration point saturate.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: 12-bit oneshot sample shifted into the 10-bit calibration
//! domain (hw_init owns the ADC handle).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_MOISTURE_RAW: AtomicU16 = AtomicU16::new(1023);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_moisture_raw(raw: u16) {
    SIM_MOISTURE_RAW.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Raw value in dry air.
    pub dry_raw: u16,
    /// Raw value fully submerged.
    pub wet_raw: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dry_raw: 1023,
            wet_raw: 300,
        }
    }
}

impl Calibration {
    /// Map a raw sample to a clamped percentage.
    pub fn to_percent(&self, raw: u16) -> u8 {
        let span = i32::from(self.wet_raw) - i32::from(self.dry_raw);
        if span == 0 {
            return 0;
        }
        let pct = (i32::from(raw) - i32::from(self.dry_raw)) * 100 / span;
        pct.clamp(0, 100) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureReading {
    pub raw: u16,
    pub percent: u8,
}

pub struct MoistureSensor {
    cal: Calibration,
    total_reads: u32,
}

impl MoistureSensor {
    pub fn new(cal: Calibration) -> Self {
        Self {
            cal,
            total_reads: 0,
        }
    }

    pub fn calibration(&self) -> Calibration {
        self.cal
    }

    pub fn read(&mut self) -> Result<MoistureReading, SensorError> {
        self.total_reads = self.total_reads.saturating_add(1);
        let raw = self.read_adc()?;
        Ok(MoistureReading {
            raw,
            percent: self.cal.to_percent(raw),
        })
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        let raw12 = hw_init::adc1_read(pins::MOISTURE_ADC_CHANNEL)?;
        Ok(raw12 >> pins::MOISTURE_ADC_SHIFT)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_MOISTURE_RAW.load(Ordering::Relaxed))
    }
}
