//! System configuration parameters
//!
//! All tunable parameters for the irrigation controller.  Values are fixed
//! at build time through [`IrrigationConfig::default`]; each decision
//! threshold governs exactly one transition guard in the state machine.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationConfig {
    // --- Moisture thresholds ---
    /// At or below this moisture (%) the plant wants water
    pub dry_threshold_percent: u8,
    /// At or above this moisture (%) the plant is satisfied
    pub satisfied_threshold_percent: u8,

    // --- Drip timing ---
    /// Longest single pump burst (milliseconds)
    pub max_irrigation_ms: u32,
    /// Minimum gap between the end of one burst and the next start (milliseconds)
    pub min_inter_cycle_ms: u32,
    /// Absorption settling time after each burst (milliseconds)
    pub analysis_ms: u32,

    // --- Safety ---
    /// Irrigation is blocked above this ambient temperature (Celsius)
    pub max_safe_temperature_c: f32,
    /// Treat an unreadable temperature sensor as too hot
    pub invalid_temperature_blocks_irrigation: bool,

    // --- Moisture calibration (10-bit raw domain) ---
    /// Raw reading of the probe in dry air (maps to 0%)
    pub moisture_dry_raw: u16,
    /// Raw reading of the probe in water (maps to 100%)
    pub moisture_wet_raw: u16,

    // --- Pump relay ---
    /// Relay module energises on a LOW input
    pub relay_active_low: bool,

    // --- Presentation / loop timing ---
    /// Sleep after each cycle while the status view is shown (milliseconds)
    pub cycle_period_ms: u32,
    /// Hold for the plant-mood view (milliseconds)
    pub mood_view_ms: u32,
    /// Hold for the sensor-data view (milliseconds)
    pub sensor_view_ms: u32,
    /// Hold for the over-temperature alarm view (milliseconds)
    pub alarm_view_ms: u32,
    /// Hold for each boot splash screen (milliseconds)
    pub splash_view_ms: u32,
    /// Emit a statistics summary every N cycles
    pub summary_interval_cycles: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            // Moisture thresholds
            dry_threshold_percent: 30,
            satisfied_threshold_percent: 45,

            // Drip timing
            max_irrigation_ms: 500,
            min_inter_cycle_ms: 10_000,
            analysis_ms: 15_000,

            // Safety
            max_safe_temperature_c: 30.0,
            invalid_temperature_blocks_irrigation: false,

            // Calibration
            moisture_dry_raw: 1023,
            moisture_wet_raw: 300,

            // Relay
            relay_active_low: true,

            // Loop timing
            cycle_period_ms: 3000,
            mood_view_ms: 3000,
            sensor_view_ms: 5000,
            alarm_view_ms: 8000,
            splash_view_ms: 2000,
            summary_interval_cycles: 20,
            watchdog_timeout_ms: 30_000,
        }
    }
}

impl IrrigationConfig {
    pub fn max_irrigation(&self) -> Duration {
        Duration::from_millis(u64::from(self.max_irrigation_ms))
    }

    pub fn min_inter_cycle(&self) -> Duration {
        Duration::from_millis(u64::from(self.min_inter_cycle_ms))
    }

    pub fn analysis_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.analysis_ms))
    }

    /// Worst-case wall time of one control cycle including display holds.
    pub fn longest_cycle_ms(&self) -> u32 {
        let normal = self.mood_view_ms + self.sensor_view_ms;
        normal.max(self.alarm_view_ms) + self.cycle_period_ms
    }

    /// Reject parameter sets that would break a state-machine guard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.satisfied_threshold_percent > 100 {
            return Err(ConfigError::ValidationFailed(
                "satisfied threshold must be <= 100%",
            ));
        }
        if self.dry_threshold_percent >= self.satisfied_threshold_percent {
            return Err(ConfigError::ValidationFailed(
                "dry threshold must be below satisfied threshold",
            ));
        }
        if self.moisture_dry_raw == self.moisture_wet_raw {
            return Err(ConfigError::ValidationFailed(
                "moisture calibration points must differ",
            ));
        }
        if self.max_irrigation_ms == 0 || self.analysis_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "irrigation and analysis durations must be non-zero",
            ));
        }
        if !self.max_safe_temperature_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "max safe temperature must be finite",
            ));
        }
        if self.cycle_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("cycle period must be non-zero"));
        }
        if self.watchdog_timeout_ms <= self.longest_cycle_ms() {
            return Err(ConfigError::ValidationFailed(
                "watchdog timeout must exceed the longest cycle",
            ));
        }
        Ok(())
    }
}
