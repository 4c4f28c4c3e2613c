//! GPIO / peripheral pin assignments for the irrigation controller board.
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Soil moisture probe (resistive, analog)
// ---------------------------------------------------------------------------

/// Probe output via ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const MOISTURE_ADC_GPIO: i32 = 5;
pub const MOISTURE_ADC_CHANNEL: u32 = 4;
/// The probe calibration lives in the 10-bit domain; the ADC samples at
/// 12 bits and is shifted down by this many bits.
pub const MOISTURE_ADC_SHIFT: u32 = 2;

// ---------------------------------------------------------------------------
// DHT11 temperature / humidity sensor (single-wire, open drain)
// ---------------------------------------------------------------------------

pub const DHT11_DATA_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Pump relay module
// ---------------------------------------------------------------------------

/// Digital output driving the relay coil transistor.  Polarity is set by
/// `IrrigationConfig::relay_active_low`.
pub const PUMP_RELAY_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// I²C bus: 16x2 character LCD behind a PCF8574 backpack
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
pub const I2C_FREQ_HZ: u32 = 100_000;
pub const LCD_I2C_ADDR: u8 = 0x27;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
