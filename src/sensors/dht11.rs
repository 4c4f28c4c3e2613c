//! DHT11 temperature / humidity sensor driver.
//!
//! Bit-banged single-wire protocol over any pin that implements both
//! embedded-hal `InputPin` and `OutputPin` (open-drain on the ESP32-S3).
//! The exchange is fully blocking; the whole frame takes about 23 ms.
//!
//! ```text
//!  MCU  ‾‾‾\________18ms________/‾‾40us‾‾
//!  DHT                                   \__80us__/‾‾80us‾‾\ 40 bits ...
//!  bit: \__50us__/‾‾26us‾‾\  = 0      \__50us__/‾‾‾‾70us‾‾‾‾\  = 1
//! ```
//!
//! Frame: humidity int, humidity frac, temperature int, temperature frac,
//! checksum (low byte of the sum of the first four).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::error::SensorError;

const START_SIGNAL_LOW_MS: u32 = 18;
const START_SIGNAL_HIGH_US: u32 = 40;
/// A "1" bit keeps the line high for ~70 us, a "0" for ~26 us.
const BIT_SAMPLE_DELAY_US: u32 = 35;
const POLL_DELAY_US: u32 = 1;
const MAX_POLLS: usize = 100;

/// Plausible operating envelope; anything outside is line noise.
const MIN_TEMPERATURE_C: f32 = -20.0;
const MAX_TEMPERATURE_C: f32 = 60.0;

pub type Frame = [u8; 5];

/// One decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub humidity: f32,
    pub temperature: f32,
}

/// Validate and decode a raw 5-byte frame.
pub fn decode_frame(frame: Frame) -> Result<Measurement, SensorError> {
    let [hi, hf, ti, tf, checksum] = frame;
    let sum = hi.wrapping_add(hf).wrapping_add(ti).wrapping_add(tf);
    if sum != checksum {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = f32::from(hi) + f32::from(hf & 0x0F) / 10.0;
    let mut temperature = f32::from(ti) + f32::from(tf & 0x0F) / 10.0;
    // Bit 7 of the fractional byte carries the sign on sub-zero readings.
    if tf & 0x80 != 0 {
        temperature = -temperature;
    }

    if !(0.0..=100.0).contains(&humidity)
        || !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&temperature)
    {
        return Err(SensorError::OutOfRange);
    }

    Ok(Measurement {
        humidity,
        temperature,
    })
}

pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Run one full exchange with the sensor.
    pub fn read(&mut self) -> Result<Measurement, SensorError> {
        self.send_start_signal()?;
        self.wait_for_sensor_response()?;

        let mut frame: Frame = [0; 5];
        for byte in &mut frame {
            *byte = self.read_byte()?;
        }
        // Leave the bus released (idle high).
        self.pin.set_high().map_err(|_| SensorError::PinFault)?;

        decode_frame(frame)
    }

    /// Give the pin and delay back.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn send_start_signal(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_ms(START_SIGNAL_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(START_SIGNAL_HIGH_US);
        Ok(())
    }

    fn wait_for_sensor_response(&mut self) -> Result<(), SensorError> {
        self.wait_until(PinState::Low)?;
        self.wait_until(PinState::High)
    }

    fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for bit in 0..8 {
            self.wait_until(PinState::Low)?;
            self.wait_until(PinState::High)?;
            self.delay.delay_us(BIT_SAMPLE_DELAY_US);
            if self.pin.is_high().map_err(|_| SensorError::PinFault)? {
                byte |= 0x80 >> bit;
            }
        }
        Ok(byte)
    }

    fn wait_until(&mut self, state: PinState) -> Result<(), SensorError> {
        for _ in 0..MAX_POLLS {
            let reached = match state {
                PinState::High => self.pin.is_high(),
                PinState::Low => self.pin.is_low(),
            }
            .map_err(|_| SensorError::PinFault)?;
            if reached {
                return Ok(());
            }
            self.delay.delay_us(POLL_DELAY_US);
        }
        Err(SensorError::Timeout)
    }
}
