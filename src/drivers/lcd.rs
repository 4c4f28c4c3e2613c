//! 16x2 HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The HD44780 protocol lives in `ag_lcd`, which drives the backpack's
//! pins through `port_expander`.  Neither reports bus failures back to the
//! caller, so the I²C bus is wrapped in a [`MonitoredBus`] that counts
//! failed transactions into a shared [`BusHealth`].

use core::cell::Cell;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

pub const COLS: usize = 16;

/// Base address of a PCF8574 with A2..A0 tied low.
const PCF8574_BASE_ADDR: u8 = 0x20;

/// Address-strap levels `(a0, a1, a2)` for a PCF8574 at `addr`.
pub fn address_pins(addr: u8) -> (bool, bool, bool) {
    let strap = addr.wrapping_sub(PCF8574_BASE_ADDR);
    (strap & 0b001 != 0, strap & 0b010 != 0, strap & 0b100 != 0)
}

/// Failed-transaction counter shared between the bus and the display.
#[derive(Debug, Default)]
pub struct BusHealth {
    failures: Cell<u32>,
}

impl BusHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.failures.get()
    }

    fn record_failure(&self) {
        self.failures.set(self.failures.get().saturating_add(1));
    }
}

/// I²C bus pass-through that records every failed transaction.
pub struct MonitoredBus<'h, I2C> {
    inner: I2C,
    health: &'h BusHealth,
}

impl<'h, I2C> MonitoredBus<'h, I2C> {
    pub fn new(inner: I2C, health: &'h BusHealth) -> Self {
        Self { inner, health }
    }
}

impl<I2C: ErrorType> ErrorType for MonitoredBus<'_, I2C> {
    type Error = I2C::Error;
}

impl<I2C: I2c> I2c for MonitoredBus<'_, I2C> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.inner.transaction(address, operations);
        if result.is_err() {
            self.health.record_failure();
        }
        result
    }
}
